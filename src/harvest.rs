//! Per-trend article harvesting.
//!
//! For one trend: run a web search, visit each candidate link in order, and
//! keep the pages whose paragraph text is long enough to be an article.
//!
//! Harvesting never fails the caller. A failed search yields no articles; a
//! failed link is logged and skipped without affecting its siblings. Every
//! visited link produces a [`LinkOutcome`], and accept/skip is decided by the
//! pure function [`assess_page`].

use crate::config::HarvestSettings;
use crate::error::FetchError;
use crate::models::Article;
use crate::scrapers::PageFetcher;
use crate::scrapers::article::extract_title_and_paragraphs;
use crate::scrapers::google::{extract_candidate_links, search_url};
use crate::utils::{normalize_whitespace, word_count};
use futures::stream::{self, StreamExt};
use rand::{Rng, rng};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Articles must have strictly more words than this.
pub const MIN_WORDS: usize = 100;

/// Why a candidate link did not become an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The site answered 403.
    Forbidden,
    /// Any other fetch failure.
    Fetch(String),
    /// No paragraph text.
    Empty,
    /// Paragraph text with too few words.
    TooShort { words: usize },
}

/// Result of visiting one candidate link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Accepted(Article),
    Skipped { url: String, reason: SkipReason },
}

impl LinkOutcome {
    fn fetch_failed(url: &str, e: FetchError) -> Self {
        let reason = match e {
            FetchError::Forbidden => SkipReason::Forbidden,
            other => SkipReason::Fetch(other.to_string()),
        };
        LinkOutcome::Skipped {
            url: url.to_string(),
            reason,
        }
    }
}

/// Decide whether a fetched page is an article.
pub fn assess_page(url: &str, html: &str) -> LinkOutcome {
    let page = extract_title_and_paragraphs(html);
    let content = normalize_whitespace(&page.joined());
    let words = word_count(&content);

    let reason = if content.is_empty() {
        SkipReason::Empty
    } else if words <= MIN_WORDS {
        SkipReason::TooShort { words }
    } else {
        return LinkOutcome::Accepted(Article {
            title: page.title,
            content,
            url: url.to_string(),
        });
    };

    LinkOutcome::Skipped {
        url: url.to_string(),
        reason,
    }
}

/// Accepted articles in visiting order.
pub fn accepted(outcomes: Vec<LinkOutcome>) -> Vec<Article> {
    outcomes
        .into_iter()
        .filter_map(|o| match o {
            LinkOutcome::Accepted(article) => Some(article),
            LinkOutcome::Skipped { .. } => None,
        })
        .collect()
}

/// Searches for a trend and collects qualifying articles, one link at a time.
#[derive(Debug)]
pub struct Harvester<F> {
    fetcher: F,
    search_base: String,
    max_results: usize,
    min_pause: Duration,
    max_pause: Duration,
}

impl<F> Harvester<F>
where
    F: PageFetcher,
{
    pub fn new(fetcher: F, settings: &HarvestSettings) -> Self {
        let (min_pause, max_pause) = settings.pause_bounds();
        Self {
            fetcher,
            search_base: settings.search_url.clone(),
            max_results: settings.max_results,
            min_pause,
            max_pause,
        }
    }

    #[cfg(test)]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Harvest up to `max_results` articles for `trend`.
    #[instrument(level = "info", skip(self))]
    pub async fn harvest(&self, trend: &str) -> Vec<Article> {
        let t0 = Instant::now();
        let links = match self.search(trend).await {
            Ok(links) => links,
            Err(e) => {
                warn!(error = %e, "Search failed; no articles for this trend");
                return Vec::new();
            }
        };
        info!(count = links.len(), "Found candidate links");

        let total = links.len();
        let outcomes: Vec<LinkOutcome> = stream::iter(links.into_iter().enumerate())
            .then(|(i, link)| async move {
                let outcome = self.visit(&link).await;
                log_outcome(&outcome);
                if i + 1 < total {
                    self.pause().await;
                }
                outcome
            })
            .collect()
            .await;

        let articles = accepted(outcomes);
        info!(
            accepted = articles.len(),
            candidates = total,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Harvested trend"
        );
        articles
    }

    async fn search(&self, trend: &str) -> Result<Vec<String>, FetchError> {
        let base = Url::parse(&self.search_base)
            .map_err(|_| FetchError::InvalidUrl(self.search_base.clone()))?;
        let url = search_url(&self.search_base, trend, self.max_results);
        let html = self.fetcher.fetch(&url).await?;
        Ok(extract_candidate_links(&html, &base, self.max_results))
    }

    async fn visit(&self, url: &str) -> LinkOutcome {
        match self.fetcher.fetch(url).await {
            Ok(html) => assess_page(url, &html),
            Err(e) => LinkOutcome::fetch_failed(url, e),
        }
    }

    async fn pause(&self) {
        if self.max_pause.is_zero() {
            return;
        }
        let delay = pause_duration(&mut rng(), self.min_pause, self.max_pause);
        debug!(?delay, "Pausing before next link");
        sleep(delay).await;
    }
}

/// Random politeness delay in `[min, max]`.
fn pause_duration<R: Rng + ?Sized>(rng: &mut R, min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    Duration::from_secs_f64(rng.random_range(min.as_secs_f64()..=max.as_secs_f64()))
}

fn log_outcome(outcome: &LinkOutcome) {
    match outcome {
        LinkOutcome::Accepted(article) => {
            info!(url = %article.url, words = word_count(&article.content), "Article accepted")
        }
        LinkOutcome::Skipped { url, reason } => match reason {
            SkipReason::Forbidden => warn!(%url, "Fetch refused with 403; skipping"),
            SkipReason::Fetch(e) => error!(%url, error = %e, "Fetch failed; skipping"),
            SkipReason::Empty => info!(%url, "No paragraph text; discarded"),
            SkipReason::TooShort { words } => info!(%url, words, "Content too short; discarded"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const SEARCH: &str = "https://search.test/search";

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    fn page(title: &str, n_words: usize) -> String {
        format!(
            "<html><head><title>{}</title></head><body><p>{}</p>\n\n<p>   </p></body></html>",
            title,
            words(n_words)
        )
    }

    fn results(links: &[&str]) -> String {
        links
            .iter()
            .map(|l| format!(r#"<div class="tF2Cxc"><a href="{}">r</a></div>"#, l))
            .collect()
    }

    enum Reply {
        Body(String),
        Fail(u16),
    }

    struct FakeFetcher {
        search: Option<String>,
        pages: HashMap<String, Reply>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn new(search: Option<String>) -> Self {
            Self {
                search,
                pages: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn page(mut self, url: &str, reply: Reply) -> Self {
            self.pages.insert(url.to_string(), reply);
            self
        }

        fn page_calls(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|u| !u.starts_with(SEARCH))
                .cloned()
                .collect()
        }
    }

    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            if url.starts_with(SEARCH) {
                return self.search.clone().ok_or(FetchError::Status(429));
            }
            match self.pages.get(url) {
                Some(Reply::Body(b)) => Ok(b.clone()),
                Some(Reply::Fail(403)) => Err(FetchError::Forbidden),
                Some(Reply::Fail(code)) => Err(FetchError::Status(*code)),
                None => Err(FetchError::Status(404)),
            }
        }
    }

    fn settings() -> HarvestSettings {
        HarvestSettings {
            search_url: SEARCH.to_string(),
            max_results: 5,
            min_pause_secs: 0.0,
            max_pause_secs: 0.0,
            ..HarvestSettings::default()
        }
    }

    #[test]
    fn test_assess_page_accepts_long_content() {
        match assess_page("https://a", &page("Title", 101)) {
            LinkOutcome::Accepted(a) => {
                assert_eq!(a.title, "Title");
                assert_eq!(a.url, "https://a");
                assert_eq!(word_count(&a.content), 101);
                assert_eq!(a.content, normalize_whitespace(&a.content));
            }
            other => panic!("expected accepted, got {:?}", other),
        }
    }

    #[test]
    fn test_assess_page_requires_more_than_min_words() {
        assert_eq!(
            assess_page("https://a", &page("T", MIN_WORDS)),
            LinkOutcome::Skipped {
                url: "https://a".to_string(),
                reason: SkipReason::TooShort { words: MIN_WORDS },
            }
        );
    }

    #[test]
    fn test_assess_page_rejects_empty_content() {
        let html = "<html><head><title>T</title></head><body><div>no paragraphs</div></body></html>";
        assert!(matches!(
            assess_page("https://a", html),
            LinkOutcome::Skipped { reason: SkipReason::Empty, .. }
        ));
    }

    #[test]
    fn test_fetch_failures_map_to_skip_reasons() {
        let forbidden = LinkOutcome::fetch_failed("https://a", FetchError::Forbidden);
        assert!(matches!(
            forbidden,
            LinkOutcome::Skipped { reason: SkipReason::Forbidden, .. }
        ));
        let other = LinkOutcome::fetch_failed("https://a", FetchError::Status(502));
        assert_eq!(
            other,
            LinkOutcome::Skipped {
                url: "https://a".to_string(),
                reason: SkipReason::Fetch("HTTP status 502".to_string()),
            }
        );
    }

    #[test]
    fn test_pause_duration_stays_within_default_bounds() {
        let (min, max) = HarvestSettings::default().pause_bounds();
        assert_eq!((min, max), (Duration::from_secs(1), Duration::from_secs(3)));
        let mut r = rng();
        for _ in 0..500 {
            let d = pause_duration(&mut r, min, max);
            assert!(d >= min && d <= max, "{:?} outside [{:?}, {:?}]", d, min, max);
        }
    }

    #[test]
    fn test_pause_duration_with_equal_or_inverted_bounds() {
        let mut r = rng();
        let two = Duration::from_secs(2);
        assert_eq!(pause_duration(&mut r, two, two), two);
        assert_eq!(pause_duration(&mut r, two, Duration::from_secs(1)), two);
    }

    #[tokio::test]
    async fn test_failed_search_yields_nothing_and_fetches_no_pages() {
        let fetcher = FakeFetcher::new(None).page("https://a.test/1", Reply::Body(page("A", 200)));
        let harvester = Harvester::new(fetcher, &settings());

        let articles = harvester.harvest("anything").await;

        assert!(articles.is_empty());
        assert!(harvester.fetcher().page_calls().is_empty());
        assert_eq!(harvester.fetcher().calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_links_are_skipped_and_order_is_kept() {
        let links = [
            "https://a.test/1",
            "https://b.test/2",
            "https://c.test/3",
            "https://d.test/4",
            "https://e.test/5",
        ];
        let fetcher = FakeFetcher::new(Some(results(&links)))
            .page(links[0], Reply::Fail(403))
            .page(links[1], Reply::Body(page("Second", 150)))
            .page(links[2], Reply::Fail(500))
            .page(links[4], Reply::Body(page("Fifth", 120)));
        let harvester = Harvester::new(fetcher, &settings());

        let articles = harvester.harvest("trend").await;

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Second");
        assert_eq!(articles[0].url, links[1]);
        assert_eq!(articles[1].title, "Fifth");
        assert_eq!(articles[1].url, links[4]);
        assert_eq!(harvester.fetcher().page_calls(), links.to_vec());
    }

    #[tokio::test]
    async fn test_accepted_articles_all_exceed_min_words() {
        let links = ["https://a.test/1", "https://b.test/2", "https://c.test/3"];
        let fetcher = FakeFetcher::new(Some(results(&links)))
            .page(links[0], Reply::Body(page("Short", 100)))
            .page(links[1], Reply::Body(page("Long", 101)))
            .page(links[2], Reply::Body(page("Tiny", 3)));
        let harvester = Harvester::new(fetcher, &settings());

        let articles = harvester.harvest("trend").await;

        assert_eq!(articles.len(), 1);
        assert!(articles.iter().all(|a| word_count(&a.content) > MIN_WORDS));
    }

    #[tokio::test]
    async fn test_visits_at_most_max_results_links() {
        let links: Vec<String> = (0..8).map(|i| format!("https://x.test/{}", i)).collect();
        let refs: Vec<&str> = links.iter().map(String::as_str).collect();
        let harvester = Harvester::new(
            FakeFetcher::new(Some(results(&refs))),
            &HarvestSettings {
                max_results: 3,
                ..settings()
            },
        );

        harvester.harvest("trend").await;

        assert_eq!(harvester.fetcher().page_calls().len(), 3);
    }

    #[tokio::test]
    async fn test_search_request_names_trend_and_result_count() {
        let harvester = Harvester::new(FakeFetcher::new(Some(String::new())), &settings());
        harvester.harvest("solar eclipse").await;
        let calls = harvester.fetcher().calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![format!("{}?q=solar%20eclipse%20in%20english&num=5", SEARCH)]
        );
    }
}
