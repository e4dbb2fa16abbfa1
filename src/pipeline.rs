//! One linear run: trends, harvest, snapshot, translate, publish, index.
//!
//! Every step runs to completion before the next starts and every network
//! call is awaited in turn. Harvesting and translating absorb their own
//! failures; anything that reaches `?` here ends the run.

use crate::api::{AskAsync, Translator};
use crate::config::Settings;
use crate::harvest::Harvester;
use crate::models::{ArticleSet, RunRecord, Trend};
use crate::outputs::{self, indexes, view};
use crate::scrapers::PageFetcher;
use crate::{snapshot, trends};
use chrono::{DateTime, FixedOffset};
use std::error::Error;
use std::path::PathBuf;
use tracing::{error, info, instrument, warn};

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub trends: usize,
    pub articles: usize,
    /// Texts published untranslated because translation kept failing.
    pub fallbacks: usize,
    pub snapshot: PathBuf,
    pub archive: PathBuf,
    pub archive_count: usize,
}

/// Harvest every trend in order. Repeated trends are harvested again.
pub async fn harvest_all<F: PageFetcher>(harvester: &Harvester<F>, trends: &[String]) -> ArticleSet {
    let mut set = ArticleSet::new();
    for (i, raw) in trends.iter().enumerate() {
        info!(index = i, total = trends.len(), trend = %raw, "Harvesting");
        let articles = harvester.harvest(raw).await;
        set.push(Trend::new(raw.clone()), articles);
    }
    info!(trends = set.len(), articles = set.article_count(), "Harvest complete");
    set
}

/// Translate every trend string, then every article body, in place.
pub async fn translate_all<T>(translator: &Translator<T>, set: &mut ArticleSet)
where
    T: AskAsync<Response = String>,
{
    for entry in set.entries_mut().iter_mut() {
        info!(trend = %entry.trend.raw, "Translating trend");
        let translated = translator.translate(&entry.trend.raw).await;
        entry.trend.translated = Some(translated);
    }
    for entry in set.entries_mut().iter_mut() {
        for article in entry.articles.iter_mut() {
            info!(url = %article.url, title = %article.title, "Translating article");
            article.content = translator.translate(&article.content).await;
        }
    }
}

/// Whether a reloaded record still lists exactly the harvested trends, in order.
pub fn keys_match(trends: &[String], set: &ArticleSet) -> bool {
    set.keys().eq(trends.iter().map(String::as_str))
}

/// Run the whole pipeline once.
#[instrument(level = "info", skip_all, fields(started = %started))]
pub async fn run<F, T>(
    settings: &Settings,
    fetcher: F,
    translator: &Translator<T>,
    started: DateTime<FixedOffset>,
) -> Result<RunSummary, Box<dyn Error>>
where
    F: PageFetcher,
    T: AskAsync<Response = String>,
{
    let paths = &settings.paths;

    // ---- Trends ----
    let fetched = trends::fetch_trends(&fetcher, &settings.trends).await?;
    trends::write_trend_list(&paths.trends_file, &fetched).await?;
    let trend_list = trends::read_trend_list(&paths.trends_file).await?;

    // ---- Harvest ----
    let harvester = Harvester::new(fetcher, &settings.harvest);
    let harvested = harvest_all(&harvester, &trend_list).await;

    // ---- Snapshot ----
    let record = RunRecord {
        trends: harvested,
        timestamp: started,
    };
    let snapshot_path = snapshot::write(&paths.snapshot_dir, &record).await?;
    let RunRecord {
        trends: mut set,
        timestamp,
    } = snapshot::read(&snapshot_path).await?;
    if set.is_empty() {
        warn!("No trends to publish; writing an empty edition");
    }
    if !keys_match(&trend_list, &set) {
        error!(
            expected = trend_list.len(),
            found = set.len(),
            "Snapshot trends differ from the harvested list; publishing the snapshot's trends"
        );
    }

    // ---- Translate ----
    translate_all(translator, &mut set).await;

    // ---- Publish ----
    let edition = view::build_edition(&set, &timestamp, &settings.site);
    let archive = outputs::publish_edition(&paths.output_dir, &edition, &settings.site).await?;
    let archive_count =
        indexes::update_archive_index(&paths.archive_index, &paths.output_dir, &settings.site.archive_title)
            .await?;

    Ok(RunSummary {
        trends: set.len(),
        articles: set.article_count(),
        fallbacks: translator.fallbacks(),
        snapshot: snapshot_path,
        archive,
        archive_count,
    })
}
