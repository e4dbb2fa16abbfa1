//! Page fetching and markup extraction for the harvester.
//!
//! Network access goes through the [`PageFetcher`] trait so the harvest
//! sequencing can run against in-memory pages in tests. Markup knowledge is
//! confined to two adapters:
//!
//! | Module | Entry point | Reads |
//! |--------|-------------|-------|
//! | [`google`] | [`google::extract_candidate_links`] | search result page |
//! | [`article`] | [`article::extract_title_and_paragraphs`] | candidate article page |
//!
//! When the search engine or a site changes its markup only the matching
//! adapter needs to change.

pub mod article;
pub mod google;

use crate::config::HarvestSettings;
use crate::error::FetchError;
use rand::rng;
use rand::seq::IndexedRandom;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument};

/// Browser identities rotated per run to reduce blocking.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0.3 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.212 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.107 Safari/537.36",
];

/// Fetches a page body as text.
pub trait PageFetcher {
    /// GET `url` and return the body of a 2xx response.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// [`PageFetcher`] backed by a reqwest client with one user agent for the
/// whole run.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    user_agent: &'static str,
}

impl HttpFetcher {
    /// Build a client with the harvest timeouts and a randomly chosen user agent.
    pub fn new(settings: &HarvestSettings) -> Result<Self, FetchError> {
        let user_agent = USER_AGENTS.choose(&mut rng()).copied().unwrap_or(USER_AGENTS[0]);
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .read_timeout(Duration::from_secs(settings.read_timeout_secs))
            .build()?;
        debug!(%user_agent, "Built HTTP client");
        Ok(Self { client, user_agent })
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if status == StatusCode::FORBIDDEN {
            return Err(FetchError::Forbidden);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(resp.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_fetcher_picks_known_user_agent() {
        let fetcher = HttpFetcher::new(&HarvestSettings::default()).unwrap();
        assert!(USER_AGENTS.contains(&fetcher.user_agent()));
    }

    #[test]
    fn test_forbidden_is_reported_distinctly() {
        assert_eq!(FetchError::Forbidden.to_string(), "403 forbidden");
        assert_eq!(FetchError::Status(500).to_string(), "HTTP status 500");
    }
}
