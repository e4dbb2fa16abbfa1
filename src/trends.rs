//! Trending query source and the trend list file.
//!
//! Trends come from the Google Trends RSS feed for a region; the item titles
//! in feed order are the trending queries. The list is written to a plain
//! text file (one trend per line) and read back before harvesting, so the
//! file on disk is the list the run actually processed.

use crate::config::TrendSettings;
use crate::error::TrendError;
use crate::scrapers::PageFetcher;
use crate::utils::normalize_whitespace;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    title: String,
}

pub fn feed_url(settings: &TrendSettings) -> String {
    format!("{}?geo={}", settings.feed_url, urlencoding::encode(&settings.geo))
}

/// Trend titles from an RSS document, in feed order. Blank titles are dropped.
pub fn parse_feed(xml: &str) -> Result<Vec<String>, TrendError> {
    let rss: Rss = quick_xml::de::from_str(xml)?;
    Ok(rss
        .channel
        .items
        .into_iter()
        .map(|item| normalize_whitespace(&item.title))
        .filter(|title| !title.is_empty())
        .collect())
}

/// Fetch the current trending queries for the configured region.
#[instrument(level = "info", skip_all, fields(geo = %settings.geo))]
pub async fn fetch_trends<F: PageFetcher>(
    fetcher: &F,
    settings: &TrendSettings,
) -> Result<Vec<String>, TrendError> {
    let url = feed_url(settings);
    let xml = fetcher.fetch(&url).await?;
    let trends = parse_feed(&xml)?;
    info!(count = trends.len(), "Fetched trends");
    debug!(?trends, "Trends");
    Ok(trends)
}

/// Write one trend per line.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = trends.len()))]
pub async fn write_trend_list(path: &Path, trends: &[String]) -> Result<(), TrendError> {
    let mut body = String::new();
    for trend in trends {
        body.push_str(trend);
        body.push('\n');
    }
    fs::write(path, body).await.map_err(|source| TrendError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote trend list");
    Ok(())
}

/// Read a trend list back: lines trimmed, blank lines ignored.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_trend_list(path: &Path) -> Result<Vec<String>, TrendError> {
    let body = fs::read_to_string(path).await.map_err(|source| TrendError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let trends: Vec<String> = body
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    info!(count = trends.len(), "Read trend list");
    Ok(trends)
}
