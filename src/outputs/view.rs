//! View model consumed by the HTML and Markdown renderers.
//!
//! Building the view is where translated trends get their page filenames.
//! Trend pages are named after the translated trend; when two trends map to
//! the same filename (same translation, or names that differ only in case or
//! in dropped characters) the later ones get a numeric suffix: `雪.html`,
//! `雪-2.html`, `雪-3.html`. The stem `index` is reserved for the index page.
//! Long translations are cut to a bounded stem before the suffix is added.

use crate::config::SiteLabels;
use crate::models::ArticleSet;
use crate::utils::file_stem_for;
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;

/// One run, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditionView {
    /// Archive document heading, e.g. `2025-01-02 08:30 Trending`.
    pub title: String,
    /// Human-readable run time shown on every page.
    pub updated_at: String,
    /// Filename of the archive document for this run.
    pub archive_file: String,
    /// Seconds-precision filename, used when `archive_file` already exists.
    pub archive_fallback: String,
    pub trends: Vec<TrendView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendView {
    /// Translated trend (raw trend if translation fell back).
    pub heading: String,
    /// Page filename, unique within the edition.
    pub file_name: String,
    pub articles: Vec<ArticleView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleView {
    pub title: String,
    pub body: String,
    pub url: String,
}

/// Filename of the archive document for a run started at `timestamp`.
pub fn archive_file_name(timestamp: &DateTime<FixedOffset>) -> String {
    format!("{}{}", timestamp.format("%Y-%m-%d_%H-%M"), super::ARCHIVE_SUFFIX)
}

/// Archive filename that also carries the seconds of the run timestamp.
pub fn archive_fallback_name(timestamp: &DateTime<FixedOffset>) -> String {
    format!("{}{}", timestamp.format("%Y-%m-%d_%H-%M-%S"), super::ARCHIVE_SUFFIX)
}

/// Build the view of a translated article set.
pub fn build_edition(set: &ArticleSet, timestamp: &DateTime<FixedOffset>, labels: &SiteLabels) -> EditionView {
    let updated_at = timestamp.format("%Y-%m-%d %H:%M").to_string();
    let mut names = UniqueNames::new();

    let trends = set
        .entries()
        .iter()
        .map(|entry| {
            let heading = entry.trend.display().to_string();
            let file_name = format!("{}.html", names.claim(&file_stem_for(&heading)));
            let articles = entry
                .articles
                .iter()
                .map(|a| ArticleView {
                    title: a.title.clone(),
                    body: a.content.clone(),
                    url: a.url.clone(),
                })
                .collect();
            TrendView {
                heading,
                file_name,
                articles,
            }
        })
        .collect();

    EditionView {
        title: format!("{} {}", updated_at, labels.site_title),
        updated_at,
        archive_file: archive_file_name(timestamp),
        archive_fallback: archive_fallback_name(timestamp),
        trends,
    }
}

struct UniqueNames {
    seen: HashMap<String, usize>,
}

impl UniqueNames {
    fn new() -> Self {
        let mut seen = HashMap::new();
        seen.insert("index".to_string(), 1);
        Self { seen }
    }

    fn claim(&mut self, stem: &str) -> String {
        let mut n = *self.seen.get(&stem.to_lowercase()).unwrap_or(&0);
        loop {
            n += 1;
            let candidate = if n == 1 {
                stem.to_string()
            } else {
                format!("{}-{}", stem, n)
            };
            let key = candidate.to_lowercase();
            if !self.seen.contains_key(&key) {
                self.seen.insert(stem.to_lowercase(), n);
                self.seen.insert(key, 1);
                return candidate;
            }
        }
    }
}
