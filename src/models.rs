//! Data models shared by the harvest, snapshot, translate and publish stages.
//!
//! - [`Trend`]: a trending query, with its translation once known
//! - [`Article`]: one harvested article that passed the quality filter
//! - [`ArticleSet`]: trends in harvest order, each with its articles
//! - [`RunRecord`]: the article set plus the run timestamp, as persisted in a
//!   snapshot file

use chrono::{DateTime, FixedOffset};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A trending search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trend {
    /// The query as reported by the trend source.
    pub raw: String,
    /// The query in the target language, set during the translate phase.
    pub translated: Option<String>,
}

impl Trend {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            translated: None,
        }
    }

    /// The translated text if available, otherwise the raw query.
    pub fn display(&self) -> &str {
        self.translated.as_deref().unwrap_or(&self.raw)
    }
}

/// A harvested article.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// Page `<title>`, empty when the page had none.
    pub title: String,
    /// Whitespace-normalized paragraph text, later replaced by its translation.
    pub content: String,
    /// The page the article was read from.
    pub url: String,
}

/// One trend and the articles harvested for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendEntry {
    pub trend: Trend,
    pub articles: Vec<Article>,
}

/// Trends in harvest order, each with its articles.
///
/// Serializes to a JSON object keyed by the raw trend. Entries keep their
/// insertion order in both directions, and repeated keys are kept as separate
/// entries rather than merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleSet {
    entries: Vec<TrendEntry>,
}

impl ArticleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, trend: Trend, articles: Vec<Article>) {
        self.entries.push(TrendEntry { trend, articles });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TrendEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [TrendEntry] {
        &mut self.entries
    }

    /// Raw trend keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.trend.raw.as_str())
    }

    pub fn article_count(&self) -> usize {
        self.entries.iter().map(|e| e.articles.len()).sum()
    }
}

impl Serialize for ArticleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.trend.raw, &entry.articles)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ArticleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ArticleSetVisitor;

        impl<'de> Visitor<'de> for ArticleSetVisitor {
            type Value = ArticleSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of trend to article list")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut set = ArticleSet::new();
                while let Some((raw, articles)) = access.next_entry::<String, Vec<Article>>()? {
                    set.push(Trend::new(raw), articles);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(ArticleSetVisitor)
    }
}

/// Everything a run harvested, as written to and read from a snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunRecord {
    pub trends: ArticleSet,
    #[serde(rename = "datetime")]
    pub timestamp: DateTime<FixedOffset>,
}
