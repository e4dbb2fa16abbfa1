//! Text and file system helpers.
//!
//! - Whitespace normalization and word counting for the article quality filter
//! - Log-friendly truncation of long strings
//! - Filename-safe stems for per-trend pages
//! - Output directory validation

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Collapse every run of whitespace to one space and trim both ends.
///
/// The output never contains two consecutive whitespace characters and
/// applying it twice gives the same result.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Number of whitespace-delimited words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes on a character boundary, with
/// an ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Longest filename stem in bytes, leaving room for a `-N` suffix and an
/// extension under the usual 255-byte filename limit.
pub const MAX_STEM_BYTES: usize = 150;

/// Turn a (translated) trend into a filename stem.
///
/// Spaces become underscores; path separators and characters that are not
/// portable in filenames are dropped. Long stems are cut on a character
/// boundary at [`MAX_STEM_BYTES`]. Falls back to `"trend"` when nothing is
/// left.
pub fn file_stem_for(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '#' | '%' => None,
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();
    let mut cut = stem.len().min(MAX_STEM_BYTES);
    while !stem.is_char_boundary(cut) {
        cut -= 1;
    }
    let stem = stem[..cut].trim_matches('.');
    if stem.is_empty() {
        "trend".to_string()
    } else {
        stem.to_string()
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    fs::write(&probe_path, b"").await?;
    let _ = fs::remove_file(&probe_path).await;
    info!("Output directory is writable");
    Ok(())
}
