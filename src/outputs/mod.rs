//! Published output: HTML pages, the Markdown archive and the archive index.
//!
//! # Submodules
//!
//! - [`view`]: builds the [`view::EditionView`] that every renderer consumes
//! - [`html`]: index page and one page per trend
//! - [`markdown`]: the dated archive document for the run
//! - [`indexes`]: regenerates the top-level listing of archive documents
//!
//! # Output Structure
//!
//! ```text
//! README.md                          # archive index
//! docs/
//! ├── index.html                     # links to every trend page
//! ├── 超级碗.html                     # one page per translated trend
//! ├── 日食.html
//! ├── 2025-01-02_08-30_trends.md     # archive document, one per run
//! └── 2025-01-10_09-00_trends.md
//! ```

pub mod html;
pub mod indexes;
pub mod markdown;
pub mod view;

use crate::config::SiteLabels;
use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};
use view::EditionView;

/// Suffix shared by all archive document filenames.
pub const ARCHIVE_SUFFIX: &str = "_trends.md";

/// Create the archive document without touching earlier ones.
///
/// Tries the minute-precision name first, then the seconds-precision name.
async fn create_archive(output_dir: &Path, view: &EditionView, md: &str) -> Result<PathBuf, Box<dyn Error>> {
    for name in [&view.archive_file, &view.archive_fallback] {
        let path = output_dir.join(name);
        match fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(mut file) => {
                file.write_all(md.as_bytes()).await?;
                file.flush().await?;
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                warn!(path = %path.display(), "Archive document already exists; keeping it");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("archive document {} already exists", view.archive_fallback),
    )
    .into())
}

/// Write the index page, every trend page and the archive document.
///
/// Returns the path of the archive document. Existing archive documents are
/// never overwritten.
#[instrument(level = "info", skip_all, fields(dir = %output_dir.display(), trends = view.trends.len()))]
pub async fn publish_edition(
    output_dir: &Path,
    view: &EditionView,
    labels: &SiteLabels,
) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(output_dir).await?;

    for trend in &view.trends {
        let path = output_dir.join(&trend.file_name);
        fs::write(&path, html::render_trend(view, trend, labels)).await?;
        info!(path = %path.display(), articles = trend.articles.len(), "Wrote trend page");
    }

    let index_path = output_dir.join("index.html");
    fs::write(&index_path, html::render_index(view, labels)).await?;
    info!(path = %index_path.display(), "Wrote index page");

    let archive_path = create_archive(output_dir, view, &markdown::render_archive(view)).await?;
    info!(path = %archive_path.display(), "Wrote archive document");

    Ok(archive_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, ArticleSet, Trend};
    use chrono::DateTime;

    #[tokio::test]
    async fn test_publish_edition_writes_all_documents() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("docs");
        let mut set = ArticleSet::new();
        set.push(
            Trend {
                raw: "snow".to_string(),
                translated: Some("雪".to_string()),
            },
            vec![Article {
                title: "Storm".to_string(),
                content: "大雪".to_string(),
                url: "https://a.example".to_string(),
            }],
        );
        set.push(
            Trend {
                raw: "snowfall".to_string(),
                translated: Some("雪".to_string()),
            },
            vec![],
        );
        let ts = DateTime::parse_from_rfc3339("2025-01-02T08:30:00+08:00").unwrap();
        let labels = SiteLabels::default();
        let view = view::build_edition(&set, &ts, &labels);

        let archive = publish_edition(&out, &view, &labels).await.unwrap();

        assert_eq!(archive, out.join("2025-01-02_08-30_trends.md"));
        assert!(out.join("index.html").is_file());
        assert!(out.join("雪.html").is_file());
        assert!(out.join("雪-2.html").is_file());
        let md = std::fs::read_to_string(&archive).unwrap();
        assert!(md.contains("### [Storm](https://a.example)"));
        assert!(md.contains("大雪"));
    }

    fn single_trend(heading: &str) -> ArticleSet {
        let mut set = ArticleSet::new();
        set.push(
            Trend {
                raw: "super bowl".to_string(),
                translated: Some(heading.to_string()),
            },
            vec![Article {
                title: "Recap".to_string(),
                content: "译文".to_string(),
                url: "https://a.example".to_string(),
            }],
        );
        set
    }

    #[tokio::test]
    async fn test_publish_edition_with_long_translated_trend() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("docs");
        let ts = DateTime::parse_from_rfc3339("2025-01-02T08:30:00+08:00").unwrap();
        let labels = SiteLabels::default();
        let view = view::build_edition(&single_trend(&"超级碗".repeat(30)), &ts, &labels);

        publish_edition(&out, &view, &labels).await.unwrap();

        let page = std::fs::read_to_string(out.join(&view.trends[0].file_name)).unwrap();
        assert!(page.contains(&"超级碗".repeat(30)));
    }

    #[tokio::test]
    async fn test_second_run_in_same_minute_keeps_first_archive() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("docs");
        let labels = SiteLabels::default();
        let first_ts = DateTime::parse_from_rfc3339("2025-01-02T08:30:05+08:00").unwrap();
        let second_ts = DateTime::parse_from_rfc3339("2025-01-02T08:30:40+08:00").unwrap();

        let first = view::build_edition(&single_trend("第一次"), &first_ts, &labels);
        let first_path = publish_edition(&out, &first, &labels).await.unwrap();
        let second = view::build_edition(&single_trend("第二次"), &second_ts, &labels);
        let second_path = publish_edition(&out, &second, &labels).await.unwrap();

        assert_eq!(first_path, out.join("2025-01-02_08-30_trends.md"));
        assert_eq!(second_path, out.join("2025-01-02_08-30-40_trends.md"));
        assert!(std::fs::read_to_string(&first_path).unwrap().contains("## 第一次"));
        assert!(std::fs::read_to_string(&second_path).unwrap().contains("## 第二次"));

        let third = publish_edition(&out, &second, &labels).await;
        assert!(third.is_err());
        assert!(std::fs::read_to_string(&second_path).unwrap().contains("## 第二次"));
    }
}
