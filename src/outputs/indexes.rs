//! Archive index regeneration.
//!
//! The archive index is a Markdown listing of every archive document in the
//! output directory, most recent first:
//!
//! ```text
//! # Daily Trends Archive
//!
//! - [2025-01-10 09:00](docs/2025-01-10_09-00_trends.md)
//! - [2025-01-02 08:30](docs/2025-01-02_08-30_trends.md)
//! ```
//!
//! The listing is rebuilt from the directory contents on every run rather
//! than appended to, so it always matches what is on disk.

use super::ARCHIVE_SUFFIX;
use chrono::NaiveDateTime;
use itertools::Itertools;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Human-readable label for an archive filename.
///
/// `2025-01-02_08-30_trends.md` becomes `2025-01-02 08:30` and
/// `2025-01-02_08-30-40_trends.md` becomes `2025-01-02 08:30:40`; names that
/// do not follow the archive pattern fall back to the file stem.
pub fn archive_label(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);
    let prefix = file_name.strip_suffix(ARCHIVE_SUFFIX).unwrap_or(stem);
    if let Ok(dt) = NaiveDateTime::parse_from_str(prefix, "%Y-%m-%d_%H-%M") {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    match NaiveDateTime::parse_from_str(prefix, "%Y-%m-%d_%H-%M-%S") {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => stem.to_string(),
    }
}

/// Render the listing for `file_names`, sorted by filename descending.
pub fn render_archive_index<I>(title: &str, link_prefix: &str, file_names: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let prefix = link_prefix.trim_end_matches('/');
    let mut md = format!("# {}\n\n", title);
    for name in file_names.into_iter().sorted_by(|a, b| b.cmp(a)) {
        let target = if prefix.is_empty() || prefix == "." {
            urlencoding::encode(&name).into_owned()
        } else {
            format!("{}/{}", prefix, urlencoding::encode(&name))
        };
        md.push_str(&format!("- [{}]({})\n", archive_label(&name), target));
    }
    md
}

/// Archive documents in `dir`: every `.md` file except `README.md`.
pub async fn list_archive_files(dir: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    let mut names = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if name.ends_with(".md") && name != "README.md" {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Link prefix from the index file's directory to the archive directory.
fn link_prefix(index_path: &Path, archive_dir: &Path) -> String {
    let base = index_path.parent().unwrap_or(Path::new(""));
    let rel = archive_dir.strip_prefix(base).unwrap_or(archive_dir);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .filter(|c| c != ".")
        .join("/")
}

/// Rewrite the archive index at `index_path` from the contents of `archive_dir`.
///
/// Returns the number of archive documents listed.
#[instrument(level = "info", skip_all, fields(index = %index_path.display(), dir = %archive_dir.display()))]
pub async fn update_archive_index(
    index_path: &Path,
    archive_dir: &Path,
    title: &str,
) -> Result<usize, Box<dyn Error>> {
    let names = list_archive_files(archive_dir).await?;
    let count = names.len();
    let md = render_archive_index(title, &link_prefix(index_path, archive_dir), names);
    fs::write(index_path, md).await?;
    info!(count, "Updated archive index");
    Ok(count)
}
