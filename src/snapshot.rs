//! Durable checkpoint between the harvest and translate phases.
//!
//! Each run writes its [`RunRecord`] to
//! `{dir}/{YYYY-MM-DD_HH-MM-SS}_articles.json` and immediately reads it back.
//! The file is created exclusively, so an existing snapshot is never
//! overwritten. A snapshot that cannot be read or parsed ends the run.

use crate::error::SnapshotError;
use crate::models::RunRecord;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

pub const SNAPSHOT_SUFFIX: &str = "_articles.json";

/// Snapshot path for a record, derived from its timestamp.
pub fn snapshot_path(dir: &Path, record: &RunRecord) -> PathBuf {
    let prefix = record.timestamp.format("%Y-%m-%d_%H-%M-%S");
    dir.join(format!("{}{}", prefix, SNAPSHOT_SUFFIX))
}

/// Persist `record` under `dir` and return the file location.
#[instrument(level = "info", skip_all, fields(dir = %dir.display(), trends = record.trends.len()))]
pub async fn write(dir: &Path, record: &RunRecord) -> Result<PathBuf, SnapshotError> {
    let path = snapshot_path(dir, record);
    let io_err = |source: std::io::Error| SnapshotError::Io {
        path: path.clone(),
        source,
    };

    let json = serde_json::to_string_pretty(record).map_err(|source| SnapshotError::Format {
        path: path.clone(),
        source,
    })?;

    fs::create_dir_all(dir).await.map_err(io_err)?;
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(io_err)?;
    file.write_all(json.as_bytes()).await.map_err(io_err)?;
    file.flush().await.map_err(io_err)?;

    info!(
        path = %path.display(),
        articles = record.trends.article_count(),
        bytes = json.len(),
        "Wrote snapshot"
    );
    Ok(path)
}

/// Load a snapshot written by [`write`].
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read(path: &Path) -> Result<RunRecord, SnapshotError> {
    let raw = fs::read_to_string(path).await.map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let record: RunRecord = serde_json::from_str(&raw).map_err(|source| SnapshotError::Format {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        trends = record.trends.len(),
        articles = record.trends.article_count(),
        "Read snapshot"
    );
    Ok(record)
}
