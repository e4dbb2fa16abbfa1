//! Error types for each stage of the pipeline.
//!
//! Only [`ConfigError`], [`TrendError`] and [`SnapshotError`] ever reach the
//! orchestrator. [`FetchError`] and [`TranslateError`] are absorbed inside the
//! harvester and translator and only show up in logs.

use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration problems. All of these are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("environment variable {0} is set but empty")]
    EmptyEnv(&'static str),

    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid UTC offset of {0} hours")]
    InvalidOffset(i32),
}

/// A single page fetch that did not produce a usable body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("403 forbidden")]
    Forbidden,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid url {0}")]
    InvalidUrl(String),
}

/// One failed translation attempt.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response shape: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for TranslateError {
    fn from(e: reqwest::Error) -> Self {
        TranslateError::Transport(e.to_string())
    }
}

/// Trend source and trend list file failures.
#[derive(Debug, Error)]
pub enum TrendError {
    #[error("trend feed request failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("trend feed is not valid RSS: {0}")]
    Feed(#[from] quick_xml::DeError),

    #[error("trend list file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Snapshot write and read failures. A read failure ends the run.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot {path} is not a valid run record: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
