//! # Trend Translate
//!
//! Harvests news articles for the current trending search queries,
//! translates them with an OpenAI-compatible chat model, and publishes the
//! result as static HTML pages plus a dated Markdown archive.
//!
//! ## Usage
//!
//! ```sh
//! OPENAI_API_BASE=https://api.openai.com/v1/chat/completions \
//! OPENAI_API_KEY=sk-... \
//! OPENAI_API_MODEL=gpt-4o-mini \
//! TREND_TRANSLATE_CONFIG=trend_translate.yaml \
//! trend_translate
//! ```
//!
//! ## Architecture
//!
//! One strictly sequential run:
//! 1. **Trends**: fetch the trending queries and write them to the trend list
//! 2. **Harvest**: search each trend and keep pages with enough paragraph text
//! 3. **Snapshot**: persist the harvest as JSON and read it back
//! 4. **Translate**: translate trend strings, then article bodies (fail-open)
//! 5. **Publish**: write HTML pages, the archive document and the archive index

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod harvest;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod snapshot;
mod trends;
mod utils;

use api::{ChatClient, Translator};
use cli::Cli;
use config::{Settings, TranslatorConfig};
use scrapers::HttpFetcher;
use utils::ensure_writable_dir;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("trend_translate starting up");

    Cli::parse();
    let settings_path = config::settings_path(|name| std::env::var(name).ok());
    debug!(path = %settings_path.display(), "Settings file location");

    // ---- Configuration (fatal) ----
    let settings = Settings::load(&settings_path)?;
    let translator_config = match TranslatorConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Translation endpoint is not configured");
            return Err(e.into());
        }
    };
    info!(model = %translator_config.model, base = %translator_config.api_base, "Translation endpoint configured");

    let offset = settings.offset()?;
    let started = Utc::now().with_timezone(&offset);
    info!(%started, "Run timestamp");

    if let Err(e) = ensure_writable_dir(&settings.paths.output_dir).await {
        error!(
            path = %settings.paths.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Clients ----
    let fetcher = HttpFetcher::new(&settings.harvest)?;
    info!(user_agent = %fetcher.user_agent(), "HTTP client ready");
    let chat = ChatClient::new(&translator_config, &settings.translate)?;
    let translator = Translator::new(chat, &settings.translate);

    // ---- Run ----
    let summary = match pipeline::run(&settings, fetcher, &translator, started).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, elapsed = ?start_time.elapsed(), "Run failed");
            return Err(e);
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        trends = summary.trends,
        articles = summary.articles,
        untranslated = summary.fallbacks,
        snapshot = %summary.snapshot.display(),
        archive = %summary.archive.display(),
        archived_runs = summary.archive_count,
        "Execution complete"
    );

    Ok(())
}
