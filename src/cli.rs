//! Command-line interface definitions.
//!
//! The run is parameterless: it takes no flags or positional arguments.
//! Everything tunable lives in the settings file (see
//! [`crate::config::settings_path`]); endpoint credentials come from the
//! environment. Only the standard `--help` and `--version` are accepted.

use clap::Parser;

/// Harvest articles for today's trending queries, translate them and publish.
///
/// # Examples
///
/// ```sh
/// # Defaults, reading ./trend_translate.yaml if it exists
/// trend_translate
///
/// # Another settings file
/// TREND_TRANSLATE_CONFIG=/etc/trend_translate.yaml trend_translate
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {}
