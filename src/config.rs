//! Run configuration.
//!
//! Two sources feed a run:
//!
//! - [`TranslatorConfig`]: endpoint URL, API key and model, read from the
//!   environment once at startup. Any missing value is fatal before the first
//!   network call is made.
//! - [`Settings`]: the fixed constants of a run (region, limits, delays,
//!   locations, page labels), read from an optional YAML file. Every key has
//!   a default, so a missing file means a default run. Its location comes
//!   from `TREND_TRANSLATE_CONFIG`, falling back to `trend_translate.yaml`.

use crate::error::ConfigError;
use chrono::FixedOffset;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

pub const ENV_SETTINGS_PATH: &str = "TREND_TRANSLATE_CONFIG";
pub const DEFAULT_SETTINGS_PATH: &str = "trend_translate.yaml";
pub const ENV_API_BASE: &str = "OPENAI_API_BASE";
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_API_MODEL: &str = "OPENAI_API_MODEL";

/// Credentials and model for the chat-completion endpoint.
#[derive(Clone)]
pub struct TranslatorConfig {
    /// Full chat-completions URL, e.g. `https://api.openai.com/v1/chat/completions`.
    pub api_base: String,
    /// Bearer credential.
    pub api_key: String,
    /// Model identifier sent with each request.
    pub model: String,
}

impl std::fmt::Debug for TranslatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslatorConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

impl TranslatorConfig {
    /// Build from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            match lookup(name) {
                None => Err(ConfigError::MissingEnv(name)),
                Some(v) if v.trim().is_empty() => Err(ConfigError::EmptyEnv(name)),
                Some(v) => Ok(v.trim().to_string()),
            }
        };

        Ok(Self {
            api_base: required(ENV_API_BASE)?,
            api_key: required(ENV_API_KEY)?,
            model: required(ENV_API_MODEL)?,
        })
    }
}

/// Location of the settings file. Blank values count as unset.
pub fn settings_path<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup(ENV_SETTINGS_PATH)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH))
}

/// Fixed constants of a run, loaded from YAML.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub trends: TrendSettings,
    pub harvest: HarvestSettings,
    pub translate: TranslateSettings,
    pub paths: PathSettings,
    pub site: SiteLabels,
    /// Offset from UTC used for the run timestamp and all dated filenames.
    pub utc_offset_hours: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrendSettings {
    /// Region code passed to the trends feed.
    pub geo: String,
    /// Feed URL without query string.
    pub feed_url: String,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            geo: "US".to_string(),
            feed_url: "https://trends.google.com/trending/rss".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestSettings {
    /// Search endpoint without query string.
    pub search_url: String,
    /// Number of search results requested and candidate links visited.
    pub max_results: usize,
    /// Lower bound of the pause between candidate links, in seconds.
    pub min_pause_secs: f64,
    /// Upper bound of the pause between candidate links, in seconds.
    pub max_pause_secs: f64,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            search_url: "https://www.google.com/search".to_string(),
            max_results: 5,
            min_pause_secs: 1.0,
            max_pause_secs: 3.0,
            connect_timeout_secs: 10,
            read_timeout_secs: 25,
        }
    }
}

impl HarvestSettings {
    pub fn pause_bounds(&self) -> (Duration, Duration) {
        let lo = self.min_pause_secs.max(0.0);
        let hi = self.max_pause_secs.max(lo);
        (Duration::from_secs_f64(lo), Duration::from_secs_f64(hi))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranslateSettings {
    pub max_attempts: usize,
    pub retry_delay_secs: u64,
    pub request_timeout_secs: u64,
    /// Language named in the system instruction.
    pub target_language: String,
    /// System instruction; `{language}` is replaced with `target_language`.
    pub system_prompt: String,
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional translator. Translate the following English text into fluent, accurate {language} that reads naturally to a native speaker. Keep the meaning unchanged and preserve the style and tone of the original. Translate proper nouns and technical terms accurately. Where a literal translation would be awkward, translate by sense from the context so the result stays clear and idiomatic. Output only the translated text, without explanations or notes.";

impl Default for TranslateSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay_secs: 5,
            request_timeout_secs: 15,
            target_language: "Simplified Chinese".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl TranslateSettings {
    pub fn system_instruction(&self) -> String {
        self.system_prompt.replace("{language}", &self.target_language)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub trends_file: PathBuf,
    pub snapshot_dir: PathBuf,
    pub output_dir: PathBuf,
    pub archive_index: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            trends_file: PathBuf::from("trends.txt"),
            snapshot_dir: PathBuf::from("."),
            output_dir: PathBuf::from("docs"),
            archive_index: PathBuf::from("README.md"),
        }
    }
}

/// Fixed strings shown on rendered pages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteLabels {
    pub lang: String,
    pub site_title: String,
    pub updated_label: String,
    pub source_link_label: String,
    pub archive_title: String,
}

impl Default for SiteLabels {
    fn default() -> Self {
        Self {
            lang: "zh-CN".to_string(),
            site_title: "今日谷歌热搜".to_string(),
            updated_label: "更新时间".to_string(),
            source_link_label: "原文链接".to_string(),
            archive_title: "每日谷歌热搜归档".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No settings file; using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.offset()?;
        info!("Loaded settings file");
        Ok(settings)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// The fixed offset used to localize the run timestamp (default UTC+8).
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        let hours = self.utc_offset_hours.unwrap_or(8);
        FixedOffset::east_opt(hours * 3600).ok_or(ConfigError::InvalidOffset(hours))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_translator_config_from_lookup() {
        let vars = env(&[
            (ENV_API_BASE, "https://llm.local/v1/chat/completions"),
            (ENV_API_KEY, "sk-test"),
            (ENV_API_MODEL, " qwen-7b "),
        ]);
        let cfg = TranslatorConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(cfg.api_base, "https://llm.local/v1/chat/completions");
        assert_eq!(cfg.api_key, "sk-test");
        assert_eq!(cfg.model, "qwen-7b");
    }

    #[test]
    fn test_translator_config_names_missing_variable() {
        let vars = env(&[(ENV_API_BASE, "https://llm.local"), (ENV_API_KEY, "sk")]);
        let err = TranslatorConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(ENV_API_MODEL)));
        assert!(err.to_string().contains("OPENAI_API_MODEL"));
    }

    #[test]
    fn test_translator_config_rejects_empty_value() {
        let vars = env(&[
            (ENV_API_BASE, "https://llm.local"),
            (ENV_API_KEY, "   "),
            (ENV_API_MODEL, "m"),
        ]);
        let err = TranslatorConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyEnv(ENV_API_KEY)));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let cfg = TranslatorConfig {
            api_base: "https://llm.local".to_string(),
            api_key: "sk-secret".to_string(),
            model: "m".to_string(),
        };
        let dbg = format!("{:?}", cfg);
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn test_settings_path_from_environment() {
        let set = env(&[(ENV_SETTINGS_PATH, "/etc/trend_translate.yaml")]);
        assert_eq!(
            settings_path(|k| set.get(k).cloned()),
            PathBuf::from("/etc/trend_translate.yaml")
        );
        let blank = env(&[(ENV_SETTINGS_PATH, "  ")]);
        assert_eq!(settings_path(|k| blank.get(k).cloned()), PathBuf::from(DEFAULT_SETTINGS_PATH));
        assert_eq!(settings_path(|_| None), PathBuf::from("trend_translate.yaml"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
trends:
  geo: GB
translate:
  max_attempts: 3
  target_language: German
paths:
  output_dir: site
"#;
        let s = Settings::from_yaml(yaml).unwrap();
        assert_eq!(s.trends.geo, "GB");
        assert_eq!(s.trends.feed_url, "https://trends.google.com/trending/rss");
        assert_eq!(s.translate.max_attempts, 3);
        assert_eq!(s.translate.retry_delay_secs, 5);
        assert_eq!(s.paths.output_dir, PathBuf::from("site"));
        assert_eq!(s.paths.trends_file, PathBuf::from("trends.txt"));
        assert_eq!(s.harvest.max_results, 5);
        assert!(s.translate.system_instruction().contains("German"));
        assert!(!s.translate.system_instruction().contains("{language}"));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let s = Settings::from_yaml("").unwrap();
        assert_eq!(s.harvest.connect_timeout_secs, 10);
        assert_eq!(s.harvest.read_timeout_secs, 25);
        assert_eq!(s.offset().unwrap().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_invalid_offset_is_rejected() {
        let s = Settings::from_yaml("utc_offset_hours: 30").unwrap();
        assert!(matches!(s.offset(), Err(ConfigError::InvalidOffset(30))));
    }

    #[test]
    fn test_pause_bounds_are_ordered() {
        let h = HarvestSettings {
            min_pause_secs: 2.0,
            max_pause_secs: 0.5,
            ..HarvestSettings::default()
        };
        let (lo, hi) = h.pause_bounds();
        assert_eq!(lo, Duration::from_secs(2));
        assert_eq!(hi, Duration::from_secs(2));
    }

    #[test]
    fn test_missing_settings_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(s.trends.geo, "US");
    }

    #[test]
    fn test_broken_settings_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "harvest: [not, a, map").unwrap();
        assert!(matches!(Settings::load(&path), Err(ConfigError::Parse { .. })));
    }
}
