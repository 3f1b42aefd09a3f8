// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Feed endpoint and polling cadence
    #[serde(default)]
    pub feed: FeedConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Tag and color enrichment settings
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                AppError::config(format!("config file not found: {}", path.display()))
            }
            _ => AppError::Io(e),
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.feed.url.trim().is_empty() {
            return Err(AppError::validation("feed.url is empty"));
        }
        url::Url::parse(&self.feed.url)?;
        if self.feed.poll_interval_secs == 0 {
            return Err(AppError::validation("feed.poll_interval_secs must be > 0"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.enrichment.tag_retry_delay_secs == 0 {
            return Err(AppError::validation(
                "enrichment.tag_retry_delay_secs must be > 0",
            ));
        }
        if self.enrichment.palette_colors < 2 {
            return Err(AppError::validation(
                "enrichment.palette_colors must be between 2 and 255",
            ));
        }
        if !(1..=10).contains(&self.enrichment.palette_quality) {
            return Err(AppError::validation(
                "enrichment.palette_quality must be between 1 and 10",
            ));
        }
        Ok(())
    }
}

/// Sales feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Feed snapshot endpoint
    #[serde(default = "defaults::feed_url")]
    pub url: String,

    /// Seconds between polls
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_secs: u64,
}

impl FeedConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: defaults::feed_url(),
            poll_interval_secs: defaults::poll_interval(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Enrichment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Fixed delay between tag page attempts
    #[serde(default = "defaults::tag_retry_delay")]
    pub tag_retry_delay_secs: u64,

    /// Maximum palette size
    #[serde(default = "defaults::palette_colors")]
    pub palette_colors: u8,

    /// Pixel sampling step (1 = every pixel, 10 = every tenth)
    #[serde(default = "defaults::palette_quality")]
    pub palette_quality: u8,

    #[serde(default = "defaults::enabled")]
    pub tags_enabled: bool,

    #[serde(default = "defaults::enabled")]
    pub colors_enabled: bool,
}

impl EnrichmentConfig {
    pub fn tag_retry_delay(&self) -> Duration {
        Duration::from_secs(self.tag_retry_delay_secs)
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            tag_retry_delay_secs: defaults::tag_retry_delay(),
            palette_colors: defaults::palette_colors(),
            palette_quality: defaults::palette_quality(),
            tags_enabled: defaults::enabled(),
            colors_enabled: defaults::enabled(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter when RUST_LOG is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Feed defaults
    pub fn feed_url() -> String {
        "https://bandcamp.com/api/salesfeed/1/get_initial".into()
    }
    pub fn poll_interval() -> u64 {
        10
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; salesfeed/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Enrichment defaults
    pub fn tag_retry_delay() -> u64 {
        5
    }
    pub fn palette_colors() -> u8 {
        10
    }
    pub fn palette_quality() -> u8 {
        10
    }
    pub fn enabled() -> bool {
        true
    }

    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.feed.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.enrichment.tag_retry_delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[feed]\npoll_interval_secs = 30\n\n[enrichment]\ncolors_enabled = false").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.feed.poll_interval_secs, 30);
        assert_eq!(config.feed.url, defaults::feed_url());
        assert!(!config.enrichment.colors_enabled);
        assert!(config.enrichment.tags_enabled);
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("salesfeed.toml");
        let config = Config::load(path).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(dir.path().join("missing.toml"));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_malformed_file_is_toml_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[feed\nurl = ").unwrap();
        assert!(matches!(Config::load(file.path()), Err(AppError::Toml(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("missing.toml"));
        assert_eq!(config.feed.poll_interval_secs, 10);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.feed.poll_interval_secs = 0;
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));

        let mut config = Config::default();
        config.feed.url = "not a url".into();
        assert!(matches!(config.validate(), Err(AppError::Url(_))));

        let mut config = Config::default();
        config.enrichment.palette_quality = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.enrichment.palette_colors = 1;
        assert!(config.validate().is_err());
    }
}
