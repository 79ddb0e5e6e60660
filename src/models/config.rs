//! Client configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Client configuration.
///
/// Every field is optional in TOML; missing values take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// API key sent as a bearer token
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the REST API, treated as a directory
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::request_timeout")]
    pub request_timeout_secs: u64,

    /// Retries on 5xx responses and transport failures
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff, in seconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_secs: f64,

    /// Multiplier applied per retry attempt
    #[serde(default = "defaults::backoff_factor")]
    pub backoff_factor: f64,

    /// Retries on 429 responses
    #[serde(default = "defaults::max_rate_limit_retries")]
    pub max_rate_limit_retries: u32,

    /// Fixed wait after a 429 response, in seconds
    #[serde(default = "defaults::rate_limit_delay")]
    pub rate_limit_delay_secs: f64,

    #[serde(default = "defaults::units")]
    pub default_units: u32,

    #[serde(default)]
    pub default_priority: i32,

    #[serde(default = "defaults::page_size")]
    pub default_page_size: u32,

    #[serde(default = "defaults::max_page_size")]
    pub max_page_size: u32,

    /// Seconds between status checks in `wait_for_completion`
    #[serde(default = "defaults::poll_interval")]
    pub default_poll_interval_secs: u64,

    /// Upper bound for `wait_for_completion`; `None` waits forever
    #[serde(default)]
    pub default_job_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values before any network call.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::config("api_key is not set"));
        }
        if self.base_url.trim().is_empty() {
            return Err(AppError::config("base_url is not set"));
        }
        Url::parse(&self.base_url)
            .map_err(|e| AppError::config(format!("base_url '{}' is invalid: {e}", self.base_url)))?;
        if self.request_timeout_secs == 0 {
            return Err(AppError::config("request_timeout_secs must be > 0"));
        }
        if self.max_page_size == 0 {
            return Err(AppError::config("max_page_size must be > 0"));
        }
        if self.default_poll_interval_secs == 0 {
            return Err(AppError::config("default_poll_interval_secs must be > 0"));
        }
        for (name, value) in [
            ("retry_delay_secs", self.retry_delay_secs),
            ("backoff_factor", self.backoff_factor),
            ("rate_limit_delay_secs", self.rate_limit_delay_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::config(format!(
                    "{name} must be a non-negative number"
                )));
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.default_poll_interval_secs)
    }

    pub fn job_timeout(&self) -> Option<Duration> {
        self.default_job_timeout_secs.map(Duration::from_secs)
    }

    /// Clamp a requested page size into `[1, max_page_size]`.
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: defaults::base_url(),
            request_timeout_secs: defaults::request_timeout(),
            max_retries: defaults::max_retries(),
            retry_delay_secs: defaults::retry_delay(),
            backoff_factor: defaults::backoff_factor(),
            max_rate_limit_retries: defaults::max_rate_limit_retries(),
            rate_limit_delay_secs: defaults::rate_limit_delay(),
            default_units: defaults::units(),
            default_priority: 0,
            default_page_size: defaults::page_size(),
            max_page_size: defaults::max_page_size(),
            default_poll_interval_secs: defaults::poll_interval(),
            default_job_timeout_secs: None,
        }
    }
}

mod defaults {
    pub fn base_url() -> String {
        "https://api.apcloudy.com/api/v1/".into()
    }
    pub fn request_timeout() -> u64 {
        30
    }
    pub fn max_retries() -> u32 {
        3
    }
    pub fn retry_delay() -> f64 {
        1.0
    }
    pub fn backoff_factor() -> f64 {
        2.0
    }
    pub fn max_rate_limit_retries() -> u32 {
        5
    }
    pub fn rate_limit_delay() -> f64 {
        60.0
    }
    pub fn units() -> u32 {
        1
    }
    pub fn page_size() -> u32 {
        100
    }
    pub fn max_page_size() -> u32 {
        1000
    }
    pub fn poll_interval() -> u64 {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            api_key: "secret".into(),
            ..Config::default()
        }
    }

    #[test]
    fn validate_default_config_requires_api_key() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_base_url() {
        let mut config = valid();
        config.base_url = "   ".into();
        assert!(config.validate().is_err());

        config.base_url = "not a url".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_numbers() {
        let mut config = valid();
        config.backoff_factor = -1.0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.retry_delay_secs = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.max_page_size = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.default_poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn page_size_is_clamped() {
        let config = valid();
        assert_eq!(config.page_size(None), 100);
        assert_eq!(config.page_size(Some(0)), 1);
        assert_eq!(config.page_size(Some(5000)), 1000);
        assert_eq!(config.page_size(Some(42)), 42);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            api_key = "k"
            max_retries = 7
            default_job_timeout_secs = 600
            "#,
        )
        .unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.max_retries, 7);
        assert_eq!(config.job_timeout(), Some(Duration::from_secs(600)));
        assert_eq!(config.base_url, defaults::base_url());
        assert_eq!(config.backoff_factor, 2.0);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(dir.path().join("missing.toml")).is_err());

        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = \"abc\"\nmax_page_size = 50\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.max_page_size, 50);
    }
}
