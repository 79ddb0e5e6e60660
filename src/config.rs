// src/config.rs

//! Configuration loading utilities.
//!
//! Settings come from three layers, later layers winning:
//! built-in defaults, an optional TOML file, then `APCLOUDY_*` environment
//! variables.

use std::path::Path;
use std::str::FromStr;

use crate::error::{AppError, Result};
use crate::models::Config;

pub const ENV_API_KEY: &str = "APCLOUDY_API_KEY";
pub const ENV_BASE_URL: &str = "APCLOUDY_BASE_URL";

impl Config {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        Self::default().overlay_env(|key| std::env::var(key).ok())
    }

    /// Apply `APCLOUDY_*` variables resolved through `lookup`.
    pub fn overlay_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_API_KEY) {
            self.api_key = value;
        }
        if let Some(value) = lookup(ENV_BASE_URL) {
            self.base_url = value;
        }

        let env = EnvReader { lookup: &lookup };
        env.apply("APCLOUDY_REQUEST_TIMEOUT", &mut self.request_timeout_secs)?;
        env.apply("APCLOUDY_MAX_RETRIES", &mut self.max_retries)?;
        env.apply("APCLOUDY_RETRY_DELAY", &mut self.retry_delay_secs)?;
        env.apply("APCLOUDY_BACKOFF_FACTOR", &mut self.backoff_factor)?;
        env.apply(
            "APCLOUDY_MAX_RATE_LIMIT_RETRIES",
            &mut self.max_rate_limit_retries,
        )?;
        env.apply("APCLOUDY_RATE_LIMIT_DELAY", &mut self.rate_limit_delay_secs)?;
        env.apply("APCLOUDY_DEFAULT_UNITS", &mut self.default_units)?;
        env.apply("APCLOUDY_DEFAULT_PRIORITY", &mut self.default_priority)?;
        env.apply("APCLOUDY_DEFAULT_PAGE_SIZE", &mut self.default_page_size)?;
        env.apply("APCLOUDY_MAX_PAGE_SIZE", &mut self.max_page_size)?;
        env.apply("APCLOUDY_POLL_INTERVAL", &mut self.default_poll_interval_secs)?;

        if let Some(raw) = env.get("APCLOUDY_JOB_TIMEOUT") {
            let secs: u64 = parse_var("APCLOUDY_JOB_TIMEOUT", &raw)?;
            // 0 disables the timeout
            self.default_job_timeout_secs = (secs > 0).then_some(secs);
        }

        Ok(self)
    }
}

struct EnvReader<'a, F> {
    lookup: &'a F,
}

impl<F> EnvReader<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn apply<T: FromStr>(&self, key: &str, target: &mut T) -> Result<()>
    where
        T::Err: std::fmt::Display,
    {
        if let Some(raw) = self.get(key) {
            *target = parse_var(key, &raw)?;
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::config(format!("{key}='{raw}' is invalid: {e}")))
}

/// Load configuration from an optional TOML file, then the environment.
///
/// A file that was asked for must load; only its absence means defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let base = match path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    base.overlay_env(|key| std::env::var(key).ok())
}
