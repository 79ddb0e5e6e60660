// src/error.rs

//! Unified error handling for the APCloudy client.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified client error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The API rejected the credentials (HTTP 401)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limit still in effect after the configured number of retries (HTTP 429)
    #[error("{message}")]
    RateLimit { message: String, retry_after: f64 },

    /// Any other API or transport failure
    #[error("API error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Api {
        message: String,
        status: Option<u16>,
    },

    #[error("Job {0} not found")]
    JobNotFound(String),

    #[error("Spider {0} not found")]
    SpiderNotFound(String),

    #[error("Project {0} not found")]
    ProjectNotFound(String),

    /// A local wait ran out of time
    #[error("Job {job_id} did not complete within {} seconds", .timeout.as_secs())]
    Timeout { job_id: String, timeout: Duration },

    /// A caller-supplied value cannot be sent to the API
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Response payload did not have the expected shape
    #[error("Unexpected response: {0}")]
    Response(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl AppError {
    /// Create an API error carrying an HTTP status.
    pub fn api(message: impl Into<String>, status: u16) -> Self {
        Self::Api {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Create an API error with no HTTP status (transport failures).
    pub fn transport(message: impl fmt::Display) -> Self {
        Self::Api {
            message: format!("Request failed: {message}"),
            status: None,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a response-shape error.
    pub fn response(message: impl Into<String>) -> Self {
        Self::Response(message.into())
    }

    /// HTTP status associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication(_) => Some(401),
            Self::RateLimit { .. } => Some(429),
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }

    /// Replace a 404 API error with the error built by `not_found`.
    pub(crate) fn or_not_found(self, not_found: impl FnOnce() -> AppError) -> Self {
        match self {
            Self::Api {
                status: Some(404), ..
            } => not_found(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Authentication("x".into()).status_code(), Some(401));
        assert_eq!(
            AppError::RateLimit {
                message: "slow down".into(),
                retry_after: 1.0
            }
            .status_code(),
            Some(429)
        );
        assert_eq!(AppError::api("boom", 502).status_code(), Some(502));
        assert_eq!(AppError::transport("refused").status_code(), None);
        assert_eq!(AppError::config("bad").status_code(), None);
    }

    #[test]
    fn test_or_not_found_only_maps_404() {
        let mapped = AppError::api("gone", 404).or_not_found(|| AppError::JobNotFound("j1".into()));
        assert!(matches!(mapped, AppError::JobNotFound(ref id) if id == "j1"));

        let kept = AppError::api("bad", 400).or_not_found(|| AppError::JobNotFound("j1".into()));
        assert!(matches!(kept, AppError::Api { status: Some(400), .. }));
    }

    #[test]
    fn test_display() {
        assert_eq!(AppError::api("boom", 500).to_string(), "API error (500): boom");
        assert_eq!(
            AppError::transport("connection refused").to_string(),
            "API error: Request failed: connection refused"
        );
        let timeout = AppError::Timeout {
            job_id: "abc".into(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(
            timeout.to_string(),
            "Job abc did not complete within 30 seconds"
        );
    }
}
