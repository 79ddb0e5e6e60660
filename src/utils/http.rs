// src/utils/http.rs

//! HTTP client utilities.

use reqwest::blocking::Client;

use crate::error::Result;
use crate::models::Config;

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("apcloudy-client/", env!("CARGO_PKG_VERSION"));

/// Create a configured blocking HTTP client.
pub fn create_client(config: &Config) -> Result<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.request_timeout())
        .build()?;
    Ok(client)
}

/// `Authorization` header value for an API key.
pub fn bearer(api_key: &str) -> String {
    format!("Bearer {api_key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT.starts_with("apcloudy-client/"));
    }

    #[test]
    fn test_bearer() {
        assert_eq!(bearer("abc"), "Bearer abc");
    }

    #[test]
    fn test_create_client() {
        assert!(create_client(&Config::default()).is_ok());
    }
}
