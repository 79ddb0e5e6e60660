// src/services/executor.rs

//! Request executor.
//!
//! Every API call goes through [`RequestExecutor::execute`], which resolves
//! the endpoint, attaches credentials and applies the retry policy:
//!
//! | Outcome               | Action                                            |
//! |-----------------------|---------------------------------------------------|
//! | 2xx                   | parse JSON body                                   |
//! | 429                   | wait `rate_limit_delay`, up to `max_rate_limit_retries` |
//! | 401                   | fail, no retry                                    |
//! | 409                   | fail with the body's `error` field, no retry      |
//! | 5xx / transport error | exponential backoff, up to `max_retries`          |
//! | other 4xx             | fail, no retry                                    |

use std::time::Duration;

use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::services::transport::{ApiRequest, ApiResponse, RequestBody, Transport};
use crate::utils::clock::Clock;
use crate::utils::http::{USER_AGENT, bearer};
use crate::utils::{base_url, resolve_endpoint};

/// Retry knobs taken from [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: f64,
    pub backoff_factor: f64,
    pub max_rate_limit_retries: u32,
    pub rate_limit_delay: f64,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based): `retry_delay * backoff_factor^attempt`.
    ///
    /// There is no upper cap; the retry count bounds the total wait.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let secs = self.retry_delay * self.backoff_factor.powi(attempt as i32);
        secs_to_duration(secs)
    }

    pub fn rate_limit_wait(&self) -> Duration {
        secs_to_duration(self.rate_limit_delay)
    }
}

impl From<&Config> for RetryPolicy {
    fn from(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries,
            retry_delay: config.retry_delay_secs,
            backoff_factor: config.backoff_factor,
            max_rate_limit_retries: config.max_rate_limit_retries,
            rate_limit_delay: config.rate_limit_delay_secs,
        }
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Executes API calls with authentication and retry handling.
pub struct RequestExecutor {
    base: Url,
    authorization: String,
    timeout: Duration,
    policy: RetryPolicy,
    transport: Box<dyn Transport>,
    clock: Box<dyn Clock>,
}

impl RequestExecutor {
    /// Build an executor from a validated configuration.
    pub fn new(
        config: &Config,
        transport: Box<dyn Transport>,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            base: base_url(&config.base_url)?,
            authorization: bearer(&config.api_key),
            timeout: config.request_timeout(),
            policy: RetryPolicy::from(config),
            transport,
            clock,
        })
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Perform a request and return the decoded JSON body.
    pub fn execute(
        &self,
        method: Method,
        path: &[&str],
        body: RequestBody,
        query: &[(&str, String)],
    ) -> Result<Value> {
        let request = ApiRequest {
            method,
            url: resolve_endpoint(&self.base, path)?,
            headers: vec![
                ("Authorization".to_string(), self.authorization.clone()),
                ("User-Agent".to_string(), USER_AGENT.to_string()),
            ],
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            body,
            timeout: self.timeout,
        };

        let policy = &self.policy;
        let mut attempt: u32 = 0;
        let mut rate_limited: u32 = 0;

        while attempt <= policy.max_retries {
            log::debug!(
                "{} {} (attempt {}/{})",
                request.method,
                request.url,
                attempt + 1,
                policy.max_retries + 1
            );

            let response = match self.transport.send(&request) {
                Ok(response) => response,
                Err(e) => {
                    if attempt < policy.max_retries {
                        let delay = policy.backoff(attempt);
                        log::warn!(
                            "Request to {} failed: {}. Retrying in {:?}",
                            request.url,
                            e,
                            delay
                        );
                        self.clock.sleep(delay);
                        attempt += 1;
                        continue;
                    }
                    return Err(AppError::transport(e));
                }
            };

            match response.status {
                429 => {
                    if rate_limited < policy.max_rate_limit_retries {
                        rate_limited += 1;
                        let delay = policy.rate_limit_wait();
                        log::warn!(
                            "Rate limited by {} ({}/{}). Waiting {:?}",
                            request.url,
                            rate_limited,
                            policy.max_rate_limit_retries,
                            delay
                        );
                        self.clock.sleep(delay);
                        continue;
                    }
                    return Err(AppError::RateLimit {
                        message: format!(
                            "Rate limit exceeded. Retry after {} seconds",
                            policy.rate_limit_delay
                        ),
                        retry_after: policy.rate_limit_delay,
                    });
                }
                401 => return Err(AppError::Authentication("Invalid API key".into())),
                409 => return Err(AppError::api(conflict_message(&response), 409)),
                _ => {}
            }

            if !response.is_success() {
                let message = error_message(&response);
                if response.status >= 500 && attempt < policy.max_retries {
                    let delay = policy.backoff(attempt);
                    log::warn!(
                        "Server error {} from {}: {}. Retrying in {:?}",
                        response.status,
                        request.url,
                        message,
                        delay
                    );
                    self.clock.sleep(delay);
                    attempt += 1;
                    continue;
                }
                return Err(AppError::api(message, response.status));
            }

            return parse_body(&response.body);
        }

        Err(AppError::Api {
            message: "Maximum retries exceeded".into(),
            status: None,
        })
    }

    pub fn get(&self, path: &[&str], query: &[(&str, String)]) -> Result<Value> {
        self.execute(Method::GET, path, RequestBody::Empty, query)
    }

    pub fn post(&self, path: &[&str], body: RequestBody) -> Result<Value> {
        self.execute(Method::POST, path, body, &[])
    }

    pub fn delete(&self, path: &[&str], body: RequestBody) -> Result<Value> {
        self.execute(Method::DELETE, path, body, &[])
    }
}

fn parse_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

/// Message for a failed response: the JSON `message` field when present.
fn error_message(response: &ApiResponse) -> String {
    match serde_json::from_str::<Value>(&response.body) {
        Ok(json) => json
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", response.status)),
        Err(_) => format!("HTTP {}: {}", response.status, response.body),
    }
}

/// Message for a 409 response: the JSON `error` field when present.
fn conflict_message(response: &ApiResponse) -> String {
    serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|json| json.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| format!("HTTP 409: {}", response.body))
}
