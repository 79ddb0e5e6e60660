//! HTTP transport abstraction.
//!
//! The request executor builds an [`ApiRequest`] and hands it to a
//! [`Transport`]. Production code uses [`ReqwestTransport`]; tests swap in a
//! scripted implementation.

use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::{Client, multipart};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::error::Result;
use crate::models::Config;
use crate::utils::http::create_client;

/// A fully resolved request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub timeout: Duration,
}

impl ApiRequest {
    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Request payload.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart {
        fields: Vec<(String, String)>,
        file: FilePart,
    },
}

/// A file attached to a multipart request.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub content: Vec<u8>,
}

/// Raw response: status and body text.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Connection, timeout or I/O failure before a response was read.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self(e.to_string())
    }
}

/// Executes a single HTTP exchange.
pub trait Transport: Send + Sync {
    fn send(&self, request: &ApiRequest) -> std::result::Result<ApiResponse, TransportError>;
}

/// Blocking transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
        })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &ApiRequest) -> std::result::Result<ApiResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart { fields, file } => {
                let mut form = multipart::Form::new();
                for (name, value) in fields {
                    form = form.text(name.clone(), value.clone());
                }
                let part = multipart::Part::bytes(file.content.clone())
                    .file_name(file.file_name.clone())
                    .mime_str(&file.mime)?;
                builder.multipart(form.part(file.field.clone(), part))
            }
        };

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_lookups() {
        let request = ApiRequest {
            method: Method::GET,
            url: Url::parse("https://example.com/jobs/list").unwrap(),
            headers: vec![("Authorization".into(), "Bearer k".into())],
            query: vec![("count".into(), "10".into())],
            body: RequestBody::Empty,
            timeout: Duration::from_secs(1),
        };
        assert_eq!(request.header("authorization"), Some("Bearer k"));
        assert_eq!(request.query_param("count"), Some("10"));
        assert_eq!(request.query_param("offset"), None);
    }

    #[test]
    fn test_response_success_range() {
        assert!(ApiResponse::new(200, "").is_success());
        assert!(ApiResponse::new(204, "").is_success());
        assert!(!ApiResponse::new(302, "").is_success());
        assert!(!ApiResponse::new(404, "").is_success());
    }
}
