// src/client.rs

//! Top-level APCloudy client.

use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::models::{Config, Project};
use crate::services::ProjectManager;
use crate::services::executor::RequestExecutor;
use crate::services::transport::{ReqwestTransport, RequestBody, Transport};
use crate::utils::clock::{Clock, SystemClock};

/// Entry point to the API.
///
/// Owns the configuration and the request executor; managers returned by
/// [`get_project`](Self::get_project) borrow it.
pub struct ApCloudyClient {
    config: Config,
    executor: RequestExecutor,
}

impl ApCloudyClient {
    /// Create a client from environment configuration.
    ///
    /// `api_key` overrides `APCLOUDY_API_KEY` when given.
    pub fn new(api_key: Option<&str>) -> Result<Self> {
        let mut config = Config::from_env()?;
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            config.api_key = key.to_string();
        }
        Self::with_config(config)
    }

    /// Create a client with an explicit configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Self::with_parts(config, Box::new(transport), Box::new(SystemClock))
    }

    /// Create a client with a custom transport and clock.
    pub fn with_parts(
        config: Config,
        transport: Box<dyn Transport>,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        let executor = RequestExecutor::new(&config, transport, clock)?;
        log::debug!("APCloudy client ready for {}", config.base_url);
        Ok(Self { config, executor })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Manager for a single project.
    pub fn get_project(&self, project_id: u64) -> ProjectManager<'_> {
        ProjectManager::new(self, project_id)
    }

    /// List all projects visible to the API key.
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let response = self.executor.get(&["projects", "list"], &[])?;
        parse_list(&response, "projects", Project::from_value)
    }

    pub fn create_project(&self, name: &str, description: &str) -> Result<Project> {
        let body = json!({ "name": name, "description": description });
        let response = self
            .executor
            .post(&["projects", "create"], RequestBody::Json(body))?;
        let project = Project::from_value(&response)?;
        log::info!("Created project {} ({})", project.name, project.project_id);
        Ok(project)
    }

    /// Check connectivity and credentials. Never fails.
    pub fn verify(&self) -> bool {
        match self.executor.get(&["verify"], &[]) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("API verification failed: {}", e);
                false
            }
        }
    }
}

/// Parse `response[key]` as an array of records.
pub(crate) fn parse_list<T>(
    response: &Value,
    key: &str,
    parse: impl Fn(&Value) -> Result<T>,
) -> Result<Vec<T>> {
    response
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::response(format!("missing '{key}' array")))?
        .iter()
        .map(parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use super::*;
    use crate::services::transport::ApiResponse;
    use crate::testing::{ManualClock, MockTransport, mock_client, test_config};

    fn project_json(id: u64) -> Value {
        json!({
            "project_id": id,
            "organization_name": "acme",
            "name": format!("project-{id}"),
        })
    }

    #[test]
    fn test_with_config_requires_api_key() {
        let err = ApCloudyClient::with_config(Config::default()).err().unwrap();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_list_projects() {
        let transport = MockTransport::scripted(vec![MockTransport::ok(json!({
            "projects": [project_json(1), project_json(2)]
        }))]);
        let clock = ManualClock::new();
        let client = mock_client(test_config(), &transport, &clock);

        let projects = client.list_projects().unwrap();

        assert_eq!(projects.len(), 2);
        assert_eq!(projects[1].project_id, "2");
        assert_eq!(
            transport.last_request().url.as_str(),
            "https://api.test/v1/projects/list"
        );
    }

    #[test]
    fn test_list_projects_missing_key() {
        let transport = MockTransport::scripted(vec![MockTransport::ok(json!({"items": []}))]);
        let clock = ManualClock::new();
        let client = mock_client(test_config(), &transport, &clock);

        assert!(matches!(client.list_projects(), Err(AppError::Response(_))));
    }

    #[test]
    fn test_create_project() {
        let transport = MockTransport::scripted(vec![MockTransport::ok(project_json(9))]);
        let clock = ManualClock::new();
        let client = mock_client(test_config(), &transport, &clock);

        let project = client.create_project("catalog", "books").unwrap();

        assert_eq!(project.project_id, "9");
        let request = transport.last_request();
        assert_eq!(request.method, Method::POST);
        assert!(request.url.as_str().ends_with("/projects/create"));
        match request.body {
            RequestBody::Json(body) => {
                assert_eq!(body, json!({"name": "catalog", "description": "books"}))
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_verify() {
        let clock = ManualClock::new();

        let transport = MockTransport::scripted(vec![MockTransport::ok(json!({"status": "ok"}))]);
        assert!(mock_client(test_config(), &transport, &clock).verify());

        let transport = MockTransport::with_handler(|_| Ok(ApiResponse::new(401, "")));
        assert!(!mock_client(test_config(), &transport, &clock).verify());
    }
}
