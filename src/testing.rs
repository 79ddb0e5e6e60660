//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::client::ApCloudyClient;
use crate::models::Config;
use crate::services::transport::{ApiRequest, ApiResponse, Transport, TransportError};
use crate::utils::clock::Clock;

type Reply = Result<ApiResponse, TransportError>;
type Handler = dyn Fn(&ApiRequest) -> Reply + Send + Sync;

/// Configuration accepted by `validate`, pointing at a fake host.
pub fn test_config() -> Config {
    Config {
        api_key: "test-key".into(),
        base_url: "https://api.test/v1".into(),
        ..Config::default()
    }
}

/// Transport that answers from a script or a handler and records requests.
#[derive(Clone)]
pub struct MockTransport {
    script: Arc<Mutex<VecDeque<Reply>>>,
    handler: Option<Arc<Handler>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    /// Reply with each entry in order; panics when the script runs out.
    pub fn scripted(replies: Vec<Reply>) -> Self {
        Self {
            script: Arc::new(Mutex::new(replies.into())),
            handler: None,
            requests: Arc::default(),
        }
    }

    /// Reply by calling `handler` for every request.
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&ApiRequest) -> Reply + Send + Sync + 'static,
    {
        Self {
            script: Arc::default(),
            handler: Some(Arc::new(handler)),
            requests: Arc::default(),
        }
    }

    /// Reply with a JSON value and status 200.
    pub fn ok(body: serde_json::Value) -> Reply {
        Ok(ApiResponse::new(200, body.to_string()))
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no requests recorded")
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &ApiRequest) -> Reply {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(handler) = &self.handler {
            return handler(request);
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request: {} {}", request.method, request.url))
    }
}

/// Virtual clock: `sleep` advances `now` and is recorded instead of blocking.
#[derive(Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Arc<Mutex<Duration>>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Arc::default(),
            sleeps: Arc::default(),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.elapsed.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        *self.elapsed.lock().unwrap() += duration;
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Client wired to a mock transport and a manual clock.
pub fn mock_client(config: Config, transport: &MockTransport, clock: &ManualClock) -> ApCloudyClient {
    ApCloudyClient::with_parts(config, Box::new(transport.clone()), Box::new(clock.clone()))
        .expect("test config is valid")
}
