//! Job record and lifecycle state.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::de;
use crate::error::{AppError, Result};

/// Job execution states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Scheduled,
    Running,
    Completed,
    Deleted,
}

impl JobState {
    /// Wire representation used in payloads and query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Scheduled => "scheduled",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Deleted => "deleted",
        }
    }

    /// Whether no further transitions are expected.
    pub fn is_terminal(&self) -> bool {
        match self {
            JobState::Completed | JobState::Deleted => true,
            JobState::Scheduled | JobState::Running => false,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobState {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(JobState::Scheduled),
            "running" => Ok(JobState::Running),
            "completed" => Ok(JobState::Completed),
            "deleted" => Ok(JobState::Deleted),
            other => Err(AppError::response(format!("unknown job state '{other}'"))),
        }
    }
}

/// One execution of a spider on the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(deserialize_with = "de::string_or_number")]
    pub job_id: String,

    pub spider_name: String,

    /// Current state; the API names this field `status`
    #[serde(rename = "status", alias = "state")]
    pub state: JobState,

    #[serde(default, deserialize_with = "de::string_or_number")]
    pub project_id: String,

    #[serde(default, deserialize_with = "de::lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "de::lenient_datetime")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "de::lenient_datetime")]
    pub finished_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub items_scraped: u64,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub requests_made: u64,

    /// Arguments passed to the spider
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub job_args: Map<String, Value>,

    /// Parallel execution slots allocated to the job
    #[serde(default = "default_units", deserialize_with = "units_or_default")]
    pub units: u32,

    #[serde(default)]
    pub logs_url: Option<String>,

    #[serde(default)]
    pub items_url: Option<String>,
}

fn default_units() -> u32 {
    1
}

fn units_or_default<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_else(default_units))
}

impl Job {
    /// Build a job from a single job object.
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Job::deserialize(value)?)
    }

    /// Build a job from a payload that may be an object or a list of objects.
    ///
    /// Older API versions answer `job/run` with a one-element list.
    pub fn from_value_or_first(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => items
                .first()
                .ok_or_else(|| AppError::response("empty job list"))
                .and_then(Job::from_value),
            other => Job::from_value(other),
        }
    }

    /// True once the job reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// Run time in seconds, when both start and finish are known.
    pub fn duration(&self) -> Option<f64> {
        let (started, finished) = (self.started_at?, self.finished_at?);
        let delta = finished - started;
        Some(
            delta
                .num_microseconds()
                .map(|us| us as f64 / 1_000_000.0)
                .unwrap_or_else(|| delta.num_milliseconds() as f64 / 1000.0),
        )
    }
}
