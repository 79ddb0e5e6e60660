//! Spider data structure.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::de;
use crate::error::Result;

/// A named, versioned scraping program registered under a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spider {
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "de::string_or_number")]
    pub project_id: String,

    /// Spider settings; keys are unique
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub settings: Map<String, Value>,

    /// Tags in server order; duplicates are kept
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub tags: Vec<String>,
}

fn default_version() -> String {
    "1.0.0".into()
}

impl Spider {
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Spider::deserialize(value)?)
    }
}
