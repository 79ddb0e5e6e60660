//! Project data structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de;
use crate::error::Result;

/// An organizational container grouping spiders and jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(deserialize_with = "de::string_or_number")]
    pub project_id: String,

    /// Owning organization; the API names this field `organization_name`
    #[serde(rename = "organization_name")]
    pub org_name: String,

    pub name: String,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "de::lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,

    /// Server-computed snapshot
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub spider_count: u64,

    /// Server-computed snapshot
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub job_count: u64,
}

impl Project {
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Project::deserialize(value)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_value() {
        let project = Project::from_value(&json!({
            "project_id": 12,
            "organization_name": "acme",
            "name": "catalog",
            "created_at": "2023-11-05T08:00:00Z",
            "spider_count": 4,
            "job_count": 210,
        }))
        .unwrap();

        assert_eq!(project.project_id, "12");
        assert_eq!(project.org_name, "acme");
        assert_eq!(project.spider_count, 4);
        assert_eq!(project.job_count, 210);
        assert_eq!(project.description, "");
        assert!(project.created_at.is_some());
    }

    #[test]
    fn test_from_value_requires_org() {
        let result = Project::from_value(&json!({"project_id": "1", "name": "x"}));
        assert!(result.is_err());
    }
}
