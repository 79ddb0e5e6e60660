// src/services/spiders.rs

//! Spider operations for a project.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::{Value, json};

use crate::client::{ApCloudyClient, parse_list};
use crate::error::{AppError, Result};
use crate::models::Spider;
use crate::services::soft_failure;
use crate::services::transport::{FilePart, RequestBody};

/// Lists, uploads and removes the spiders of one project.
pub struct SpidersManager<'a> {
    client: &'a ApCloudyClient,
    project_id: u64,
}

impl<'a> SpidersManager<'a> {
    pub fn new(client: &'a ApCloudyClient, project_id: u64) -> Self {
        Self { client, project_id }
    }

    pub fn project_id(&self) -> u64 {
        self.project_id
    }

    fn project_query(&self) -> [(&'static str, String); 1] {
        [("project", self.project_id.to_string())]
    }

    pub fn list(&self) -> Result<Vec<Spider>> {
        let response = self
            .client
            .executor()
            .get(&["spiders", "list"], &self.project_query())?;
        parse_list(&response, "spiders", Spider::from_value)
    }

    pub fn get(&self, spider_name: &str) -> Result<Spider> {
        let response = self
            .client
            .executor()
            .get(&["spiders", spider_name], &self.project_query())
            .map_err(|e| e.or_not_found(|| AppError::SpiderNotFound(spider_name.to_string())))?;
        Spider::from_value(&response)
    }

    /// Upload a spider from a file on disk.
    ///
    /// The spider is named after the file unless `spider_name` is given.
    pub fn upload(&self, path: impl AsRef<Path>, spider_name: Option<&str>) -> Result<bool> {
        let path = path.as_ref();
        let name = match spider_name {
            Some(name) => name.to_string(),
            None => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    AppError::config(format!("cannot derive spider name from {path:?}"))
                })?,
        };
        let file = File::open(path)?;
        self.upload_from_reader(file, &name)
    }

    /// Upload spider code read from `reader`.
    pub fn upload_from_reader(&self, mut reader: impl Read, spider_name: &str) -> Result<bool> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;

        let body = RequestBody::Multipart {
            fields: vec![
                ("project".to_string(), self.project_id.to_string()),
                ("spider_name".to_string(), spider_name.to_string()),
            ],
            file: FilePart {
                field: "spider_file".to_string(),
                file_name: spider_name.to_string(),
                mime: "text/plain".to_string(),
                content,
            },
        };

        let response = self.client.executor().post(&["spiders", "upload"], body)?;
        let success = response
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if success {
            log::info!("Uploaded spider {} to project {}", spider_name, self.project_id);
        } else {
            log::warn!("Upload of spider {} was not accepted", spider_name);
        }
        Ok(success)
    }

    /// Delete a spider. `Ok(false)` when the API refused.
    pub fn delete(&self, spider_name: &str) -> Result<bool> {
        let body = RequestBody::Json(json!({ "project": self.project_id }));
        match self
            .client
            .executor()
            .delete(&["spiders", spider_name], body)
        {
            Ok(_) => Ok(true),
            Err(e) => soft_failure(
                e,
                || AppError::SpiderNotFound(spider_name.to_string()),
                "delete spider",
            ),
        }
    }
}
