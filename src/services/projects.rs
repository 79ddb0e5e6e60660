//! Project-scoped operations.

use crate::client::ApCloudyClient;
use crate::error::{AppError, Result};
use crate::models::Project;
use crate::services::{JobsManager, SpidersManager};

/// Handle on one project: its info plus job and spider managers.
pub struct ProjectManager<'a> {
    client: &'a ApCloudyClient,
    project_id: u64,
}

impl<'a> ProjectManager<'a> {
    pub fn new(client: &'a ApCloudyClient, project_id: u64) -> Self {
        Self { client, project_id }
    }

    pub fn project_id(&self) -> u64 {
        self.project_id
    }

    pub fn jobs(&self) -> JobsManager<'a> {
        JobsManager::new(self.client, self.project_id)
    }

    pub fn spiders(&self) -> SpidersManager<'a> {
        SpidersManager::new(self.client, self.project_id)
    }

    pub fn get_info(&self) -> Result<Project> {
        let id = self.project_id.to_string();
        let response = self
            .client
            .executor()
            .get(&["project", id.as_str()], &[])
            .map_err(|e| e.or_not_found(|| AppError::ProjectNotFound(self.project_id.to_string())))?;
        Project::from_value(&response)
    }
}
