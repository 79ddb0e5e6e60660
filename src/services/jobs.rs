// src/services/jobs.rs

//! Job operations for a project.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use serde_json::{Map, Value, json};

use crate::client::{ApCloudyClient, parse_list};
use crate::error::{AppError, Result};
use crate::models::{Job, JobState};
use crate::services::soft_failure;
use crate::services::transport::RequestBody;

/// Optional settings for [`JobsManager::run`]. Unset fields use config defaults.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub units: Option<u32>,
    pub job_args: Map<String, Value>,
    pub priority: Option<i32>,
    pub tags: Vec<String>,
}

/// Filters for [`JobsManager::list`].
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub state: Option<JobState>,
    pub spider: Option<String>,
    /// Page size, clamped to `[1, max_page_size]`
    pub count: Option<u32>,
    pub offset: Option<u64>,
    pub tags: Vec<String>,
}

/// Runs, inspects and manages jobs of one project.
pub struct JobsManager<'a> {
    client: &'a ApCloudyClient,
    project_id: u64,
    last_job_id: RefCell<Option<String>>,
}

impl<'a> JobsManager<'a> {
    pub fn new(client: &'a ApCloudyClient, project_id: u64) -> Self {
        Self {
            client,
            project_id,
            last_job_id: RefCell::new(None),
        }
    }

    pub fn project_id(&self) -> u64 {
        self.project_id
    }

    /// Id of the most recent job parsed by this manager.
    ///
    /// [`run`](Self::run) sends it along as `job_id`.
    pub fn last_job_id(&self) -> Option<String> {
        self.last_job_id.borrow().clone()
    }

    fn observe(&self, job: Job) -> Job {
        *self.last_job_id.borrow_mut() = Some(job.job_id.clone());
        job
    }

    /// Start a spider.
    pub fn run(&self, spider_name: &str, options: RunOptions) -> Result<Job> {
        let config = self.client.config();
        let body = json!({
            "job_id": self.last_job_id(),
            "spider": spider_name,
            "project": self.project_id,
            "units": options.units.filter(|&u| u > 0).unwrap_or(config.default_units),
            "job_args": options.job_args,
            "priority": options.priority.filter(|&p| p != 0).unwrap_or(config.default_priority),
            "tags": options.tags,
        });

        let response = self
            .client
            .executor()
            .post(&["job", "run"], RequestBody::Json(body))?;
        let payload = response
            .get("job")
            .ok_or_else(|| AppError::response("missing 'job' in run response"))?;
        let job = Job::from_value_or_first(payload)?;
        log::info!("Started job {} for spider {}", job.job_id, spider_name);
        Ok(self.observe(job))
    }

    /// Fetch the current state of a job.
    pub fn get(&self, job_id: &str) -> Result<Job> {
        let response = self
            .client
            .executor()
            .get(&["jobs", job_id], &[])
            .map_err(|e| e.or_not_found(|| AppError::JobNotFound(job_id.to_string())))?;
        Ok(self.observe(Job::from_value(&response)?))
    }

    pub fn list(&self, filter: &JobFilter) -> Result<Vec<Job>> {
        let config = self.client.config();
        let mut query = vec![
            ("project", self.project_id.to_string()),
            ("count", config.page_size(filter.count).to_string()),
            ("offset", filter.offset.unwrap_or(0).to_string()),
        ];
        if let Some(state) = filter.state {
            query.push(("state", state.as_str().to_string()));
        }
        if let Some(spider) = filter.spider.as_deref().filter(|s| !s.is_empty()) {
            query.push(("spider", spider.to_string()));
        }
        if !filter.tags.is_empty() {
            query.push(("tags", filter.tags.join(",")));
        }

        let response = self.client.executor().get(&["jobs", "list"], &query)?;
        let jobs = parse_list(&response, "jobs", Job::from_value)?;
        if let Some(last) = jobs.last() {
            *self.last_job_id.borrow_mut() = Some(last.job_id.clone());
        }
        Ok(jobs)
    }

    /// Cancel a job. `Ok(false)` when the API refused.
    pub fn cancel(&self, job_id: &str) -> Result<bool> {
        match self
            .client
            .executor()
            .post(&["jobs", job_id, "cancel"], RequestBody::Empty)
        {
            Ok(_) => Ok(true),
            Err(e) => soft_failure(e, || AppError::JobNotFound(job_id.to_string()), "cancel job"),
        }
    }

    /// Delete a job and its data. `Ok(false)` when the API refused.
    pub fn delete(&self, job_id: &str) -> Result<bool> {
        match self
            .client
            .executor()
            .delete(&["jobs", job_id], RequestBody::Empty)
        {
            Ok(_) => Ok(true),
            Err(e) => soft_failure(e, || AppError::JobNotFound(job_id.to_string()), "delete job"),
        }
    }

    pub fn get_logs(&self, job_id: &str, offset: u64, count: u32) -> Result<Vec<String>> {
        let response = self.paged(job_id, "logs", offset, count)?;
        match response.get("logs") {
            Some(logs) => Ok(serde_json::from_value(logs.clone())?),
            None => Ok(Vec::new()),
        }
    }

    /// One page of scraped items.
    pub fn get_items(&self, job_id: &str, offset: u64, count: u32) -> Result<Vec<Value>> {
        let response = self.paged(job_id, "items", offset, count)?;
        match response.get("items") {
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(AppError::response(format!(
                "'items' is not an array: {other}"
            ))),
        }
    }

    fn paged(&self, job_id: &str, resource: &str, offset: u64, count: u32) -> Result<Value> {
        let query = [("offset", offset.to_string()), ("count", count.to_string())];
        self.client
            .executor()
            .get(&["jobs", job_id, resource], &query)
            .map_err(|e| e.or_not_found(|| AppError::JobNotFound(job_id.to_string())))
    }

    /// Iterate over every item of a job, fetching `batch_size` items per request.
    ///
    /// Each call starts again from offset 0.
    pub fn iter_items(&self, job_id: &str, batch_size: u32) -> ItemIter<'_, 'a> {
        ItemIter {
            jobs: self,
            job_id: job_id.to_string(),
            batch_size: batch_size.max(1),
            offset: 0,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    /// Poll until the job finishes.
    ///
    /// `poll_interval` and `timeout` fall back to the config defaults when
    /// absent or zero. With no timeout at all the wait is unbounded.
    pub fn wait_for_completion(
        &self,
        job_id: &str,
        poll_interval: Option<Duration>,
        timeout: Option<Duration>,
    ) -> Result<Job> {
        let config = self.client.config();
        let poll_interval = poll_interval
            .filter(|d| !d.is_zero())
            .unwrap_or_else(|| config.poll_interval());
        let timeout = timeout
            .filter(|d| !d.is_zero())
            .or_else(|| config.job_timeout());
        let clock = self.client.executor().clock();
        let started = clock.now();

        loop {
            let job = self.get(job_id)?;
            if job.is_finished() {
                log::info!("Job {} finished in state {}", job_id, job.state);
                return Ok(job);
            }

            if let Some(limit) = timeout {
                if clock.now().duration_since(started) > limit {
                    return Err(AppError::Timeout {
                        job_id: job_id.to_string(),
                        timeout: limit,
                    });
                }
            }

            log::debug!(
                "Job {} is {}; checking again in {:?}",
                job_id,
                job.state,
                poll_interval
            );
            clock.sleep(poll_interval);
        }
    }
}

/// Lazy iterator over a job's items. Stops after the first error.
pub struct ItemIter<'m, 'a> {
    jobs: &'m JobsManager<'a>,
    job_id: String,
    batch_size: u32,
    offset: u64,
    buffer: VecDeque<Value>,
    done: bool,
}

impl Iterator for ItemIter<'_, '_> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }

            match self
                .jobs
                .get_items(&self.job_id, self.offset, self.batch_size)
            {
                Ok(items) => {
                    // A short page is the last one
                    if items.len() < self.batch_size as usize {
                        self.done = true;
                    }
                    self.offset += items.len() as u64;
                    self.buffer.extend(items);
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
