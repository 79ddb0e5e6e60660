// src/lib.rs

//! APCloudy client library.
//!
//! ```no_run
//! use apcloudy::{ApCloudyClient, services::RunOptions};
//!
//! # fn main() -> apcloudy::error::Result<()> {
//! let client = ApCloudyClient::new(Some("my-api-key"))?;
//! let jobs = client.get_project(42).jobs();
//! let job = jobs.run("quotes", RunOptions::default())?;
//! let finished = jobs.wait_for_completion(&job.job_id, None, None)?;
//! for item in jobs.iter_items(&finished.job_id, 500) {
//!     println!("{}", item?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod testing;

pub use client::ApCloudyClient;
pub use error::{AppError, Result};
pub use models::{Config, Job, JobState, Project, Spider};
