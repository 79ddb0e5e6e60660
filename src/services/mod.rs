//! Service layer for the APCloudy client.
//!
//! This module contains:
//! - Request execution with retry handling (`RequestExecutor`)
//! - The HTTP transport seam (`Transport`, `ReqwestTransport`)
//! - Resource managers (`JobsManager`, `SpidersManager`, `ProjectManager`)

pub mod executor;
mod jobs;
mod projects;
mod spiders;
pub mod transport;

pub use executor::{RequestExecutor, RetryPolicy};
pub use jobs::{ItemIter, JobFilter, JobsManager, RunOptions};
pub use projects::ProjectManager;
pub use spiders::SpidersManager;
pub use transport::{ReqwestTransport, Transport};

use crate::error::{AppError, Result};

/// Outcome policy for cancel/delete style calls.
///
/// A 404 becomes the resource's not-found error. Any other API refusal that
/// carries an HTTP status turns into `Ok(false)`. Authentication, rate-limit
/// and transport failures are returned unchanged.
pub(crate) fn soft_failure(
    err: AppError,
    not_found: impl FnOnce() -> AppError,
    action: &str,
) -> Result<bool> {
    match err.or_not_found(not_found) {
        AppError::Api {
            message,
            status: Some(status),
        } => {
            log::warn!("Failed to {}: HTTP {} {}", action, status, message);
            Ok(false)
        }
        other => Err(other),
    }
}
