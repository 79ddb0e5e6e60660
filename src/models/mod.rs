// src/models/mod.rs

//! Domain models for the APCloudy client.
//!
//! Records are read-only snapshots built from server payloads with
//! `from_value`. Parsing never has side effects; see [`crate::display`] for
//! rendering.

mod config;
mod de;
mod job;
mod project;
mod spider;

// Re-export all public types
pub use config::Config;
pub use job::{Job, JobState};
pub use project::Project;
pub use spider::Spider;
