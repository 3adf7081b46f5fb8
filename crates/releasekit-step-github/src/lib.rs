//! GitHub release publishing step for Releasekit
//!
//! Creates a release for a tag, optionally generating the release body from
//! JIRA tickets, and attaches workspace artifacts matched by glob patterns.
//!
//! # Architecture
//!
//! - `client` - GitHub REST API client
//! - `artifacts` - workspace artifact collection
//! - `step` - step implementation
//! - `config` - configuration parsing
//!
//! # Example Usage
//!
//! ```no_run
//! use releasekit_step_github::GithubReleaseStep;
//! use releasekit_step_api::{ReleaseStep, StepRegistry};
//!
//! let mut registry = StepRegistry::new();
//! registry.register(Box::new(GithubReleaseStep::new()));
//! ```

mod artifacts;
mod client;
mod config;
mod metadata;
mod step;
mod types;

// Re-export the step struct
pub use step::GithubReleaseStep;

// Register step with the registry
releasekit_step_api::register_step!(GithubReleaseStep);
