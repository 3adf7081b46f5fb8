//! Confluence page publishing step for Releasekit
//!
//! Publishes a page to a Confluence space, optionally generating the page
//! body as release notes from JIRA tickets.
//!
//! # Architecture
//!
//! - `client` - Confluence REST API client
//! - `step` - step implementation
//! - `config` - configuration parsing
//!
//! # Example Usage
//!
//! ```no_run
//! use releasekit_step_confluence::ConfluencePublishStep;
//! use releasekit_step_api::{ReleaseStep, StepRegistry};
//!
//! let mut registry = StepRegistry::new();
//! registry.register(Box::new(ConfluencePublishStep::new()));
//! ```

mod client;
mod config;
mod metadata;
mod step;
mod types;

// Re-export the step struct
pub use step::ConfluencePublishStep;

// Register step with the registry
releasekit_step_api::register_step!(ConfluencePublishStep);
