//! JIRA ticketing step for Releasekit
//!
//! Updates tickets matching a JQL query with a configurable list of field
//! modifications and workflow transitions, and manages project versions.
//!
//! # Architecture
//!
//! - `client` - JIRA REST API client
//! - `fields` - field metadata model
//! - `update` - issue update request builder
//! - `modify` - declarative per-ticket modifications
//! - `notes` - release notes rendering
//! - `step` - step implementation
//!
//! # Example Usage
//!
//! ```no_run
//! use releasekit_step_jira::JiraUpdateStep;
//! use releasekit_step_api::{ReleaseStep, StepRegistry};
//!
//! let mut registry = StepRegistry::new();
//! registry.register(Box::new(JiraUpdateStep::new()));
//! ```

mod client;
mod config;
mod fields;
mod metadata;
mod modify;
mod notes;
mod step;
mod types;
mod update;

pub use client::JiraClient;
pub use fields::{
    find_field,
    FieldDescriptor,
    SUPPORTED_ELEMENT_TYPES,
};
pub use modify::TicketModification;
pub use notes::build_release_notes_html;
// Re-export the step struct
pub use step::JiraUpdateStep;
pub use types::{
    IssueFieldValues,
    IssueSummary,
    NamedEntity,
    VersionInfo,
};
pub use update::IssueUpdateBuilder;

// Register step with the registry
releasekit_step_api::register_step!(JiraUpdateStep);
