//! InfluxDB publishing step for Releasekit
//!
//! Parses build metrics written in the InfluxDB line-protocol format and
//! publishes them to an InfluxDB server over its HTTP API.
//!
//! # Architecture
//!
//! - `parser` - line-protocol parser and encoder
//! - `client` - InfluxDB HTTP API client
//! - `step` - step implementation
//! - `config` - configuration parsing
//!
//! # Example Usage
//!
//! ```no_run
//! use releasekit_step_influxdb::InfluxPublishStep;
//! use releasekit_step_api::{ReleaseStep, StepRegistry};
//!
//! let mut registry = StepRegistry::new();
//! registry.register(Box::new(InfluxPublishStep::new()));
//! ```

mod client;
mod config;
mod metadata;
pub mod parser;
mod step;

pub use parser::{
    parse,
    ContentRecord,
    FieldValue,
};
// Re-export the step struct
pub use step::InfluxPublishStep;

// Register step with the registry
releasekit_step_api::register_step!(InfluxPublishStep);
