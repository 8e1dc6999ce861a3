//! profmon-service: the simulated profile monitor pipeline
//!
//! Screens from the configuration are registered once as variables; then a
//! single ingestion loop receives model output from the data channel, turns
//! each row into a device image and publishes every image after each cycle.

mod config;
pub use config::{ServiceConfig, DEFAULT_MODEL_PORT, DEFAULT_PROFILE_PORT};

mod error;
pub use error::ServiceError;

mod registration;
pub use registration::{register_profiles, variable_spec};

mod command;
pub use command::{request_profiles, spawn_profile_request};

mod ingest;
pub use ingest::{apply_rows, parse_row, IngestState, Row, RowStats};

mod publish;
pub use publish::{publish_profiles, PublishReport};

mod service;
pub use service::{CycleReport, ProfMonService};

#[cfg(test)]
mod fixtures;
