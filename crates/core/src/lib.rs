//! Core functionality for the TacMesh telemetry dashboard.
//!
//! This crate provides the configuration model, logging initialization and
//! shared helpers used across the TacMesh workspace.

pub mod config;
pub mod error;
pub mod logging;
pub mod time;

pub use config::{
    Config, DashboardConfig, LogFormat, LoggingConfig, MeshConfig, NodeSeed, SimulationConfig,
    LinkSeed, TopologySeed,
};
pub use error::{CoreError, Result};
pub use time::current_timestamp_ms;
