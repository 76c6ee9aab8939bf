//! Core error types

use thiserror::Error;

/// Core error type for TacMesh
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration value out of range or inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(String),

    /// Global subscriber could not be installed
    #[error("Logging init error: {0}")]
    Logging(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
