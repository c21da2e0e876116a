//! Container-level errors

use thiserror::Error;

/// Errors raised while resolving entries from the container.
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("service not found: {0}")]
    ServiceNotFound(String),

    #[error("service '{name}' is not of type {expected}")]
    TypeMismatch { name: String, expected: &'static str },

    #[error("circular dependency: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    #[error("missing setting '{key}' for service '{service}'")]
    MissingSetting { service: String, key: String },

    #[error("setting '{key}' for service '{service}' must be {expected}, got {found}")]
    InvalidSetting {
        service: String,
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Result type for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;
