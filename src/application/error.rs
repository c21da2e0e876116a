//! Application-level errors (wraps container errors)

use thiserror::Error;

use crate::infrastructure::ContainerError;

/// Errors raised by package registration.
///
/// All of them are programmer or setup errors: a missing registry or an
/// unbound package. Nothing here is transient, so nothing is retried.
#[derive(Error, Debug)]
pub enum PackageError {
    #[error("container does not have tag support")]
    MissingTagSupport,

    #[error("container does not have configuration support")]
    MissingConfigurationSupport,

    #[error("package is not bound to a container")]
    ContainerNotBound,

    #[error("{0}")]
    Container(#[from] ContainerError),
}

/// Result type for package operations.
pub type PackageResult<T> = Result<T, PackageError>;

/// Application errors wrap package errors and add configuration loading.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Package(#[from] PackageError),

    #[error("{0}")]
    Container(#[from] ContainerError),

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
