//! Application layer: packages and what they declare
//!
//! This layer drives the container through the package primitives.

pub mod demo;
pub mod error;
pub mod package;

pub use error::{ApplicationError, ApplicationResult, PackageError, PackageResult};
pub use package::{Package, PackageBase};
