//! Infrastructure layer: the container packages register against
//!
//! Stands in for the external service locator. It offers get / set / delete
//! by key and lazy factory invocation, and nothing more.

pub mod di;
pub mod error;

pub use di::{Container, SharedContainer, TagRegistry};
pub use error::{ContainerError, ContainerResult};
