//! Domain layer: configuration values and the merge rules applied to them
//!
//! This layer is independent of external concerns (no I/O, no container).

pub mod value;

pub use value::{merge_recessive, settings, Map, Value};
