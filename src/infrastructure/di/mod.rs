//! Dependency injection: the service container and its registries

mod service_container;
mod shared;
mod tags;

pub use service_container::{
    erase, Container, Entry, Factory, Instance, ServiceSlot, CONFIGURATION_KEY, TAG_REGISTRY_KEY,
};
pub(crate) use service_container::{invalid_setting, missing_setting};
pub use shared::SharedContainer;
pub use tags::TagRegistry;
