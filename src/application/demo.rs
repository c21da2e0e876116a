//! Demonstration packages
//!
//! `SupportPackage` prepares a container for packages that need tags and
//! configuration. `GreeterPackage` shows the usual flow: declare default
//! settings, snapshot them, declare and tag the services that use them.

use tracing::{debug, instrument};

use crate::application::package::{Package, PackageBase};
use crate::application::PackageResult;
use crate::domain::{settings, Value};
use crate::infrastructure::di::{invalid_setting, missing_setting, Container, SharedContainer};
use crate::infrastructure::ContainerResult;

pub const GREETER: &str = "greeter";
pub const LOUD_GREETER: &str = "greeter.loud";
pub const DEFAULT_GREETER: &str = "greeter.default";
pub const TAG_GREETER: &str = "tag.greeter";

/// Builds greetings from its configured greeting and excitement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeter {
    greeting: String,
    excitement: usize,
}

impl Greeter {
    pub fn new(greeting: impl Into<String>, excitement: usize) -> Self {
        Self {
            greeting: greeting.into(),
            excitement,
        }
    }

    /// Build from a settings map. Negative excitement counts as none.
    pub fn from_settings(service: &str, settings: &Value) -> ContainerResult<Self> {
        let required = |key: &'static str| {
            settings
                .get(key)
                .ok_or_else(|| missing_setting(service, key))
        };
        let greeting = required("greeting")?;
        let greeting = greeting
            .as_str()
            .ok_or_else(|| invalid_setting(service, "greeting", "string", greeting))?;
        let excitement = required("excitement")?;
        let excitement = excitement
            .as_i64()
            .ok_or_else(|| invalid_setting(service, "excitement", "integer", excitement))?;
        Ok(Self::new(greeting, usize::try_from(excitement).unwrap_or(0)))
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn excitement(&self) -> usize {
        self.excitement
    }

    pub fn greet(&self, name: &str) -> String {
        format!("{}, {}{}", self.greeting, name, "!".repeat(self.excitement))
    }
}

/// Enables tag and configuration support where it is missing.
#[derive(Debug, Default)]
pub struct SupportPackage {
    base: PackageBase,
}

impl SupportPackage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Package for SupportPackage {
    fn base(&self) -> &PackageBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PackageBase {
        &mut self.base
    }

    fn declare(&mut self) -> PackageResult<()> {
        if !self.base.has_tag_support(false)? {
            self.base.enable_tag_support()?;
        }
        if !self.base.has_configuration_support(false)? {
            self.base.enable_configuration_support()?;
        }
        Ok(())
    }
}

/// Declares the greeter services.
///
/// Needs configuration and tag support: without configuration support the
/// greeters fail to build, without tag support registration fails.
#[derive(Debug, Default)]
pub struct GreeterPackage {
    base: PackageBase,
}

impl GreeterPackage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to `container` right away instead of on `register`.
    pub fn with_container(container: &SharedContainer) -> Self {
        Self {
            base: PackageBase::with_container(container),
        }
    }
}

impl Package for GreeterPackage {
    fn base(&self) -> &PackageBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PackageBase {
        &mut self.base
    }

    fn declare(&mut self) -> PackageResult<()> {
        let base = &self.base;

        base.declare_configuration(
            GREETER,
            settings([("greeting", Value::from("Hello")), ("excitement", Value::from(1))]),
        )?;
        // Captured by value: later changes to the registry do not reach it.
        let snapshot = base.configuration_snapshot(GREETER)?;
        base.declare_service(GREETER, move |_| Greeter::from_settings(GREETER, &snapshot))?;
        base.declare_tag(TAG_GREETER, GREETER)?;

        base.declare_configuration(LOUD_GREETER, settings([("excitement", 3)]))?;
        base.declare_tag_and_service(TAG_GREETER, LOUD_GREETER, |container: &Container| {
            let greeting = container.setting_str(GREETER, "greeting")?.to_uppercase();
            let excitement = container.setting_i64(LOUD_GREETER, "excitement")?;
            Ok(Greeter::new(greeting, usize::try_from(excitement).unwrap_or(0)))
        })?;

        base.declare_service_alias(DEFAULT_GREETER, GREETER)?;
        debug!("greeter package declared");
        Ok(())
    }
}

/// Register the demo packages against `container`.
#[instrument(skip_all)]
pub fn bootstrap(container: Container) -> PackageResult<SharedContainer> {
    let shared = SharedContainer::from(container);
    shared.register(&mut SupportPackage::new())?;
    shared.register(&mut GreeterPackage::new())?;
    Ok(shared)
}
