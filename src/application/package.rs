//! Packages: reusable bundles of service, tag and configuration declarations
//!
//! A package binds to one container and declares entries into it. The
//! primitives live on [`PackageBase`]; concrete packages embed a base and
//! implement [`Package::declare`].
//!
//! Ordering matters for configuration: custom settings must already be in
//! the container when a package declares its defaults, and a service reading
//! its settings must be declared after them.

use std::any::{type_name, Any};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::application::{PackageError, PackageResult};
use crate::domain::{merge_recessive, Map, Value};
use crate::infrastructure::di::{
    erase, Container, Entry, Factory, SharedContainer, TagRegistry, CONFIGURATION_KEY,
    TAG_REGISTRY_KEY,
};
use crate::infrastructure::ContainerResult;

/// Declaration primitives shared by every package.
#[derive(Debug, Clone, Default)]
pub struct PackageBase {
    container: Option<SharedContainer>,
}

impl PackageBase {
    /// Create an unbound base; the container is adopted on `register`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a base bound at construction.
    pub fn with_container(container: &SharedContainer) -> Self {
        Self {
            container: Some(container.clone()),
        }
    }

    /// Adopt `container` unless one is already bound.
    ///
    /// Returns `true` if the container was adopted.
    pub fn bind(&mut self, container: &SharedContainer) -> bool {
        if self.container.is_some() {
            trace!("container already bound, keeping it");
            return false;
        }
        self.container = Some(container.clone());
        true
    }

    pub fn is_bound(&self) -> bool {
        self.container.is_some()
    }

    /// The bound container.
    pub fn container(&self) -> PackageResult<&SharedContainer> {
        self.container.as_ref().ok_or(PackageError::ContainerNotBound)
    }

    /// Declare a service. Replaces any entry of the same name.
    pub fn declare_service<T, F>(&self, name: impl Into<String>, factory: F) -> PackageResult<()>
    where
        T: Any,
        F: Fn(&Container) -> ContainerResult<T> + 'static,
    {
        self.declare_service_factory(name, erase(factory))
    }

    /// Declare a service from an already type-erased factory.
    pub fn declare_service_factory(
        &self,
        name: impl Into<String>,
        factory: Factory,
    ) -> PackageResult<()> {
        let name = name.into();
        debug!(service = %name, "declare service");
        self.container()?.borrow_mut().set_service(name, factory);
        Ok(())
    }

    /// Declare `alias` as a service resolving to whatever `target` resolves
    /// to at the time the alias is first resolved.
    pub fn declare_service_alias(
        &self,
        alias: impl Into<String>,
        target: impl Into<String>,
    ) -> PackageResult<()> {
        let target = target.into();
        let factory: Factory = Rc::new(move |container: &Container| container.resolve_any(&target));
        self.declare_service_factory(alias, factory)
    }

    /// Install an empty tag registry.
    ///
    /// An existing registry is replaced, dropping every tag in it. Check
    /// [`PackageBase::has_tag_support`] first unless that is intended.
    pub fn enable_tag_support(&self) -> PackageResult<()> {
        debug!("enable tag support");
        self.container()?
            .borrow_mut()
            .set(TAG_REGISTRY_KEY, Entry::Tags(TagRegistry::new()));
        Ok(())
    }

    #[deprecated(note = "tears down the whole tag registry; tags cannot be removed individually")]
    pub fn remove_tag_support(&self) -> PackageResult<()> {
        debug!("remove tag support");
        self.container()?.borrow_mut().remove(TAG_REGISTRY_KEY);
        Ok(())
    }

    /// Whether the container holds a tag registry.
    ///
    /// With `should_fail`, a missing registry is reported as
    /// [`PackageError::MissingTagSupport`] instead of `false`.
    pub fn has_tag_support(&self, should_fail: bool) -> PackageResult<bool> {
        let supported = self.container()?.borrow().tags().is_some();
        if !supported && should_fail {
            return Err(PackageError::MissingTagSupport);
        }
        Ok(supported)
    }

    /// Append `service` to `tag`.
    ///
    /// Does not check for support up front; without a registry there is
    /// nothing to append to and the call fails with `MissingTagSupport`.
    pub fn declare_tag(
        &self,
        tag: impl Into<String>,
        service: impl Into<String>,
    ) -> PackageResult<()> {
        let (tag, service) = (tag.into(), service.into());
        debug!(tag = %tag, service = %service, "declare tag");
        let mut container = self.container()?.borrow_mut();
        let tags = container
            .tags_mut()
            .ok_or(PackageError::MissingTagSupport)?;
        tags.push(tag, service);
        Ok(())
    }

    /// Tag a service and declare it, in that order.
    pub fn declare_tag_and_service<T, F>(
        &self,
        tag: impl Into<String>,
        service: impl Into<String>,
        factory: F,
    ) -> PackageResult<()>
    where
        T: Any,
        F: Fn(&Container) -> ContainerResult<T> + 'static,
    {
        self.has_tag_support(true)?;
        let service = service.into();
        self.declare_tag(tag, service.clone())?;
        self.declare_service(service, factory)
    }

    /// Install an empty configuration registry, replacing any existing one.
    pub fn enable_configuration_support(&self) -> PackageResult<()> {
        debug!("enable configuration support");
        self.container()?
            .borrow_mut()
            .set_parameter(CONFIGURATION_KEY, Value::map());
        Ok(())
    }

    #[deprecated(note = "tears down the whole configuration registry")]
    pub fn remove_configuration_support(&self) -> PackageResult<()> {
        debug!("remove configuration support");
        self.container()?.borrow_mut().remove(CONFIGURATION_KEY);
        Ok(())
    }

    /// Whether the container holds a configuration registry (a map under
    /// the reserved key).
    pub fn has_configuration_support(&self, should_fail: bool) -> PackageResult<bool> {
        let supported = self.container()?.borrow().configuration().is_some();
        if !supported && should_fail {
            return Err(PackageError::MissingConfigurationSupport);
        }
        Ok(supported)
    }

    /// Declare default settings for `service`.
    ///
    /// Settings already in the registry win over `defaults`, recursively
    /// through nested maps. Without a configuration registry this is a
    /// no-op and not an error.
    pub fn declare_configuration(
        &self,
        service: impl Into<String>,
        defaults: Map,
    ) -> PackageResult<()> {
        let service = service.into();
        let mut container = self.container()?.borrow_mut();
        let Some(configuration) = container.configuration_mut() else {
            debug!(service = %service, "no configuration support, defaults ignored");
            return Ok(());
        };

        // Non-map settings carry nothing to merge with.
        let existing = match configuration.remove(&service) {
            Some(Value::Map(existing)) => existing,
            _ => Map::new(),
        };
        debug!(service = %service, "declare configuration");
        configuration.insert(service, Value::Map(merge_recessive(defaults, existing)));
        Ok(())
    }

    /// Current settings of `service`, copied, or an empty map.
    ///
    /// Factories that capture this snapshot see the settings as they were
    /// when the package registered.
    pub fn configuration_snapshot(&self, service: &str) -> PackageResult<Value> {
        let container = self.container()?.borrow();
        Ok(container
            .configuration_for(service)
            .cloned()
            .unwrap_or_else(Value::map))
    }
}

/// A bundle of declarations registered against a container.
pub trait Package {
    fn base(&self) -> &PackageBase;

    fn base_mut(&mut self) -> &mut PackageBase;

    /// Declare services, tags and configuration. Runs once the base is bound.
    fn declare(&mut self) -> PackageResult<()>;

    /// Bind `container` (unless already bound) and run [`Package::declare`].
    ///
    /// Calling this again declares everything again; tags are appended a
    /// second time.
    fn register(&mut self, container: &SharedContainer) -> PackageResult<()> {
        self.base_mut().bind(container);
        self.declare()
    }
}

impl SharedContainer {
    /// Register `package` against this container.
    pub fn register<P: Package + ?Sized>(&self, package: &mut P) -> PackageResult<()> {
        debug!(package = type_name::<P>(), "register package");
        package.register(self)
    }
}
