//! Service container
//!
//! A small key/value service locator. Each key holds a plain parameter, the
//! tag registry, or a lazily invoked service factory. Factories receive the
//! container when they run, so one service can read another service or the
//! configuration registry while it is being built.

use std::any::{type_name, Any};
use std::cell::{OnceCell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::domain::{Map, Value};
use crate::infrastructure::di::TagRegistry;
use crate::infrastructure::{ContainerError, ContainerResult};

/// Reserved key holding the tag registry.
pub const TAG_REGISTRY_KEY: &str = "tag";

/// Reserved key holding the configuration registry.
pub const CONFIGURATION_KEY: &str = "configuration";

/// A resolved service instance.
pub type Instance = Rc<dyn Any>;

/// Type-erased service factory.
pub type Factory = Rc<dyn Fn(&Container) -> ContainerResult<Instance>>;

/// Wrap a typed factory into a [`Factory`].
pub fn erase<T, F>(factory: F) -> Factory
where
    T: Any,
    F: Fn(&Container) -> ContainerResult<T> + 'static,
{
    Rc::new(move |container: &Container| {
        factory(container).map(|instance| Rc::new(instance) as Instance)
    })
}

/// A declared service: its factory plus the instance, once built.
pub struct ServiceSlot {
    factory: Factory,
    instance: OnceCell<Instance>,
}

impl ServiceSlot {
    pub fn new(factory: Factory) -> Self {
        Self {
            factory,
            instance: OnceCell::new(),
        }
    }

    /// Whether the factory has already run.
    pub fn is_resolved(&self) -> bool {
        self.instance.get().is_some()
    }
}

/// Value stored under a container key.
pub enum Entry {
    Parameter(Value),
    Tags(TagRegistry),
    Service(ServiceSlot),
}

impl Entry {
    pub fn kind(&self) -> &'static str {
        match self {
            Entry::Parameter(_) => "parameter",
            Entry::Tags(_) => "tags",
            Entry::Service(_) => "service",
        }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Parameter(value) => f.debug_tuple("Parameter").field(value).finish(),
            Entry::Tags(tags) => f.debug_tuple("Tags").field(tags).finish(),
            Entry::Service(slot) => f
                .debug_struct("Service")
                .field("resolved", &slot.is_resolved())
                .finish(),
        }
    }
}

/// Key/value service locator.
#[derive(Default)]
pub struct Container {
    entries: BTreeMap<String, Entry>,
    /// Services currently being built, innermost last.
    resolving: RefCell<Vec<String>>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container seeded with parameters, e.g. custom configuration
    /// that must be in place before any package registers its defaults.
    pub fn with_parameters<I, K, V>(parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut container = Self::new();
        for (name, value) in parameters {
            container.set_parameter(name, value);
        }
        container
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.entries.get_mut(name)
    }

    /// Store `entry` under `name`, returning whatever it replaced.
    pub fn set(&mut self, name: impl Into<String>, entry: Entry) -> Option<Entry> {
        let name = name.into();
        trace!(key = %name, kind = entry.kind(), "set entry");
        self.entries.insert(name, entry)
    }

    pub fn remove(&mut self, name: &str) -> Option<Entry> {
        trace!(key = name, "remove entry");
        self.entries.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.set(name, Entry::Parameter(value.into()));
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        match self.entries.get(name) {
            Some(Entry::Parameter(value)) => Some(value),
            _ => None,
        }
    }

    pub fn set_service(&mut self, name: impl Into<String>, factory: Factory) {
        self.set(name, Entry::Service(ServiceSlot::new(factory)));
    }

    /// Typed form of [`Container::set_service`].
    pub fn set_factory<T, F>(&mut self, name: impl Into<String>, factory: F)
    where
        T: Any,
        F: Fn(&Container) -> ContainerResult<T> + 'static,
    {
        self.set_service(name, erase(factory));
    }

    /// Resolve `name` without knowing its type.
    ///
    /// Services run their factory on first resolution and hand out the
    /// cached instance afterwards. Parameters and the tag registry resolve
    /// to a fresh copy of their current value.
    pub fn resolve_any(&self, name: &str) -> ContainerResult<Instance> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| ContainerError::ServiceNotFound(name.to_string()))?;

        let slot = match entry {
            Entry::Parameter(value) => return Ok(Rc::new(value.clone())),
            Entry::Tags(tags) => return Ok(Rc::new(tags.clone())),
            Entry::Service(slot) => slot,
        };

        if let Some(instance) = slot.instance.get() {
            return Ok(Rc::clone(instance));
        }

        self.enter(name)?;
        let factory = Rc::clone(&slot.factory);
        let built = factory(self);
        self.resolving.borrow_mut().pop();

        let instance = built?;
        debug!(service = name, "built service");
        Ok(Rc::clone(slot.instance.get_or_init(|| instance)))
    }

    /// Resolve `name` as a `T`.
    pub fn resolve<T: Any>(&self, name: &str) -> ContainerResult<Rc<T>> {
        self.resolve_any(name)?
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Resolve every service carrying `tag`, in tagging order.
    ///
    /// A missing tag registry or an unknown tag yields no services.
    pub fn resolve_tagged<T: Any>(&self, tag: &str) -> ContainerResult<Vec<Rc<T>>> {
        let Some(tags) = self.tags() else {
            return Ok(Vec::new());
        };
        tags.services(tag)
            .iter()
            .map(|service| self.resolve::<T>(service))
            .collect()
    }

    /// The tag registry, if tag support is present.
    pub fn tags(&self) -> Option<&TagRegistry> {
        match self.entries.get(TAG_REGISTRY_KEY) {
            Some(Entry::Tags(tags)) => Some(tags),
            _ => None,
        }
    }

    pub fn tags_mut(&mut self) -> Option<&mut TagRegistry> {
        match self.entries.get_mut(TAG_REGISTRY_KEY) {
            Some(Entry::Tags(tags)) => Some(tags),
            _ => None,
        }
    }

    /// The configuration registry, if configuration support is present.
    pub fn configuration(&self) -> Option<&Map> {
        self.parameter(CONFIGURATION_KEY).and_then(Value::as_map)
    }

    pub fn configuration_mut(&mut self) -> Option<&mut Map> {
        match self.entries.get_mut(CONFIGURATION_KEY) {
            Some(Entry::Parameter(value)) => value.as_map_mut(),
            _ => None,
        }
    }

    /// Settings stored for `service`.
    pub fn configuration_for(&self, service: &str) -> Option<&Value> {
        self.configuration().and_then(|config| config.get(service))
    }

    /// A single setting of `service`; `key` may be a dotted path.
    pub fn setting(&self, service: &str, key: &str) -> ContainerResult<&Value> {
        self.configuration_for(service)
            .and_then(|settings| settings.lookup(key))
            .ok_or_else(|| missing_setting(service, key))
    }

    pub fn setting_i64(&self, service: &str, key: &str) -> ContainerResult<i64> {
        let value = self.setting(service, key)?;
        value
            .as_i64()
            .ok_or_else(|| invalid_setting(service, key, "integer", value))
    }

    pub fn setting_str(&self, service: &str, key: &str) -> ContainerResult<&str> {
        let value = self.setting(service, key)?;
        value
            .as_str()
            .ok_or_else(|| invalid_setting(service, key, "string", value))
    }

    fn enter(&self, name: &str) -> ContainerResult<()> {
        let mut resolving = self.resolving.borrow_mut();
        if resolving.iter().any(|active| active == name) {
            let mut chain = resolving.clone();
            chain.push(name.to_string());
            return Err(ContainerError::CircularDependency { chain });
        }
        resolving.push(name.to_string());
        Ok(())
    }
}

pub(crate) fn missing_setting(service: &str, key: &str) -> ContainerError {
    ContainerError::MissingSetting {
        service: service.to_string(),
        key: key.to_string(),
    }
}

pub(crate) fn invalid_setting(
    service: &str,
    key: &str,
    expected: &'static str,
    found: &Value,
) -> ContainerError {
    ContainerError::InvalidSetting {
        service: service.to_string(),
        key: key.to_string(),
        expected,
        found: found.type_name(),
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}
