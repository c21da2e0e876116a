//! Shared container handle
//!
//! Packages keep a handle to the container they registered against. The
//! handle is cheap to clone and single-threaded: registration is expected to
//! happen once, during startup, on one thread.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::infrastructure::di::Container;
use crate::infrastructure::ContainerResult;

/// Reference-counted, mutable handle to a [`Container`].
#[derive(Clone, Default)]
pub struct SharedContainer {
    inner: Rc<RefCell<Container>>,
}

impl SharedContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn borrow(&self) -> Ref<'_, Container> {
        self.inner.borrow()
    }

    /// Mutable access. Panics if the container is borrowed, e.g. from
    /// inside a running factory.
    pub fn borrow_mut(&self) -> RefMut<'_, Container> {
        self.inner.borrow_mut()
    }

    /// Whether both handles point at the same container.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn resolve<T: Any>(&self, name: &str) -> ContainerResult<Rc<T>> {
        self.inner.borrow().resolve(name)
    }

    pub fn resolve_tagged<T: Any>(&self, tag: &str) -> ContainerResult<Vec<Rc<T>>> {
        self.inner.borrow().resolve_tagged(tag)
    }
}

impl From<Container> for SharedContainer {
    fn from(container: Container) -> Self {
        Self {
            inner: Rc::new(RefCell::new(container)),
        }
    }
}

impl fmt::Debug for SharedContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(container) => f.debug_tuple("SharedContainer").field(&*container).finish(),
            Err(_) => f.write_str("SharedContainer(<borrowed>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_cloned_handle_when_mutating_then_both_see_change() {
        let container = SharedContainer::new();
        let other = container.clone();

        other.borrow_mut().set_parameter("key", "value");

        assert!(container.ptr_eq(&other));
        assert!(container.borrow().contains("key"));
    }

    #[test]
    fn given_separate_handles_when_comparing_then_not_equal() {
        assert!(!SharedContainer::new().ptr_eq(&SharedContainer::new()));
    }
}
