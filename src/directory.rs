//! Collaborators of the dispatch core: the component directory and the
//! native registration sink.
use std::{any::Any, collections::HashMap, fmt, sync::Arc};

use parking_lot::RwLock;

use crate::{category::ListenerCategory, manager::EventManager};

/// Opaque handler of a form component.
pub type ComponentHandler = Arc<dyn Any + Send + Sync>;

/// Resolves component names to their handlers.
///
/// `names()` must reflect the components known at call time; wildcard
/// operations query it on every call.
pub trait ComponentDirectory: Send + Sync {
    fn resolve(&self, name: &str) -> Option<ComponentHandler>;
    fn names(&self) -> Vec<String>;
}

/// Hooks a component into the widget toolkit so that its raw events reach
/// [`EventManager::fire`]. Called at most once per (component, category).
pub trait NativeRegistrar: Send + Sync {
    fn register_once(
        &self,
        name: &str,
        handler: &ComponentHandler,
        category: ListenerCategory,
        manager: &EventManager,
    ) -> anyhow::Result<()>;
}

/// In-memory [`ComponentDirectory`], filled while a form is being built.
#[derive(Default)]
pub struct ComponentStore {
    inner: RwLock<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    order: Vec<String>,
    handlers: HashMap<String, ComponentHandler>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the handler stored under `name`.
    pub fn add(&self, name: impl Into<String>, handler: ComponentHandler) {
        let name = name.into();
        let mut inner = self.inner.write();
        if inner.handlers.insert(name.clone(), handler).is_none() {
            inner.order.push(name);
        }
    }

    pub fn remove(&self, name: &str) -> Option<ComponentHandler> {
        let mut inner = self.inner.write();
        let removed = inner.handlers.remove(name);
        if removed.is_some() {
            inner.order.retain(|n| n != name);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ComponentDirectory for ComponentStore {
    fn resolve(&self, name: &str) -> Option<ComponentHandler> {
        self.inner.read().handlers.get(name).cloned()
    }
    fn names(&self) -> Vec<String> {
        self.inner.read().order.clone()
    }
}

impl fmt::Debug for ComponentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentStore").field("names", &self.inner.read().order).finish()
    }
}
