//! Convention based listener registration for capabilities the core does not
//! know statically.
//!
//! A component type exposes a listener capability through a pair of methods
//! named `add<Name>Listener` / `remove<Name>Listener`. Since Rust has no
//! runtime reflection, each such method is made known to the resolver as an
//! adapter: either generated at compile time by
//! [`listener_methods`](crate::listener_methods) and collected through
//! `inventory`, or registered at runtime with [`CapabilityResolver::register`].
//! An adapter downcasts the target object and the listener to the types the
//! method expects and reports whether it could perform the call.
use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    fmt,
    sync::Arc,
};

use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::{
    category::ListenerCategory,
    directory::ComponentHandler,
    error::{DispatchError, Result},
    listener::EventListener,
    manager::EventManager,
};

pub type ListenerMethodFn = fn(&(dyn Any + Send + Sync), &EventListener) -> bool;

/// A listener registration method discovered at compile time.
pub struct ListenerMethod {
    pub target: fn() -> TypeId,
    pub target_name: fn() -> &'static str,
    /// Convention name, e.g. `addExpansionListener`.
    pub name: &'static str,
    pub invoke: ListenerMethodFn,
}

inventory::collect!(ListenerMethod);

/// Iterate all compile-time listener methods.
pub fn listener_methods() -> Vec<&'static ListenerMethod> {
    inventory::iter::<ListenerMethod>.into_iter().collect()
}

type Adapter = Arc<dyn Fn(&(dyn Any + Send + Sync), &EventListener) -> bool + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerOp {
    Add,
    Remove,
}

impl ListenerOp {
    /// `add<Name>Listener` or `remove<Name>Listener`, with `listener_type` kept as supplied.
    pub fn method_name(self, listener_type: &str) -> String {
        match self {
            ListenerOp::Add => format!("add{listener_type}Listener"),
            ListenerOp::Remove => format!("remove{listener_type}Listener"),
        }
    }
}

pub struct CapabilityResolver {
    adapters: RwLock<HashMap<(TypeId, String), SmallVec<[Adapter; 2]>>>,
}

impl CapabilityResolver {
    /// A resolver pre-populated with every method collected at compile time.
    pub fn new() -> Self {
        let resolver = Self::empty();
        {
            let mut adapters = resolver.adapters.write();
            for m in inventory::iter::<ListenerMethod> {
                adapters
                    .entry(((m.target)(), m.name.to_string()))
                    .or_default()
                    .push(Arc::new(m.invoke) as Adapter);
            }
        }
        resolver
    }

    pub fn empty() -> Self {
        Self {
            adapters: RwLock::new(HashMap::new()),
        }
    }

    /// Makes `method` callable on targets of type `T`.
    ///
    /// `f` returns `false` if the listener is not of the type the method
    /// expects. Several adapters may share a name; the first one accepting a
    /// listener wins.
    pub fn register<T, F>(&self, method: impl Into<String>, f: F)
    where
        T: Any + Send + Sync,
        F: Fn(&T, &EventListener) -> bool + Send + Sync + 'static,
    {
        let adapter: Adapter =
            Arc::new(move |target: &(dyn Any + Send + Sync), listener: &EventListener| {
                target.downcast_ref::<T>().is_some_and(|t| f(t, listener))
            });
        let method = method.into();
        tracing::debug!(target_type = type_name::<T>(), method = %method, "listener method registered");
        self.adapters
            .write()
            .entry((TypeId::of::<T>(), method))
            .or_default()
            .push(adapter);
    }

    pub fn supports(&self, target: &(dyn Any + Send + Sync), method: &str) -> bool {
        let target = handler_target(target);
        self.adapters
            .read()
            .contains_key(&((*target).type_id(), method.to_string()))
    }

    /// Calls `method` on `target` with `listener`; `false` if no adapter accepted the pair.
    pub fn invoke(
        &self,
        target: &(dyn Any + Send + Sync),
        method: &str,
        listener: &EventListener,
    ) -> bool {
        let target = handler_target(target);
        // adapters run without the lock held, they may register further listeners
        let candidates: SmallVec<[Adapter; 2]> = {
            let adapters = self.adapters.read();
            match adapters.get(&((*target).type_id(), method.to_string())) {
                Some(list) => list.clone(),
                None => return false,
            }
        };
        candidates.iter().any(|adapter| adapter(target, listener))
    }
}

// A `&ComponentHandler` coerces to `&dyn Any` as the Arc itself; look through it.
fn handler_target(target: &(dyn Any + Send + Sync)) -> &(dyn Any + Send + Sync) {
    match target.downcast_ref::<ComponentHandler>() {
        Some(handler) => &**handler,
        None => target,
    }
}

impl Default for CapabilityResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CapabilityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityResolver")
            .field("methods", &self.adapters.read().len())
            .finish()
    }
}

// Generic, name based entry points. Unresolvable requests count as zero.
impl EventManager {
    /// Adds `listener` for the listener type `listener_type` to one component
    /// or, with `None`, to all known components.
    ///
    /// Static categories (matched case-insensitively) take priority when the
    /// listener implements the category's trait. Anything else is resolved
    /// through an `add<listener_type>Listener` method of the component
    /// handlers. Returns the number of components the listener was added to.
    pub fn add_listener(
        &self,
        component: Option<&str>,
        listener_type: &str,
        listener: Option<&EventListener>,
    ) -> Result<usize> {
        match listener {
            Some(l) => self.process_listener(component, listener_type, l, ListenerOp::Add),
            None => Ok(0),
        }
    }

    /// Counterpart of [`add_listener`](Self::add_listener).
    pub fn remove_listener(
        &self,
        component: Option<&str>,
        listener_type: &str,
        listener: Option<&EventListener>,
    ) -> Result<usize> {
        match listener {
            Some(l) => self.process_listener(component, listener_type, l, ListenerOp::Remove),
            None => Ok(0),
        }
    }

    /// Calls `add<listener_type>Listener` on an object that is not managed by
    /// the component directory.
    pub fn add_listener_to_object(
        &self,
        target: Option<&(dyn Any + Send + Sync)>,
        listener_type: &str,
        listener: Option<&EventListener>,
    ) -> bool {
        match (target, listener) {
            (Some(t), Some(l)) => self.invoke_listener_method(t, listener_type, l, ListenerOp::Add),
            _ => false,
        }
    }

    pub fn remove_listener_from_object(
        &self,
        target: Option<&(dyn Any + Send + Sync)>,
        listener_type: &str,
        listener: Option<&EventListener>,
    ) -> bool {
        match (target, listener) {
            (Some(t), Some(l)) => {
                self.invoke_listener_method(t, listener_type, l, ListenerOp::Remove)
            }
            _ => false,
        }
    }

    fn process_listener(
        &self,
        component: Option<&str>,
        listener_type: &str,
        listener: &EventListener,
        op: ListenerOp,
    ) -> Result<usize> {
        if let Some(category) =
            ListenerCategory::from_name(listener_type).filter(|c| c.accepts(listener))
        {
            return self.process_static_listener(component, category, listener, op);
        }
        let names = match component {
            Some(name) => vec![name.to_string()],
            None => self.directory()?.names(),
        };
        let mut count = 0;
        for name in names {
            if let Some(handler) = self.component_handler(&name)? {
                if self.invoke_listener_method(handler.as_ref(), listener_type, listener, op) {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    fn process_static_listener(
        &self,
        component: Option<&str>,
        category: ListenerCategory,
        listener: &EventListener,
        op: ListenerOp,
    ) -> Result<usize> {
        match op {
            ListenerOp::Add => match self.add(category, component, Some(listener)) {
                Err(DispatchError::NoSuchComponent(_)) => Ok(0),
                other => other,
            },
            ListenerOp::Remove => {
                if !self.remove(category, component, Some(listener)) {
                    return Ok(0);
                }
                match component {
                    Some(_) => Ok(1),
                    None => Ok(self.directory()?.names().len()),
                }
            }
        }
    }

    fn invoke_listener_method(
        &self,
        target: &(dyn Any + Send + Sync),
        listener_type: &str,
        listener: &EventListener,
        op: ListenerOp,
    ) -> bool {
        let method = op.method_name(listener_type);
        let done = self.capabilities().invoke(target, &method, listener);
        if !done {
            tracing::info!(
                session = %self.session(),
                method = %method,
                listener = listener.type_name(),
                "could not resolve listener method at target object"
            );
        }
        done
    }
}
