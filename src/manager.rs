use std::{
    cell::Cell,
    collections::HashMap,
    fmt,
    sync::{Arc, Weak},
};

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use smallvec::SmallVec;

use crate::{
    capability::CapabilityResolver,
    category::ListenerCategory,
    config::ManagerConfig,
    directory::{ComponentDirectory, ComponentHandler, NativeRegistrar},
    error::{DispatchError, Result},
    event::FormEvent,
    listener::{
        EventListener, FormActionListener, FormChangeListener, FormFocusListener,
        FormMouseListener,
    },
};

// Copy-on-write: fire() clones the Arc, writers go through Arc::make_mut.
type ListenerList = Arc<SmallVec<[EventListener; 4]>>;

// Per category index: wildcard bindings and bindings per component name
#[derive(Default)]
struct CategoryIndex {
    any: ListenerList,
    by_component: HashMap<String, ListenerList>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Hookup {
    Pending,
    Running,
    Done,
}

// One lock per (component, category). Reentrant so a listener notified from
// inside the registrar may bind further listeners on the same thread.
type HookupCell = Arc<ReentrantMutex<Cell<Hookup>>>;

struct ManagerInner {
    session: String,
    component_capacity: usize,
    registrar: Arc<dyn NativeRegistrar>,
    directory: RwLock<Option<Arc<dyn ComponentDirectory>>>,
    bindings: RwLock<HashMap<ListenerCategory, CategoryIndex>>,
    // (component, category) pairs seen by the registrar; only grows
    marks: Mutex<HashMap<(String, ListenerCategory), HookupCell>>,
    resolver: CapabilityResolver,
}

/// The event dispatch registry of a form.
///
/// Listeners are bound to a named component or, through the `*_all`
/// variants, to every component of the form. The native toolkit is hooked up
/// lazily through the [`NativeRegistrar`] the first time a listener of some
/// category is bound to a component, and never more than once per
/// (component, category). The native bridge then reports raw events back
/// through [`fire`](Self::fire).
///
/// The handle is cheap to clone; all clones share the same state. Every
/// operation may be called concurrently, also from within a listener that is
/// currently being notified.
#[derive(Clone)]
pub struct EventManager {
    inner: Arc<ManagerInner>,
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager")
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl EventManager {
    pub fn new(registrar: Arc<dyn NativeRegistrar>) -> Self {
        Self::with_config(registrar, ManagerConfig::default())
    }

    pub fn with_config(registrar: Arc<dyn NativeRegistrar>, cfg: ManagerConfig) -> Self {
        let inner = ManagerInner {
            session: cfg.session,
            component_capacity: cfg.component_capacity,
            registrar,
            directory: RwLock::new(None),
            bindings: RwLock::new(HashMap::new()),
            marks: Mutex::new(HashMap::new()),
            resolver: CapabilityResolver::new(),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// A handle that does not keep the manager alive, for registrars that
    /// want to fire events later.
    pub fn downgrade(&self) -> WeakEventManager {
        WeakEventManager {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn session(&self) -> &str {
        &self.inner.session
    }

    pub fn set_component_directory(&self, directory: Arc<dyn ComponentDirectory>) {
        *self.inner.directory.write() = Some(directory);
    }

    pub fn component_directory(&self) -> Option<Arc<dyn ComponentDirectory>> {
        self.inner.directory.read().clone()
    }

    /// Resolver used for listener types outside the static categories.
    pub fn capabilities(&self) -> &CapabilityResolver {
        &self.inner.resolver
    }

    pub(crate) fn directory(&self) -> Result<Arc<dyn ComponentDirectory>> {
        self.component_directory().ok_or(DispatchError::NoComponentDirectory)
    }

    /// Looks up the handler of a component; fails if no directory is attached.
    pub fn component_handler(&self, name: &str) -> Result<Option<ComponentHandler>> {
        Ok(self.directory()?.resolve(name))
    }

    pub fn add_action_listener(&self, name: &str, l: Arc<dyn FormActionListener>) -> Result<()> {
        self.add_named(ListenerCategory::Action, name, EventListener::action(l))
    }
    pub fn add_action_listener_all(&self, l: Arc<dyn FormActionListener>) -> Result<()> {
        self.add_all(ListenerCategory::Action, EventListener::action(l)).map(|_| ())
    }
    pub fn remove_action_listener(&self, name: &str, l: Arc<dyn FormActionListener>) -> bool {
        self.remove(ListenerCategory::Action, Some(name), Some(&EventListener::action(l)))
    }
    pub fn remove_action_listener_all(&self, l: Arc<dyn FormActionListener>) -> bool {
        self.remove(ListenerCategory::Action, None, Some(&EventListener::action(l)))
    }

    pub fn add_change_listener(&self, name: &str, l: Arc<dyn FormChangeListener>) -> Result<()> {
        self.add_named(ListenerCategory::Change, name, EventListener::change(l))
    }
    pub fn add_change_listener_all(&self, l: Arc<dyn FormChangeListener>) -> Result<()> {
        self.add_all(ListenerCategory::Change, EventListener::change(l)).map(|_| ())
    }
    pub fn remove_change_listener(&self, name: &str, l: Arc<dyn FormChangeListener>) -> bool {
        self.remove(ListenerCategory::Change, Some(name), Some(&EventListener::change(l)))
    }
    pub fn remove_change_listener_all(&self, l: Arc<dyn FormChangeListener>) -> bool {
        self.remove(ListenerCategory::Change, None, Some(&EventListener::change(l)))
    }

    pub fn add_focus_listener(&self, name: &str, l: Arc<dyn FormFocusListener>) -> Result<()> {
        self.add_named(ListenerCategory::Focus, name, EventListener::focus(l))
    }
    pub fn add_focus_listener_all(&self, l: Arc<dyn FormFocusListener>) -> Result<()> {
        self.add_all(ListenerCategory::Focus, EventListener::focus(l)).map(|_| ())
    }
    pub fn remove_focus_listener(&self, name: &str, l: Arc<dyn FormFocusListener>) -> bool {
        self.remove(ListenerCategory::Focus, Some(name), Some(&EventListener::focus(l)))
    }
    pub fn remove_focus_listener_all(&self, l: Arc<dyn FormFocusListener>) -> bool {
        self.remove(ListenerCategory::Focus, None, Some(&EventListener::focus(l)))
    }

    pub fn add_mouse_listener(&self, name: &str, l: Arc<dyn FormMouseListener>) -> Result<()> {
        self.add_named(ListenerCategory::Mouse, name, EventListener::mouse(l))
    }
    pub fn add_mouse_listener_all(&self, l: Arc<dyn FormMouseListener>) -> Result<()> {
        self.add_all(ListenerCategory::Mouse, EventListener::mouse(l)).map(|_| ())
    }
    pub fn remove_mouse_listener(&self, name: &str, l: Arc<dyn FormMouseListener>) -> bool {
        self.remove(ListenerCategory::Mouse, Some(name), Some(&EventListener::mouse(l)))
    }
    pub fn remove_mouse_listener_all(&self, l: Arc<dyn FormMouseListener>) -> bool {
        self.remove(ListenerCategory::Mouse, None, Some(&EventListener::mouse(l)))
    }

    /// Binds `listener` to `component` (or to all components with `None`).
    ///
    /// Returns the number of components the binding covers; 0 for a missing
    /// listener or one that does not implement the category's trait. An
    /// unknown component name is reported as [`DispatchError::NoSuchComponent`].
    pub fn add(
        &self,
        category: ListenerCategory,
        component: Option<&str>,
        listener: Option<&EventListener>,
    ) -> Result<usize> {
        let Some(l) = listener else { return Ok(0) };
        if !category.accepts(l) {
            tracing::debug!(session = %self.inner.session, category = %category, listener = l.type_name(), "listener does not fit category; ignored");
            return Ok(0);
        }
        match component {
            Some(name) => self.add_named(category, name, l.clone()).map(|_| 1),
            None => self.add_all(category, l.clone()),
        }
    }

    /// Removes one binding of `listener` (the latest if it was added twice).
    /// Returns whether a binding was removed; never touches the native layer.
    pub fn remove(
        &self,
        category: ListenerCategory,
        component: Option<&str>,
        listener: Option<&EventListener>,
    ) -> bool {
        let Some(l) = listener else { return false };
        let mut bindings = self.inner.bindings.write();
        let Some(idx) = bindings.get_mut(&category) else { return false };
        let removed = match component {
            Some(name) => {
                let Some(list) = idx.by_component.get_mut(name) else { return false };
                let removed = remove_last(list, l);
                if list.is_empty() {
                    idx.by_component.remove(name);
                }
                removed
            }
            None => remove_last(&mut idx.any, l),
        };
        if removed {
            tracing::debug!(session = %self.inner.session, category = %category, component = ?component, "listener removed");
        }
        removed
    }

    /// Delivers `event` to the listeners of `category` bound to the event's
    /// component, then to the wildcard listeners.
    ///
    /// The listener sets are captured before the first listener is invoked:
    /// listeners added during delivery miss this event, listeners removed
    /// during delivery still get it.
    pub fn fire(&self, event: &FormEvent, category: ListenerCategory) -> Result<()> {
        self.directory()?;
        if event.category() != category {
            tracing::warn!(session = %self.inner.session, category = %category, event = ?event.category(), component = %event.name(), "event does not belong to category; not delivered");
            return Ok(());
        }
        let (named, any) = {
            let bindings = self.inner.bindings.read();
            match bindings.get(&category) {
                Some(idx) => (idx.by_component.get(event.name()).cloned(), idx.any.clone()),
                None => return Ok(()),
            }
        };
        for l in named.iter().flat_map(|list| list.iter()).chain(any.iter()) {
            category.dispatch(l, event);
        }
        Ok(())
    }

    /// Performs the native registrations owed to a component that became
    /// known after wildcard listeners were added. Returns the number of
    /// categories it was registered for.
    pub fn component_added(&self, name: &str) -> Result<usize> {
        let handler = self
            .component_handler(name)?
            .ok_or_else(|| DispatchError::NoSuchComponent(name.to_string()))?;
        let pending: Vec<ListenerCategory> = {
            let bindings = self.inner.bindings.read();
            bindings
                .iter()
                .filter(|(_, idx)| !idx.any.is_empty())
                .map(|(c, _)| *c)
                .collect()
        };
        for category in &pending {
            self.ensure_registered(name, &handler, *category)?;
        }
        Ok(pending.len())
    }

    /// Number of bindings of `category` for a component, or the wildcard
    /// bindings with `None`.
    pub fn listener_count(&self, category: ListenerCategory, component: Option<&str>) -> usize {
        let bindings = self.inner.bindings.read();
        let Some(idx) = bindings.get(&category) else { return 0 };
        match component {
            Some(name) => idx.by_component.get(name).map_or(0, |l| l.len()),
            None => idx.any.len(),
        }
    }

    fn add_named(&self, category: ListenerCategory, name: &str, l: EventListener) -> Result<()> {
        let handler = self
            .component_handler(name)?
            .ok_or_else(|| DispatchError::NoSuchComponent(name.to_string()))?;
        self.ensure_registered(name, &handler, category)?;
        let mut bindings = self.inner.bindings.write();
        let cap = self.inner.component_capacity;
        let idx = bindings.entry(category).or_insert_with(|| CategoryIndex {
            any: ListenerList::default(),
            by_component: HashMap::with_capacity(cap),
        });
        Arc::make_mut(idx.by_component.entry(name.to_string()).or_default()).push(l);
        tracing::debug!(session = %self.inner.session, category = %category, component = %name, "listener added");
        Ok(())
    }

    fn add_all(&self, category: ListenerCategory, l: EventListener) -> Result<usize> {
        let directory = self.directory()?;
        let names = directory.names();
        for name in &names {
            if let Some(handler) = directory.resolve(name) {
                self.ensure_registered(name, &handler, category)?;
            }
        }
        let mut bindings = self.inner.bindings.write();
        let cap = self.inner.component_capacity;
        let idx = bindings.entry(category).or_insert_with(|| CategoryIndex {
            any: ListenerList::default(),
            by_component: HashMap::with_capacity(cap),
        });
        Arc::make_mut(&mut idx.any).push(l);
        tracing::debug!(session = %self.inner.session, category = %category, components = names.len(), "wildcard listener added");
        Ok(names.len())
    }

    // Only the pair's own lock is held across the registrar call: concurrent
    // first adds for a pair produce exactly one call, other pairs proceed.
    // Re-entry on the registering thread sees `Running` and skips the sink.
    fn ensure_registered(
        &self,
        name: &str,
        handler: &ComponentHandler,
        category: ListenerCategory,
    ) -> Result<()> {
        let cell = {
            let mut marks = self.inner.marks.lock();
            marks
                .entry((name.to_string(), category))
                .or_insert_with(|| Arc::new(ReentrantMutex::new(Cell::new(Hookup::Pending))))
                .clone()
        };
        let state = cell.lock();
        if state.get() != Hookup::Pending {
            return Ok(());
        }
        state.set(Hookup::Running);
        tracing::info!(session = %self.inner.session, category = %category, component = %name, "registering native listener");
        match self.inner.registrar.register_once(name, handler, category, self) {
            Ok(()) => {
                state.set(Hookup::Done);
                Ok(())
            }
            Err(source) => {
                state.set(Hookup::Pending);
                tracing::error!(session = %self.inner.session, category = %category, component = %name, error = %source, "native registration failed");
                Err(DispatchError::Registration {
                    component: name.to_string(),
                    category,
                    source,
                })
            }
        }
    }
}

/// Non-owning counterpart of [`EventManager`], see [`EventManager::downgrade`].
#[derive(Clone, Default)]
pub struct WeakEventManager {
    inner: Weak<ManagerInner>,
}

impl WeakEventManager {
    pub fn upgrade(&self) -> Option<EventManager> {
        self.inner.upgrade().map(|inner| EventManager { inner })
    }
}

impl fmt::Debug for WeakEventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakEventManager").finish_non_exhaustive()
    }
}

fn remove_last(list: &mut ListenerList, l: &EventListener) -> bool {
    match list.iter().rposition(|x| x == l) {
        Some(pos) => {
            Arc::make_mut(list).remove(pos);
            true
        }
        None => false,
    }
}
