//! Listener capability traits and the type-erased listener reference.
use std::{
    any::{type_name, Any},
    fmt,
    sync::Arc,
};

use crate::event::{FormActionEvent, FormChangeEvent, FormFocusEvent, FormMouseEvent};

pub trait FormActionListener: Send + Sync {
    fn action_performed(&self, event: &FormActionEvent);
}

pub trait FormChangeListener: Send + Sync {
    fn element_changed(&self, event: &FormChangeEvent);
}

pub trait FormFocusListener: Send + Sync {
    fn focus_gained(&self, event: &FormFocusEvent);
    fn focus_lost(&self, event: &FormFocusEvent);
}

pub trait FormMouseListener: Send + Sync {
    fn mouse_pressed(&self, event: &FormMouseEvent);
    fn mouse_released(&self, event: &FormMouseEvent);
    fn mouse_clicked(&self, event: &FormMouseEvent);
    fn mouse_double_clicked(&self, event: &FormMouseEvent);
    fn mouse_entered(&self, event: &FormMouseEvent);
    fn mouse_exited(&self, event: &FormMouseEvent);
}

/// A listener of any kind, with its concrete listener type erased.
///
/// Built from an `Arc<L>`, where `L` is usually a trait object such as
/// `dyn FormActionListener`; `downcast::<L>()` hands the same `Arc` back.
/// Two `EventListener`s are equal when they wrap the same allocation, so a
/// listener can be removed with a reference created independently from the
/// one used to add it.
#[derive(Clone)]
pub struct EventListener {
    inner: Arc<dyn Any + Send + Sync>,
    addr: usize,
    type_name: &'static str,
}

impl EventListener {
    pub fn new<L>(listener: Arc<L>) -> Self
    where
        L: ?Sized + Send + Sync + 'static,
    {
        let addr = Arc::as_ptr(&listener) as *const () as usize;
        Self {
            inner: Arc::new(listener),
            addr,
            type_name: type_name::<L>(),
        }
    }

    pub fn action(listener: Arc<dyn FormActionListener>) -> Self {
        Self::new(listener)
    }
    pub fn change(listener: Arc<dyn FormChangeListener>) -> Self {
        Self::new(listener)
    }
    pub fn focus(listener: Arc<dyn FormFocusListener>) -> Self {
        Self::new(listener)
    }
    pub fn mouse(listener: Arc<dyn FormMouseListener>) -> Self {
        Self::new(listener)
    }

    /// Returns the wrapped listener if it was created as an `Arc<L>`.
    pub fn downcast<L>(&self) -> Option<Arc<L>>
    where
        L: ?Sized + Send + Sync + 'static,
    {
        self.inner.downcast_ref::<Arc<L>>().cloned()
    }

    pub fn is<L>(&self) -> bool
    where
        L: ?Sized + Send + Sync + 'static,
    {
        self.inner.is::<Arc<L>>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for EventListener {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}
impl Eq for EventListener {}

impl fmt::Debug for EventListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventListener({})", self.type_name)
    }
}
