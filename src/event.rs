//! Event values delivered to form listeners.
//!
//! Events are produced by the native bridge (or by tests) and are immutable
//! once created. Every event carries the name of the component it originates
//! from and the component's handler; the category specific types add their
//! payload on top of that.
use std::{fmt, sync::Arc};

use crate::{category::ListenerCategory, directory::ComponentHandler};

#[derive(Clone)]
pub struct EventBase {
    name: String,
    handler: ComponentHandler,
}

impl EventBase {
    pub fn new(name: impl Into<String>, handler: ComponentHandler) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn handler(&self) -> &ComponentHandler {
        &self.handler
    }
}

// handlers are opaque: compare by identity
impl PartialEq for EventBase {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.handler, &other.handler)
    }
}
impl Eq for EventBase {}

impl fmt::Debug for EventBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBase").field("name", &self.name).finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormActionEvent {
    base: EventBase,
    command: String,
}

impl FormActionEvent {
    pub fn new(base: EventBase, command: impl Into<String>) -> Self {
        Self {
            base,
            command: command.into(),
        }
    }
    pub fn name(&self) -> &str {
        self.base.name()
    }
    pub fn handler(&self) -> &ComponentHandler {
        self.base.handler()
    }
    pub fn command(&self) -> &str {
        &self.command
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormChangeEvent {
    base: EventBase,
}

impl FormChangeEvent {
    pub fn new(base: EventBase) -> Self {
        Self { base }
    }
    pub fn name(&self) -> &str {
        self.base.name()
    }
    pub fn handler(&self) -> &ComponentHandler {
        self.base.handler()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FocusChange {
    Gained,
    Lost,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormFocusEvent {
    base: EventBase,
    kind: FocusChange,
}

impl FormFocusEvent {
    pub fn new(base: EventBase, kind: FocusChange) -> Self {
        Self { base, kind }
    }
    pub fn name(&self) -> &str {
        self.base.name()
    }
    pub fn handler(&self) -> &ComponentHandler {
        self.base.handler()
    }
    pub fn kind(&self) -> FocusChange {
        self.kind
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseAction {
    Pressed,
    Released,
    Clicked,
    DoubleClicked,
    Entered,
    Exited,
}

bitflags::bitflags! {
    /// Modifier keys held down while a mouse event occurred.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const ALT = 1 << 0;
        const ALT_GRAPH = 1 << 1;
        const CONTROL = 1 << 2;
        const META = 1 << 3;
        const SHIFT = 1 << 4;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormMouseEvent {
    base: EventBase,
    kind: MouseAction,
    x: i32,
    y: i32,
    button: u8,
    modifiers: Modifiers,
}

impl FormMouseEvent {
    pub const NO_BUTTON: u8 = 0;
    pub const BUTTON1: u8 = 1;
    pub const BUTTON2: u8 = 2;
    pub const BUTTON3: u8 = 3;

    pub fn new(
        base: EventBase,
        kind: MouseAction,
        x: i32,
        y: i32,
        button: u8,
        modifiers: Modifiers,
    ) -> Self {
        Self {
            base,
            kind,
            x,
            y,
            button,
            modifiers,
        }
    }
    pub fn name(&self) -> &str {
        self.base.name()
    }
    pub fn handler(&self) -> &ComponentHandler {
        self.base.handler()
    }
    pub fn kind(&self) -> MouseAction {
        self.kind
    }
    pub fn x(&self) -> i32 {
        self.x
    }
    pub fn y(&self) -> i32 {
        self.y
    }
    pub fn button(&self) -> u8 {
        self.button
    }
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

/// Any event the dispatch core can deliver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormEvent {
    Action(FormActionEvent),
    Change(FormChangeEvent),
    Focus(FormFocusEvent),
    Mouse(FormMouseEvent),
}

impl FormEvent {
    pub fn name(&self) -> &str {
        match self {
            FormEvent::Action(e) => e.name(),
            FormEvent::Change(e) => e.name(),
            FormEvent::Focus(e) => e.name(),
            FormEvent::Mouse(e) => e.name(),
        }
    }

    pub fn handler(&self) -> &ComponentHandler {
        match self {
            FormEvent::Action(e) => e.handler(),
            FormEvent::Change(e) => e.handler(),
            FormEvent::Focus(e) => e.handler(),
            FormEvent::Mouse(e) => e.handler(),
        }
    }

    pub fn category(&self) -> ListenerCategory {
        match self {
            FormEvent::Action(_) => ListenerCategory::Action,
            FormEvent::Change(_) => ListenerCategory::Change,
            FormEvent::Focus(_) => ListenerCategory::Focus,
            FormEvent::Mouse(_) => ListenerCategory::Mouse,
        }
    }
}

impl From<FormActionEvent> for FormEvent {
    fn from(e: FormActionEvent) -> Self {
        FormEvent::Action(e)
    }
}
impl From<FormChangeEvent> for FormEvent {
    fn from(e: FormChangeEvent) -> Self {
        FormEvent::Change(e)
    }
}
impl From<FormFocusEvent> for FormEvent {
    fn from(e: FormFocusEvent) -> Self {
        FormEvent::Focus(e)
    }
}
impl From<FormMouseEvent> for FormEvent {
    fn from(e: FormMouseEvent) -> Self {
        FormEvent::Mouse(e)
    }
}
