//! Static listener categories and the catalog of their dispatch rules.
//!
//! Every static category owns one [`CategoryEntry`]: a predicate telling
//! whether an erased listener implements the category's listener trait, and a
//! rule mapping an event to exactly one method of that trait. The registry
//! only talks to categories through their entry, so a new category needs a
//! variant here and one entry in [`CATALOG`].
use std::fmt;

use crate::{
    event::{FocusChange, FormEvent, MouseAction},
    listener::{
        EventListener, FormActionListener, FormChangeListener, FormFocusListener,
        FormMouseListener,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenerCategory {
    Action,
    Change,
    Focus,
    Mouse,
}

impl ListenerCategory {
    pub const ALL: [ListenerCategory; 4] = [
        ListenerCategory::Action,
        ListenerCategory::Change,
        ListenerCategory::Focus,
        ListenerCategory::Mouse,
    ];

    /// Upper-case constant name, e.g. `ACTION`.
    pub fn name(self) -> &'static str {
        match self {
            ListenerCategory::Action => "ACTION",
            ListenerCategory::Change => "CHANGE",
            ListenerCategory::Focus => "FOCUS",
            ListenerCategory::Mouse => "MOUSE",
        }
    }

    /// Name as used in listener registration methods, e.g. `Action`.
    pub fn listener_type_name(self) -> &'static str {
        match self {
            ListenerCategory::Action => "Action",
            ListenerCategory::Change => "Change",
            ListenerCategory::Focus => "Focus",
            ListenerCategory::Mouse => "Mouse",
        }
    }

    /// Case-insensitive lookup; free-form names yield `None`.
    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name().eq_ignore_ascii_case(s))
    }

    pub fn entry(self) -> &'static CategoryEntry {
        &CATALOG[self as usize]
    }

    pub fn accepts(self, listener: &EventListener) -> bool {
        (self.entry().accepts)(listener)
    }

    /// Invokes the listener method selected by the category's dispatch rule.
    /// Returns `false` if the listener or the event does not belong to this category.
    pub fn dispatch(self, listener: &EventListener, event: &FormEvent) -> bool {
        (self.entry().dispatch)(listener, event)
    }
}

impl fmt::Display for ListenerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct CategoryEntry {
    pub category: ListenerCategory,
    pub accepts: fn(&EventListener) -> bool,
    pub dispatch: fn(&EventListener, &FormEvent) -> bool,
}

impl fmt::Debug for CategoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryEntry").field("category", &self.category).finish_non_exhaustive()
    }
}

// indexed by discriminant
pub static CATALOG: [CategoryEntry; 4] = [
    CategoryEntry {
        category: ListenerCategory::Action,
        accepts: EventListener::is::<dyn FormActionListener>,
        dispatch: dispatch_action,
    },
    CategoryEntry {
        category: ListenerCategory::Change,
        accepts: EventListener::is::<dyn FormChangeListener>,
        dispatch: dispatch_change,
    },
    CategoryEntry {
        category: ListenerCategory::Focus,
        accepts: EventListener::is::<dyn FormFocusListener>,
        dispatch: dispatch_focus,
    },
    CategoryEntry {
        category: ListenerCategory::Mouse,
        accepts: EventListener::is::<dyn FormMouseListener>,
        dispatch: dispatch_mouse,
    },
];

fn dispatch_action(l: &EventListener, event: &FormEvent) -> bool {
    match (l.downcast::<dyn FormActionListener>(), event) {
        (Some(l), FormEvent::Action(e)) => {
            l.action_performed(e);
            true
        }
        _ => false,
    }
}

fn dispatch_change(l: &EventListener, event: &FormEvent) -> bool {
    match (l.downcast::<dyn FormChangeListener>(), event) {
        (Some(l), FormEvent::Change(e)) => {
            l.element_changed(e);
            true
        }
        _ => false,
    }
}

fn dispatch_focus(l: &EventListener, event: &FormEvent) -> bool {
    match (l.downcast::<dyn FormFocusListener>(), event) {
        (Some(l), FormEvent::Focus(e)) => {
            match e.kind() {
                FocusChange::Gained => l.focus_gained(e),
                FocusChange::Lost => l.focus_lost(e),
            }
            true
        }
        _ => false,
    }
}

fn dispatch_mouse(l: &EventListener, event: &FormEvent) -> bool {
    match (l.downcast::<dyn FormMouseListener>(), event) {
        (Some(l), FormEvent::Mouse(e)) => {
            match e.kind() {
                MouseAction::Pressed => l.mouse_pressed(e),
                MouseAction::Released => l.mouse_released(e),
                MouseAction::Clicked => l.mouse_clicked(e),
                MouseAction::DoubleClicked => l.mouse_double_clicked(e),
                MouseAction::Entered => l.mouse_entered(e),
                MouseAction::Exited => l.mouse_exited(e),
            }
            true
        }
        _ => false,
    }
}
