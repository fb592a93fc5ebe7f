pub mod capability;
pub mod category;
pub mod config;
pub mod directory;
pub mod error;
pub mod event;
pub mod listener;
pub mod manager;

// lets `#[listener_methods]` expansions refer to `::form_dispatch` inside this crate too
extern crate self as form_dispatch;

pub mod prelude {
    pub use crate::category::ListenerCategory;
    pub use crate::directory::{
        ComponentDirectory, ComponentHandler, ComponentStore, NativeRegistrar,
    };
    pub use crate::error::{DispatchError, Result};
    pub use crate::event::{
        EventBase, FocusChange, FormActionEvent, FormChangeEvent, FormEvent, FormFocusEvent,
        FormMouseEvent, Modifiers, MouseAction,
    };
    pub use crate::listener::{
        EventListener, FormActionListener, FormChangeListener, FormFocusListener,
        FormMouseListener,
    };
    pub use crate::manager::{EventManager, WeakEventManager};
}

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}

pub use form_dispatch_macros::listener_methods;
