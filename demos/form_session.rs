//! A small form session: a fake toolkit bridge feeds raw clicks and focus
//! changes into the dispatch core from a background thread.
use std::{sync::Arc, thread};

use form_dispatch::{config::ManagerConfig, prelude::*};
use parking_lot::Mutex;

struct Button {
    label: &'static str,
}

/// Pretends to be the native layer: remembers which (component, category)
/// pairs it was asked to hook up and later emits events only for those.
#[derive(Default)]
struct ToolkitBridge {
    hooked: Mutex<Vec<(String, ComponentHandler, ListenerCategory)>>,
    // weak: the manager owns this bridge as its registrar
    manager: Mutex<WeakEventManager>,
}

impl NativeRegistrar for ToolkitBridge {
    fn register_once(
        &self,
        name: &str,
        handler: &ComponentHandler,
        category: ListenerCategory,
        manager: &EventManager,
    ) -> anyhow::Result<()> {
        self.hooked.lock().push((name.to_string(), handler.clone(), category));
        *self.manager.lock() = manager.downgrade();
        Ok(())
    }
}

impl ToolkitBridge {
    fn simulate(&self) -> Result<()> {
        let Some(manager) = self.manager.lock().upgrade() else { return Ok(()) };
        let hooked = self.hooked.lock().clone();
        for (name, handler, category) in hooked {
            let base = EventBase::new(name.as_str(), handler);
            let event: FormEvent = match category {
                ListenerCategory::Action => {
                    FormActionEvent::new(base, format!("{name}:pressed")).into()
                }
                ListenerCategory::Change => FormChangeEvent::new(base).into(),
                ListenerCategory::Focus => FormFocusEvent::new(base, FocusChange::Gained).into(),
                ListenerCategory::Mouse => FormMouseEvent::new(
                    base,
                    MouseAction::DoubleClicked,
                    4,
                    2,
                    FormMouseEvent::BUTTON1,
                    Modifiers::empty(),
                )
                .into(),
            };
            manager.fire(&event, category)?;
        }
        Ok(())
    }
}

struct Logger;

impl FormActionListener for Logger {
    fn action_performed(&self, event: &FormActionEvent) {
        let label = event
            .handler()
            .downcast_ref::<Button>()
            .map_or("?", |b| b.label);
        tracing::info!(component = %event.name(), label, command = %event.command(), "action");
    }
}

impl FormFocusListener for Logger {
    fn focus_gained(&self, event: &FormFocusEvent) {
        tracing::info!(component = %event.name(), "focus gained");
    }
    fn focus_lost(&self, event: &FormFocusEvent) {
        tracing::info!(component = %event.name(), "focus lost");
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let bridge = Arc::new(ToolkitBridge::default());
    let cfg = ManagerConfig::from_json_str(r#"{ "session": "demo-form" }"#)?;
    let manager = EventManager::with_config(bridge.clone(), cfg);

    let store = Arc::new(ComponentStore::new());
    store.add("btnOk", Arc::new(Button { label: "OK" }));
    store.add("btnCancel", Arc::new(Button { label: "Cancel" }));
    manager.set_component_directory(store.clone());

    let logger = Arc::new(Logger);
    manager.add_action_listener_all(logger.clone())?;
    manager.add_focus_listener("btnOk", logger.clone())?;
    // same pair again: no second native registration
    manager.add_action_listener("btnOk", logger)?;

    let worker = {
        let bridge = bridge.clone();
        thread::spawn(move || bridge.simulate())
    };
    worker
        .join()
        .map_err(|_| anyhow::anyhow!("toolkit thread panicked"))??;
    Ok(())
}
