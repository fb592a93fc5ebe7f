#![allow(dead_code)]

use std::sync::Arc;

use form_dispatch::prelude::*;
use parking_lot::Mutex;

pub const FLD_NAME: &str = "name";
pub const FLD_FIRST_NAME: &str = "firstName";
pub const FLD_BIRTH_DATE: &str = "birthDate";
pub const FLD_SALARY: &str = "salary";
pub const FIELDS: [&str; 4] = [FLD_NAME, FLD_FIRST_NAME, FLD_BIRTH_DATE, FLD_SALARY];

/// Handler of a plain text field; exposes no listener methods.
#[derive(Debug)]
pub struct TextField {
    pub name: String,
}

pub fn text_field(name: &str) -> ComponentHandler {
    Arc::new(TextField {
        name: name.to_string(),
    })
}

/// Records "component -> CATEGORY" for every native registration.
#[derive(Default)]
pub struct RecordingRegistrar {
    calls: Mutex<Vec<String>>,
    fail_for: Mutex<Option<String>>,
}

impl RecordingRegistrar {
    pub fn registrations(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
    pub fn sorted_registrations(&self) -> Vec<String> {
        let mut v = self.registrations();
        v.sort();
        v
    }
    pub fn fail_for(&self, name: Option<&str>) {
        *self.fail_for.lock() = name.map(str::to_string);
    }
}

impl NativeRegistrar for RecordingRegistrar {
    fn register_once(
        &self,
        name: &str,
        _handler: &ComponentHandler,
        category: ListenerCategory,
        _manager: &EventManager,
    ) -> anyhow::Result<()> {
        if self.fail_for.lock().as_deref() == Some(name) {
            anyhow::bail!("toolkit refused component {name}");
        }
        self.calls.lock().push(format!("{name} -> {}", category.name()));
        Ok(())
    }
}

pub struct Fixture {
    pub manager: EventManager,
    pub store: Arc<ComponentStore>,
    pub registrar: Arc<RecordingRegistrar>,
}

pub fn fixture() -> Fixture {
    let registrar = Arc::new(RecordingRegistrar::default());
    let manager = EventManager::new(registrar.clone());
    let store = Arc::new(ComponentStore::new());
    for name in FIELDS {
        store.add(name, text_field(name));
    }
    manager.set_component_directory(store.clone());
    Fixture {
        manager,
        store,
        registrar,
    }
}

impl Fixture {
    pub fn base(&self, name: &str) -> EventBase {
        EventBase::new(name, self.store.resolve(name).expect("component exists"))
    }
    pub fn action_event(&self, name: &str, command: &str) -> FormEvent {
        FormActionEvent::new(self.base(name), command).into()
    }
    pub fn change_event(&self, name: &str) -> FormEvent {
        FormChangeEvent::new(self.base(name)).into()
    }
    pub fn focus_event(&self, name: &str, kind: FocusChange) -> FormEvent {
        FormFocusEvent::new(self.base(name), kind).into()
    }
    pub fn mouse_event(&self, name: &str, kind: MouseAction) -> FormEvent {
        FormMouseEvent::new(
            self.base(name),
            kind,
            10,
            20,
            FormMouseEvent::BUTTON1,
            Modifiers::SHIFT | Modifiers::CONTROL,
        )
        .into()
    }
}

#[derive(Default)]
pub struct ActionRecorder {
    events: Mutex<Vec<FormActionEvent>>,
}

impl ActionRecorder {
    pub fn count(&self) -> usize {
        self.events.lock().len()
    }
    pub fn last(&self) -> Option<FormActionEvent> {
        self.events.lock().last().cloned()
    }
}

impl FormActionListener for ActionRecorder {
    fn action_performed(&self, event: &FormActionEvent) {
        self.events.lock().push(event.clone());
    }
}

#[derive(Default)]
pub struct ChangeRecorder {
    events: Mutex<Vec<FormChangeEvent>>,
}

impl ChangeRecorder {
    pub fn count(&self) -> usize {
        self.events.lock().len()
    }
}

impl FormChangeListener for ChangeRecorder {
    fn element_changed(&self, event: &FormChangeEvent) {
        self.events.lock().push(event.clone());
    }
}

#[derive(Default)]
pub struct FocusRecorder {
    gained: Mutex<Vec<FormFocusEvent>>,
    lost: Mutex<Vec<FormFocusEvent>>,
}

impl FocusRecorder {
    pub fn gained(&self) -> usize {
        self.gained.lock().len()
    }
    pub fn lost(&self) -> usize {
        self.lost.lock().len()
    }
    pub fn last_lost(&self) -> Option<FormFocusEvent> {
        self.lost.lock().last().cloned()
    }
}

impl FormFocusListener for FocusRecorder {
    fn focus_gained(&self, event: &FormFocusEvent) {
        self.gained.lock().push(event.clone());
    }
    fn focus_lost(&self, event: &FormFocusEvent) {
        self.lost.lock().push(event.clone());
    }
}

/// Records which listener method was called together with the event's own type.
#[derive(Default)]
pub struct MouseRecorder {
    calls: Mutex<Vec<(MouseAction, FormMouseEvent)>>,
}

impl MouseRecorder {
    pub fn calls(&self) -> Vec<(MouseAction, FormMouseEvent)> {
        self.calls.lock().clone()
    }
    fn record(&self, method: MouseAction, event: &FormMouseEvent) {
        self.calls.lock().push((method, event.clone()));
    }
}

impl FormMouseListener for MouseRecorder {
    fn mouse_pressed(&self, event: &FormMouseEvent) {
        self.record(MouseAction::Pressed, event);
    }
    fn mouse_released(&self, event: &FormMouseEvent) {
        self.record(MouseAction::Released, event);
    }
    fn mouse_clicked(&self, event: &FormMouseEvent) {
        self.record(MouseAction::Clicked, event);
    }
    fn mouse_double_clicked(&self, event: &FormMouseEvent) {
        self.record(MouseAction::DoubleClicked, event);
    }
    fn mouse_entered(&self, event: &FormMouseEvent) {
        self.record(MouseAction::Entered, event);
    }
    fn mouse_exited(&self, event: &FormMouseEvent) {
        self.record(MouseAction::Exited, event);
    }
}
