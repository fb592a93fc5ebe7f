mod common;

use std::sync::{Arc, Weak};

use common::*;
use form_dispatch::prelude::*;
use parking_lot::Mutex;

/// Adds another listener to the same component the first time it is invoked.
struct AddingListener {
    manager: EventManager,
    to_add: Mutex<Option<Arc<ActionRecorder>>>,
    count: Mutex<usize>,
}

impl FormActionListener for AddingListener {
    fn action_performed(&self, event: &FormActionEvent) {
        *self.count.lock() += 1;
        if let Some(l) = self.to_add.lock().take() {
            self.manager
                .add_action_listener(event.name(), l)
                .expect("add from callback");
        }
    }
}

/// Removes itself when invoked.
struct SelfRemovingListener {
    manager: EventManager,
    me: Weak<SelfRemovingListener>,
    count: Mutex<usize>,
}

impl FormActionListener for SelfRemovingListener {
    fn action_performed(&self, event: &FormActionEvent) {
        *self.count.lock() += 1;
        if let Some(me) = self.me.upgrade() {
            assert!(self.manager.remove_action_listener(event.name(), me));
        }
    }
}

/// Removes a different listener when invoked.
struct RemovingOtherListener {
    manager: EventManager,
    victim: Arc<ActionRecorder>,
}

impl FormActionListener for RemovingOtherListener {
    fn action_performed(&self, event: &FormActionEvent) {
        self.manager.remove_action_listener(event.name(), self.victim.clone());
    }
}

#[test]
fn listener_added_during_delivery_misses_current_event() {
    let f = fixture();
    let added = Arc::new(ActionRecorder::default());
    let adder = Arc::new(AddingListener {
        manager: f.manager.clone(),
        to_add: Mutex::new(Some(added.clone())),
        count: Mutex::new(0),
    });
    f.manager.add_action_listener(FLD_NAME, adder.clone()).expect("add");
    let ev = f.action_event(FLD_NAME, "cmd");

    f.manager.fire(&ev, ListenerCategory::Action).expect("fire");
    assert_eq!(*adder.count.lock(), 1);
    assert_eq!(added.count(), 0);
    assert_eq!(f.registrar.registrations(), vec!["name -> ACTION"]);

    f.manager.fire(&ev, ListenerCategory::Action).expect("fire");
    assert_eq!(*adder.count.lock(), 2);
    assert_eq!(added.count(), 1);
}

#[test]
fn listener_removing_itself_gets_current_event_only() {
    let f = fixture();
    let remover = Arc::new_cyclic(|me| SelfRemovingListener {
        manager: f.manager.clone(),
        me: me.clone(),
        count: Mutex::new(0),
    });
    let other = Arc::new(ActionRecorder::default());
    f.manager.add_action_listener(FLD_NAME, remover.clone()).expect("add");
    f.manager.add_action_listener(FLD_NAME, other.clone()).expect("add");
    let ev = f.action_event(FLD_NAME, "cmd");

    f.manager.fire(&ev, ListenerCategory::Action).expect("fire");
    assert_eq!(*remover.count.lock(), 1);
    assert_eq!(other.count(), 1);

    f.manager.fire(&ev, ListenerCategory::Action).expect("fire");
    assert_eq!(*remover.count.lock(), 1);
    assert_eq!(other.count(), 2);
    assert_eq!(f.manager.listener_count(ListenerCategory::Action, Some(FLD_NAME)), 1);
    assert_eq!(f.registrar.registrations(), vec!["name -> ACTION"]);
}

#[test]
fn listener_removed_by_another_still_gets_current_event() {
    let f = fixture();
    let victim = Arc::new(ActionRecorder::default());
    let remover = Arc::new(RemovingOtherListener {
        manager: f.manager.clone(),
        victim: victim.clone(),
    });
    // named listeners are delivered before wildcard ones
    f.manager.add_action_listener(FLD_NAME, remover).expect("add");
    f.manager.add_action_listener_all(victim.clone()).expect("add");
    f.manager.add_action_listener(FLD_NAME, victim.clone()).expect("add");
    let ev = f.action_event(FLD_NAME, "cmd");

    f.manager.fire(&ev, ListenerCategory::Action).expect("fire");
    assert_eq!(victim.count(), 2);

    // only the named binding was removed
    f.manager.fire(&ev, ListenerCategory::Action).expect("fire");
    assert_eq!(victim.count(), 3);
}

#[test]
fn wildcard_listener_may_register_named_listener_during_delivery() {
    let f = fixture();
    let added = Arc::new(ActionRecorder::default());
    let adder = Arc::new(AddingListener {
        manager: f.manager.clone(),
        to_add: Mutex::new(Some(added.clone())),
        count: Mutex::new(0),
    });
    f.manager.add_action_listener_all(adder.clone()).expect("add all");
    let ev = f.action_event(FLD_SALARY, "cmd");
    f.manager.fire(&ev, ListenerCategory::Action).expect("fire");
    assert_eq!(added.count(), 0);
    f.manager.fire(&ev, ListenerCategory::Action).expect("fire");
    assert_eq!(added.count(), 1);
    assert_eq!(*adder.count.lock(), 2);
}

/// Native bridge that reports the current state of `echo` as soon as any
/// component gets its change hook, before `register_once` returns.
struct EchoingRegistrar {
    calls: RecordingRegistrar,
    echo: &'static str,
}

impl NativeRegistrar for EchoingRegistrar {
    fn register_once(
        &self,
        name: &str,
        handler: &ComponentHandler,
        category: ListenerCategory,
        manager: &EventManager,
    ) -> anyhow::Result<()> {
        self.calls.register_once(name, handler, category, manager)?;
        if category == ListenerCategory::Change {
            if let Some(echo) = manager.component_handler(self.echo)? {
                let event = FormChangeEvent::new(EventBase::new(self.echo, echo));
                manager.fire(&event.into(), ListenerCategory::Change)?;
            }
        }
        Ok(())
    }
}

/// Binds more listeners whenever it is told about a change.
struct BindingListener {
    manager: EventManager,
    action: Arc<ActionRecorder>,
    change: Arc<ChangeRecorder>,
    errors: Mutex<Vec<String>>,
}

impl FormChangeListener for BindingListener {
    fn element_changed(&self, _event: &FormChangeEvent) {
        // a pair nobody registers right now
        if let Err(e) = self.manager.add_action_listener(FLD_SALARY, self.action.clone()) {
            self.errors.lock().push(e.to_string());
        }
        // the pair currently being registered on this thread
        if let Err(e) = self.manager.add_change_listener(FLD_FIRST_NAME, self.change.clone()) {
            self.errors.lock().push(e.to_string());
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn listener_notified_during_native_registration_may_bind_listeners() {
    let registrar = Arc::new(EchoingRegistrar {
        calls: RecordingRegistrar::default(),
        echo: FLD_NAME,
    });
    let manager = EventManager::new(registrar.clone());
    let store = Arc::new(ComponentStore::new());
    for name in FIELDS {
        store.add(name, text_field(name));
    }
    manager.set_component_directory(store);

    let binder = Arc::new(BindingListener {
        manager: manager.clone(),
        action: Arc::new(ActionRecorder::default()),
        change: Arc::new(ChangeRecorder::default()),
        errors: Mutex::new(Vec::new()),
    });
    manager.add_change_listener(FLD_NAME, binder.clone()).expect("add binder");

    let worker = {
        let manager = manager.clone();
        tokio::task::spawn_blocking(move || {
            manager.add_change_listener(FLD_FIRST_NAME, Arc::new(ChangeRecorder::default()))
        })
    };
    tokio::time::timeout(std::time::Duration::from_secs(5), worker)
        .await
        .expect("native registration deadlocked")
        .expect("worker thread panicked")
        .expect("add first name listener");

    let errors = binder.errors.lock().clone();
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        registrar.calls.registrations(),
        vec!["name -> CHANGE", "firstName -> CHANGE", "salary -> ACTION"]
    );
    assert_eq!(manager.listener_count(ListenerCategory::Change, Some(FLD_FIRST_NAME)), 2);
    assert_eq!(manager.listener_count(ListenerCategory::Action, Some(FLD_SALARY)), 1);

    // later adds for the same pairs stay silent towards the toolkit
    manager.add_change_listener(FLD_FIRST_NAME, binder.change.clone()).expect("add again");
    assert_eq!(registrar.calls.registrations().len(), 3);
}
