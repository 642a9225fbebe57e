use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::event::{EventHandler, HandlerId, PluginEvent, PluginEventType};
use crate::utils::panic_message;

#[derive(Default)]
struct BusState {
    handlers: HashMap<PluginEventType, Vec<(HandlerId, EventHandler)>>,
    next_handler_id: HandlerId,
}

impl BusState {
    fn remove(&mut self, event_type: PluginEventType, id: HandlerId) -> bool {
        match self.handlers.get_mut(&event_type) {
            Some(handlers) => {
                let len_before = handlers.len();
                handlers.retain(|(h_id, _)| *h_id != id);
                handlers.len() < len_before
            }
            None => false,
        }
    }
}

fn lock(state: &Mutex<BusState>) -> MutexGuard<'_, BusState> {
    // Handler sets are plain data; a panic elsewhere cannot leave them half-written.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-event-type publish/subscribe bus.
///
/// Cloning yields another handle onto the same subscriber sets.
#[derive(Clone, Default)]
pub struct EventBus {
    state: Arc<Mutex<BusState>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.state);
        let handler_count: usize = state.handlers.values().map(|v| v.len()).sum();
        f.debug_struct("EventBus")
            .field("handler_count", &handler_count)
            .field("next_handler_id", &state.next_handler_id)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to events of `event_type`.
    pub fn on<F>(&self, event_type: PluginEventType, handler: F) -> Subscription
    where
        F: Fn(&PluginEvent) + Send + Sync + 'static,
    {
        let mut state = lock(&self.state);
        state.next_handler_id += 1;
        let id = state.next_handler_id;
        state.handlers.entry(event_type).or_default().push((id, Arc::new(handler)));
        Subscription {
            id,
            event_type,
            bus: Arc::downgrade(&self.state),
        }
    }

    /// Deliver `event` to every current subscriber of its type, in subscription order.
    ///
    /// The subscriber set is snapshotted before delivery, so handlers may
    /// subscribe, unsubscribe or emit without affecting this pass. A panicking
    /// handler is logged and skipped. Returns the number of handlers invoked.
    pub fn emit(&self, event: &PluginEvent) -> usize {
        let snapshot: Vec<(HandlerId, EventHandler)> = {
            let state = lock(&self.state);
            state.handlers.get(&event.event_type).cloned().unwrap_or_default()
        };

        for (id, handler) in &snapshot {
            let result = panic::catch_unwind(AssertUnwindSafe(|| handler(event)));
            if let Err(panic_obj) = result {
                log::error!(
                    "Handler {} for '{}' (plugin '{}') panicked: {}",
                    id,
                    event.event_type,
                    event.plugin_name,
                    panic_message(panic_obj.as_ref())
                );
            }
        }
        snapshot.len()
    }

    pub fn handler_count(&self, event_type: PluginEventType) -> usize {
        lock(&self.state).handlers.get(&event_type).map_or(0, Vec::len)
    }

    /// Drop every subscriber.
    pub fn clear(&self) {
        lock(&self.state).handlers.clear();
    }
}

/// Handle returned by [`EventBus::on`]; dropping it keeps the subscription alive.
#[derive(Debug)]
pub struct Subscription {
    id: HandlerId,
    event_type: PluginEventType,
    bus: Weak<Mutex<BusState>>,
}

impl Subscription {
    pub fn id(&self) -> HandlerId {
        self.id
    }

    pub fn event_type(&self) -> PluginEventType {
        self.event_type
    }

    /// Remove the handler. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        match self.bus.upgrade() {
            Some(state) => lock(&state).remove(self.event_type, self.id),
            None => false,
        }
    }
}
