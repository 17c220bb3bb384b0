//! Passive event observation.
//!
//! Observers are notified after an event's reactive window (and any nested
//! events it produced) has fully resolved, so they always see a settled
//! state. Observer order is subscription order.

use crate::core::DuelState;
use crate::events::GameEvent;

/// Maximum nesting depth of event dispatch. Events raised while resolving a
/// reactive spell dispatch recursively; exceeding this bound aborts the
/// match as an internal error rather than looping forever.
pub const MAX_EVENT_DEPTH: usize = 16;

/// A passive listener. Observers may not mutate the duel.
pub trait EventObserver {
    fn on_event(&mut self, event: &GameEvent, state: &DuelState);
}

/// Registry of passive observers.
#[derive(Default)]
pub struct EventBus {
    observers: Vec<Box<dyn EventObserver>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn EventObserver>) {
        self.observers.push(observer);
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn notify(&mut self, event: &GameEvent, state: &DuelState) {
        tracing::trace!(kind = %event.kind, player = %event.player, "event");
        for observer in &mut self.observers {
            observer.on_event(event, state);
        }
    }
}
