//! Event dispatch and handler composition
//!
//! A minimal event model for behaviors that intercept target events (focus,
//! blur) and forward them to caller handlers.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Event type identifier
pub type EventType = u32;

/// Common event types
pub mod event_types {
    use super::EventType;

    pub const FOCUS: EventType = 10;
    pub const BLUR: EventType = 11;
}

/// A UI event routed to one target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    pub event_type: EventType,
    pub target: u64, // Target ID
}

impl Event {
    pub fn new(event_type: EventType, target: u64) -> Self {
        Self { event_type, target }
    }

    pub fn focus(target: u64) -> Self {
        Self::new(event_types::FOCUS, target)
    }

    pub fn blur(target: u64) -> Self {
        Self::new(event_types::BLUR, target)
    }
}

/// Event handler function type
pub type EventHandler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Chain two optional handlers so both see the same event
///
/// `first` runs before `second`. Absent handlers are skipped; composing two
/// absent handlers yields `None`.
pub fn compose(first: Option<EventHandler>, second: Option<EventHandler>) -> Option<EventHandler> {
    match (first, second) {
        (Some(first), Some(second)) => Some(Arc::new(move |event: &Event| {
            first(event);
            second(event);
        })),
        (Some(only), None) | (None, Some(only)) => Some(only),
        (None, None) => None,
    }
}

/// Dispatches events to registered handlers
pub struct EventDispatcher {
    handlers: FxHashMap<(u64, EventType), SmallVec<[EventHandler; 2]>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }

    /// Register an event handler for a target and event type
    pub fn register<F>(&mut self, target: u64, event_type: EventType, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.register_handler(target, event_type, Arc::new(handler));
    }

    /// Register an already shared handler
    pub fn register_handler(&mut self, target: u64, event_type: EventType, handler: EventHandler) {
        self.handlers
            .entry((target, event_type))
            .or_default()
            .push(handler);
    }

    /// Drop every handler registered for a target
    pub fn unregister(&mut self, target: u64) {
        self.handlers.retain(|(id, _), _| *id != target);
    }

    /// Dispatch an event to the handlers of its target, in registration order
    pub fn dispatch(&self, event: &Event) {
        if let Some(handlers) = self.handlers.get(&(event.target, event.event_type)) {
            for handler in handlers {
                handler(event);
            }
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
