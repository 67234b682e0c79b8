//! Emitter - per-instance publish/subscribe bus.
//!
//! Every component scope gets its own emitter for intra-component and
//! parent/child signaling. The orchestrator injects it and never
//! interprets event names.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use cinder_ui::Emitter;
//!
//! let emitter = Emitter::new();
//! let handle = emitter.on("saved", |payload| {
//!     if let Some(id) = payload.and_then(|p| p.downcast_ref::<u64>().copied()) {
//!         println!("saved record {id}");
//!     }
//! });
//!
//! emitter.emit("saved", Some(Rc::new(42u64)));
//! handle.off();
//! ```

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

type HandlerCallback = Rc<dyn Fn(Option<&Rc<dyn Any>>)>;

struct HandlerEntry {
    id: u64,
    callback: HandlerCallback,
}

struct EmitterInner {
    handlers: RefCell<HashMap<String, Vec<HandlerEntry>>>,
    next_id: Cell<u64>,
}

/// A small event bus. Cloning shares the underlying handler table.
#[derive(Clone)]
pub struct Emitter {
    inner: Rc<EmitterInner>,
}

/// Detaches a handler registered with [`Emitter::on`].
pub struct EmitterHandle {
    inner: Weak<EmitterInner>,
    event: String,
    id: u64,
}

impl EmitterHandle {
    /// Remove the handler. Idempotent.
    pub fn off(&self) {
        if let Some(inner) = self.inner.upgrade() {
            if let Some(entries) = inner.handlers.borrow_mut().get_mut(&self.event) {
                entries.retain(|entry| entry.id != self.id);
            }
        }
    }
}

impl Emitter {
    /// Create an empty emitter.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(EmitterInner {
                handlers: RefCell::new(HashMap::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Register a handler for `event`. Returns a removal handle.
    pub fn on(
        &self,
        event: &str,
        handler: impl Fn(Option<&Rc<dyn Any>>) + 'static,
    ) -> EmitterHandle {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .handlers
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .push(HandlerEntry {
                id,
                callback: Rc::new(handler),
            });
        EmitterHandle {
            inner: Rc::downgrade(&self.inner),
            event: event.to_string(),
            id,
        }
    }

    /// Remove every handler for `event`.
    pub fn off(&self, event: &str) {
        self.inner.handlers.borrow_mut().remove(event);
    }

    /// Invoke all handlers for `event`, in registration order.
    pub fn emit(&self, event: &str, payload: Option<Rc<dyn Any>>) {
        let callbacks: Vec<HandlerCallback> = self
            .inner
            .handlers
            .borrow()
            .get(event)
            .map(|entries| entries.iter().map(|entry| entry.callback.clone()).collect())
            .unwrap_or_default();
        for callback in callbacks {
            callback(payload.as_ref());
        }
    }

    /// Number of handlers registered for `event`.
    pub fn handler_count(&self, event: &str) -> usize {
        self.inner
            .handlers
            .borrow()
            .get(event)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}
