//! Signal - reactive value cell with batched change notification.
//!
//! Reading a signal never has side effects. Writing stores the value
//! immediately but defers watcher notification to the next scheduler
//! flush; writes in between coalesce, so watchers only ever observe the
//! final value of a turn.
//!
//! # Example
//!
//! ```ignore
//! use cinder_ui::signals::{signal, flush};
//!
//! let count = signal(0);
//! let unsub = count.watch(|value| println!("count is now {value}"));
//!
//! count.set(1);
//! count.set(2);
//! flush(); // prints "count is now 2" exactly once
//!
//! unsub.unsubscribe();
//! ```

use std::cell::{Cell, RefCell};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use super::scheduler;

// =============================================================================
// Signal
// =============================================================================

struct WatcherEntry<T> {
    id: u64,
    callback: Rc<dyn Fn(&T)>,
}

struct SignalInner<T> {
    value: RefCell<T>,
    watchers: RefCell<Vec<WatcherEntry<T>>>,
    next_watcher_id: Cell<u64>,
    /// True while a flush job for this signal is queued.
    pending: Cell<bool>,
}

/// A reactive single-value container.
///
/// Cloning a `Signal` shares the underlying cell - both handles read and
/// write the same value, which is how a parent shares reactive state with
/// a child component.
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

/// Create a new signal holding `value`.
///
/// Free-function form of [`Signal::new`], matching the factory exposed to
/// component setup scopes.
pub fn signal<T: Clone + 'static>(value: T) -> Signal<T> {
    Signal::new(value)
}

impl<T: Clone + 'static> Signal<T> {
    /// Create a new signal holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                value: RefCell::new(value),
                watchers: RefCell::new(Vec::new()),
                next_watcher_id: Cell::new(0),
                pending: Cell::new(false),
            }),
        }
    }

    /// Get the current value. No side effects.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Store a new value and schedule a notification flush.
    ///
    /// The value is stored unconditionally: watchers are notified even
    /// when the new value equals the old one. This keeps the write path
    /// free of `PartialEq` requirements; redundant flushes are cheap
    /// because the renderer's equality fast paths skip untouched DOM.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.schedule_flush();
    }

    /// Update the value from the current one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.inner.value.borrow());
        self.set(next);
    }

    /// Register a watcher. Returns an [`Unsubscribe`] guard.
    ///
    /// Watchers fire in registration order at each flush, receiving the
    /// then-current value. A watcher that panics is reported and skipped;
    /// the rest of the flush still runs.
    pub fn watch(&self, callback: impl Fn(&T) + 'static) -> Unsubscribe {
        let id = self.inner.next_watcher_id.get();
        self.inner.next_watcher_id.set(id + 1);
        self.inner.watchers.borrow_mut().push(WatcherEntry {
            id,
            callback: Rc::new(callback),
        });

        let weak = Rc::downgrade(&self.inner);
        Unsubscribe::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.watchers.borrow_mut().retain(|entry| entry.id != id);
            }
        })
    }

    /// Number of registered watchers.
    pub fn watcher_count(&self) -> usize {
        self.inner.watchers.borrow().len()
    }

    /// Queue one flush job for this signal unless one is already pending.
    fn schedule_flush(&self) {
        if self.inner.pending.replace(true) {
            return;
        }
        let weak: Weak<SignalInner<T>> = Rc::downgrade(&self.inner);
        scheduler::schedule(move || {
            let Some(inner) = weak.upgrade() else { return };
            // Clear before invoking watchers: a write performed by a
            // watcher schedules a fresh job in the same drain.
            inner.pending.set(false);
            let value = inner.value.borrow().clone();
            let callbacks: Vec<Rc<dyn Fn(&T)>> = inner
                .watchers
                .borrow()
                .iter()
                .map(|entry| entry.callback.clone())
                .collect();
            for callback in callbacks {
                if catch_unwind(AssertUnwindSafe(|| callback(&value))).is_err() {
                    tracing::error!("signal watcher panicked; continuing flush");
                }
            }
        });
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + std::fmt::Debug + 'static> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("value", &self.get())
            .field("watchers", &self.watcher_count())
            .finish()
    }
}

// =============================================================================
// Unsubscribe
// =============================================================================

/// Detaches a watcher when consumed.
///
/// Dropping the guard without calling [`Unsubscribe::unsubscribe`] keeps
/// the watcher attached - detachment is an explicit act, the same
/// convention as the cleanup functions components return.
pub struct Unsubscribe {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Unsubscribe {
    fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Detach the watcher. Safe to call once; the guard is consumed.
    pub fn unsubscribe(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

// =============================================================================
// Watchable - type-erased watch surface
// =============================================================================

/// Type-erased subscription surface for signals of any value type.
///
/// The mount orchestrator watches every signal a scope exposes without
/// knowing their value types; it only needs "something changed".
pub trait Watchable {
    /// Register a change callback; the value itself is not delivered.
    fn watch_change(&self, callback: Rc<dyn Fn()>) -> Unsubscribe;
}

impl<T: Clone + 'static> Watchable for Signal<T> {
    fn watch_change(&self, callback: Rc<dyn Fn()>) -> Unsubscribe {
        self.watch(move |_| callback())
    }
}

// =============================================================================
// Tests
// =============================================================================
