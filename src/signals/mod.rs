//! Reactive primitives - signal cells and microtask batching.
//!
//! A [`Signal`] holds a value and notifies watchers when it changes.
//! Notifications are not delivered synchronously: a write schedules a
//! single flush job on the thread-local [`scheduler`], and all watcher
//! invocations happen at the next [`flush`] checkpoint. Any number of
//! writes before that checkpoint coalesce into one notification carrying
//! the final value.
//!
//! This batching is the single most important performance property of the
//! reactivity layer: several synchronous mutations inside one event
//! handler trigger one re-render, not several.

pub mod scheduler;
pub mod signal;

pub use scheduler::{flush, pending_jobs, schedule};
pub use signal::{signal, Signal, Unsubscribe, Watchable};
