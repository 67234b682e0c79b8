//! Microtask scheduler - single-turn deferred jobs.
//!
//! The runtime is single-threaded and cooperative; there is no host event
//! loop to hand microtasks to. Instead the checkpoint is explicit: signal
//! writes enqueue flush jobs here, and [`flush`] drains the queue. Jobs
//! enqueued while a flush is draining run in the same drain, which gives
//! the queue microtask semantics - a watcher that writes another signal
//! sees that write's flush happen before control returns to the caller
//! of [`flush`].
//!
//! Call [`flush`] from the top of the event loop (or directly in tests),
//! not from inside a future driven by `block_on` - the drain may start
//! re-renders that need the local executor.

use std::cell::RefCell;
use std::collections::VecDeque;

thread_local! {
    /// Pending flush jobs, in scheduling order.
    static QUEUE: RefCell<VecDeque<Box<dyn FnOnce()>>> = RefCell::new(VecDeque::new());
}

/// Enqueue a job for the next flush checkpoint.
pub fn schedule(job: impl FnOnce() + 'static) {
    QUEUE.with(|queue| queue.borrow_mut().push_back(Box::new(job)));
}

/// Drain the queue until it is empty.
///
/// Jobs scheduled by running jobs are processed in the same drain.
pub fn flush() {
    loop {
        let job = QUEUE.with(|queue| queue.borrow_mut().pop_front());
        match job {
            Some(job) => job(),
            None => break,
        }
    }
}

/// Number of jobs currently waiting for a flush.
pub fn pending_jobs() -> usize {
    QUEUE.with(|queue| queue.borrow().len())
}
