//! Completion events between scheduler lanes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};

/// A lane stopped waiting because another lane failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Aborted;

/// Signals "phase finished iteration k" from one lane to the others.
///
/// Iterations complete in order, so the event only stores how many have
/// completed. `wait(k)` returns once `record(k)` has happened.
#[derive(Debug, Default)]
pub(crate) struct CompletionEvent {
    completed: Mutex<usize>,
    signal: Condvar,
}

impl CompletionEvent {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Mark iteration `k` complete and wake every waiter.
    pub(crate) fn record(&self, k: usize) {
        let mut completed = self
            .completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        debug_assert_eq!(*completed, k, "iterations must complete in order");
        *completed = k + 1;
        self.signal.notify_all();
    }

    /// Block until iteration `k` is complete or the graph is aborted.
    pub(crate) fn wait(&self, k: usize, abort: &AtomicBool) -> Result<(), Aborted> {
        let mut completed = self
            .completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while *completed <= k {
            if abort.load(Ordering::Acquire) {
                return Err(Aborted);
            }
            completed = self
                .signal
                .wait(completed)
                .unwrap_or_else(PoisonError::into_inner);
        }
        Ok(())
    }

    /// Wake waiters so they can observe the abort flag.
    fn interrupt(&self) {
        let _guard = self
            .completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.signal.notify_all();
    }
}

/// The four per-phase events of one solve.
#[derive(Debug, Default)]
pub(crate) struct PhaseEvents {
    pub(crate) pivot_done: CompletionEvent,
    pub(crate) row_done: CompletionEvent,
    pub(crate) col_done: CompletionEvent,
    pub(crate) remainder_done: CompletionEvent,
    aborted: AtomicBool,
}

impl PhaseEvents {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn abort_flag(&self) -> &AtomicBool {
        &self.aborted
    }

    /// Release every waiting lane.
    pub(crate) fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
        for event in [
            &self.pivot_done,
            &self.row_done,
            &self.col_done,
            &self.remainder_done,
        ] {
            event.interrupt();
        }
    }

    /// Guard that aborts the graph if the owning lane unwinds.
    pub(crate) fn abort_on_panic(&self) -> AbortOnPanic<'_> {
        AbortOnPanic { events: self }
    }
}

pub(crate) struct AbortOnPanic<'a> {
    events: &'a PhaseEvents,
}

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.events.abort();
        }
    }
}
