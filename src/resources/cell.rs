//! Cancellation-safe async state shared by every resource.
//!
//! A `ResourceCell` owns a resource's trigger inputs and its last loaded
//! value. Every fetch takes a `FetchTicket` when it begins; its result is
//! applied only if no later fetch has begun since. Inputs and the
//! generation counter sit behind one lock, so ticket order always matches
//! input order even when setters race from different tasks.
//!
//! The lock is never held across an `.await`: callers `begin`, await the
//! request without the lock, then `settle`.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::api::{error_message, ApiError};

/// What a view sees of a resource at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSnapshot<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<String>,
}

/// Identifies one fetch. Only the newest ticket may write state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

struct CellState<Q, T> {
    inputs: Q,
    snapshot: ResourceSnapshot<T>,
    generation: u64,
}

pub struct ResourceCell<Q, T> {
    name: &'static str,
    fallback_error: &'static str,
    state: Arc<Mutex<CellState<Q, T>>>,
}

impl<Q, T> Clone for ResourceCell<Q, T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            fallback_error: self.fallback_error,
            state: Arc::clone(&self.state),
        }
    }
}

impl<Q: Clone + PartialEq, T: Clone> ResourceCell<Q, T> {
    /// `fallback_error` is shown when a failure carries no message of its own.
    pub fn new(name: &'static str, fallback_error: &'static str, inputs: Q, initial: T) -> Self {
        Self {
            name,
            fallback_error,
            state: Arc::new(Mutex::new(CellState {
                inputs,
                snapshot: ResourceSnapshot {
                    data: initial,
                    loading: false,
                    error: None,
                },
                generation: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CellState<Q, T>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn snapshot(&self) -> ResourceSnapshot<T> {
        self.lock().snapshot.clone()
    }

    pub fn inputs(&self) -> Q {
        self.lock().inputs.clone()
    }

    /// Begin a fetch with the current inputs.
    pub fn begin(&self) -> (FetchTicket, Q) {
        let mut state = self.lock();
        let ticket = Self::start(&mut state);
        (ticket, state.inputs.clone())
    }

    /// Like `begin`, but does nothing while `idle` holds for the inputs.
    pub fn begin_unless<F>(&self, idle: F) -> Option<(FetchTicket, Q)>
    where
        F: FnOnce(&Q) -> bool,
    {
        let mut state = self.lock();
        if idle(&state.inputs) {
            return None;
        }
        let ticket = Self::start(&mut state);
        Some((ticket, state.inputs.clone()))
    }

    /// Apply `change` to the inputs and begin a fetch if they actually changed.
    pub fn update<F>(&self, change: F) -> Option<(FetchTicket, Q)>
    where
        F: FnOnce(&mut Q),
    {
        let mut state = self.lock();
        let mut next = state.inputs.clone();
        change(&mut next);
        if next == state.inputs {
            return None;
        }
        state.inputs = next.clone();
        Some((Self::start(&mut state), next))
    }

    /// Change the inputs without fetching. Any in-flight fetch is orphaned
    /// and `loading` is cleared; loaded data stays as it was.
    pub fn update_idle<F>(&self, change: F) -> bool
    where
        F: FnOnce(&mut Q),
    {
        let mut state = self.lock();
        let mut next = state.inputs.clone();
        change(&mut next);
        if next == state.inputs {
            return false;
        }
        state.inputs = next;
        state.generation += 1;
        state.snapshot.loading = false;
        true
    }

    fn start(state: &mut CellState<Q, T>) -> FetchTicket {
        state.generation += 1;
        state.snapshot.loading = true;
        state.snapshot.error = None;
        FetchTicket(state.generation)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.lock().generation == ticket.0
    }

    /// Apply a fetch result if `ticket` is still the newest.
    ///
    /// On failure the previous data is kept and only the error is set.
    /// Returns whether the result was applied.
    pub fn settle(&self, ticket: FetchTicket, result: Result<T, ApiError>) -> bool {
        let mut state = self.lock();
        if state.generation != ticket.0 {
            tracing::debug!(
                resource = self.name,
                ticket = ticket.0,
                current = state.generation,
                "Discarding stale result"
            );
            return false;
        }

        match result {
            Ok(data) => {
                state.snapshot.data = data;
                state.snapshot.error = None;
            }
            Err(err) => {
                tracing::warn!(resource = self.name, error = %err, "Fetch failed");
                state.snapshot.error = Some(error_message(&err, self.fallback_error));
            }
        }
        state.snapshot.loading = false;
        true
    }
}
