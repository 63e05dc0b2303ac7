//! Single-Flight Module
//!
//! Coalesces concurrent requests for the same key into one execution.

use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::broadcast;

// == Abandoned Error ==
/// Returned to waiters when the executing caller went away before producing
/// a result (cancelled or panicked).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("in-flight call abandoned before completing")]
pub struct Abandoned;

type CallMap<T> = Mutex<HashMap<String, broadcast::Sender<T>>>;

// == Flight Group ==
/// Per-key request coalescer.
///
/// The first caller for a key becomes the leader and runs the work closure;
/// callers arriving while the leader is in flight wait and receive a clone
/// of the leader's result. The in-flight record is removed before waiters
/// are woken, so a caller arriving after completion starts a fresh
/// execution. Results are not cached here.
///
/// The work closure must not re-enter `run` with the same key.
pub struct FlightGroup<T: Clone> {
    /// In-flight calls by key; the registry lock is never held while the
    /// work closure executes.
    calls: CallMap<T>,
}

impl<T: Clone> Default for FlightGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FlightGroup<T> {
    // == Constructor ==
    /// Creates an empty flight group.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    // == Run ==
    /// Executes `work` for `key`, coalescing with any in-flight execution.
    ///
    /// Returns the (possibly shared) result, or [`Abandoned`] if the leader
    /// disappeared before completing.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> Result<T, Abandoned>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        // Register or subscribe under the lock, then release it before any
        // awaiting happens.
        let follower = {
            let mut calls = self.calls.lock();
            match calls.get(key) {
                Some(tx) => Some(tx.subscribe()),
                None => {
                    let (tx, _rx) = broadcast::channel(1);
                    calls.insert(key.to_string(), tx);
                    None
                }
            }
        };

        if let Some(mut rx) = follower {
            // The sender lives in the map until the leader removes it, so a
            // closed channel means the leader never finished.
            return rx.recv().await.map_err(|_| Abandoned);
        }

        // Leader path. The guard releases the key if this future is dropped
        // mid-flight, which closes the channel and wakes every waiter.
        let guard = FlightGuard {
            calls: &self.calls,
            key,
            armed: true,
        };

        let value = work().await;

        // Delete the record first so the next arrival schedules a fresh
        // execution, then wake everyone who subscribed while in flight.
        if let Some(tx) = guard.complete() {
            let _ = tx.send(value.clone());
        }
        Ok(value)
    }
}

impl<T: Clone> std::fmt::Debug for FlightGroup<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlightGroup")
            .field("in_flight", &self.calls.lock().len())
            .finish()
    }
}

// == Flight Guard ==
/// Removes the in-flight record when the leader is dropped without
/// completing.
struct FlightGuard<'a, T> {
    calls: &'a CallMap<T>,
    key: &'a str,
    armed: bool,
}

impl<T> FlightGuard<'_, T> {
    /// Removes and returns the record on normal completion.
    fn complete(mut self) -> Option<broadcast::Sender<T>> {
        self.armed = false;
        self.calls.lock().remove(self.key)
    }
}

impl<T> Drop for FlightGuard<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            self.calls.lock().remove(self.key);
        }
    }
}
