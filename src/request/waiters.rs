use super::Waiter;
use core::fmt;
use std::sync::Arc;

/// The set of [`Waiter`]s registered with a single request.
///
/// A `WaiterSet` does no synchronization of its own. It is meant to live
/// inside the same lock as the request's state, so that checking for
/// completion and registering a waiter happen in one critical section (see
/// the [`Request`](super::Request) contract).
///
/// Waiters are identified by the switch they point to, not by value: adding
/// the same [`Waiter`] twice registers it once.
///
/// Most requests are waited on by a single `wait_any` call at a time, so the
/// set is a small vector rather than a hash set.
#[derive(Default)]
pub struct WaiterSet {
    waiters: Vec<Waiter>,
}

impl WaiterSet {
    /// Returns a new, empty `WaiterSet`. This does not allocate.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            waiters: Vec::new(),
        }
    }

    /// Adds `waiter` to the set.
    ///
    /// Returns `false` if it was already present.
    pub fn insert(&mut self, waiter: &Waiter) -> bool {
        if self.contains(waiter) {
            return false;
        }
        self.waiters.push(waiter.clone());
        true
    }

    /// Removes `waiter` from the set.
    ///
    /// Returns `false` if it was not present.
    pub fn remove(&mut self, waiter: &Waiter) -> bool {
        match self.position(waiter) {
            Some(idx) => {
                self.waiters.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if `waiter` is in the set.
    #[must_use]
    pub fn contains(&self, waiter: &Waiter) -> bool {
        self.position(waiter).is_some()
    }

    /// Turns on every waiter in the set, leaving the set empty.
    ///
    /// Returns the number of waiters that were turned on by this call (a
    /// waiter that was already on because another request fired it first is
    /// not counted).
    ///
    /// This should be called while holding the lock that protects the set,
    /// at the moment the owning request becomes terminal.
    pub fn notify_all(&mut self) -> usize {
        self.waiters
            .drain(..)
            .filter(|waiter| waiter.turn_on())
            .count()
    }

    /// Returns the number of registered waiters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    /// Returns `true` if no waiters are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }

    fn position(&self, waiter: &Waiter) -> Option<usize> {
        self.waiters.iter().position(|w| Arc::ptr_eq(w, waiter))
    }
}

impl fmt::Debug for WaiterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.waiters.iter().map(Arc::as_ptr))
            .finish()
    }
}
