//! A single-use binary event.
//!
//! See the documentation for the [`OnOffSwitch`] type for details.
use crate::{
    blocking::{Condvar, Mutex},
    util::fmt,
};


/// A single-use binary event that one thread can block on and any other
/// thread can signal.
///
/// An `OnOffSwitch` starts out *off*. Calling [`turn_on`] flips it *on* and
/// wakes every thread blocked in [`wait_for_on`]. Once a switch is on it
/// stays on: there is no way to turn it off again, so a switch is good for
/// exactly one wakeup.
///
/// The state is a flag guarded by a [`Mutex`], paired with a [`Condvar`].
/// Because the flag is checked and updated under the lock, a [`turn_on`]
/// that races with a thread entering [`wait_for_on`] is never lost: either
/// the waiter observes the switch as already on and does not block, or it is
/// blocked on the condition variable before the flag is set and is woken by
/// the notification.
///
/// # Examples
///
/// ```
/// use hyphae_sync::OnOffSwitch;
/// use std::{sync::Arc, thread};
///
/// let switch = Arc::new(OnOffSwitch::new());
///
/// let thread = thread::spawn({
///     let switch = switch.clone();
///     move || {
///         // ... do some work ...
///         switch.turn_on();
///     }
/// });
///
/// // block until the other thread is done.
/// switch.wait_for_on();
/// assert!(switch.is_on());
///
/// thread.join().unwrap();
/// ```
///
/// [`turn_on`]: Self::turn_on
/// [`wait_for_on`]: Self::wait_for_on
pub struct OnOffSwitch {
    on: Mutex<bool>,
    cv: Condvar,
}

// === impl OnOffSwitch ===

impl OnOffSwitch {
    loom_const_fn! {
        /// Returns a new `OnOffSwitch` in the *off* state.
        #[must_use]
        pub fn new() -> Self {
            Self {
                on: Mutex::new(false),
                cv: Condvar::new(),
            }
        }
    }

    /// Turns the switch on, waking every thread blocked in
    /// [`wait_for_on`](Self::wait_for_on).
    ///
    /// This is idempotent, and may be called concurrently from any number of
    /// threads.
    ///
    /// # Returns
    ///
    /// - `true` if this call turned the switch on.
    /// - `false` if the switch was already on.
    pub fn turn_on(&self) -> bool {
        enter_test_debug_span!("OnOffSwitch::turn_on", switch = ?fmt::ptr(self));
        let mut on = self.on.lock();
        if test_dbg!(*on) {
            return false;
        }

        *on = true;
        trace!(switch = ?fmt::ptr(self), "switch turned on");
        // notify while still holding the lock: once the waiter observes the
        // flag, the switch may be dropped by its owner.
        self.cv.notify_all();
        true
    }

    /// Blocks the current thread until the switch is turned on.
    ///
    /// Returns immediately if the switch is already on.
    pub fn wait_for_on(&self) {
        enter_test_debug_span!("OnOffSwitch::wait_for_on", switch = ?fmt::ptr(self));
        let on = self.on.lock();
        if *on {
            return;
        }

        trace!(switch = ?fmt::ptr(self), "waiting for switch");
        let on = self.cv.wait_while(on, |on| !*on);
        debug_assert!(*on, "woke from `wait_for_on` while the switch is off");
        trace!(switch = ?fmt::ptr(self), "switch is on; woke up");
    }

    /// Returns `true` if the switch has been turned on.
    ///
    /// This never blocks for longer than it takes to acquire the switch's
    /// lock, and is only a snapshot: a switch that is off may be turned on
    /// immediately after this returns.
    #[must_use]
    pub fn is_on(&self) -> bool {
        *self.on.lock()
    }
}

impl Default for OnOffSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OnOffSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("OnOffSwitch");
        match self.on.try_lock() {
            Some(on) => d.field("on", &*on),
            None => d.field("on", &format_args!("<locked>")),
        };
        d.finish()
    }
}
