//! Synchronous (blocking) synchronization primitives.
//!
//! The primitives in this module block the current *thread* until they are
//! woken, using the operating system's mutex and condition variable (or
//! [`loom`]'s simulated versions when `cfg(loom)` is enabled).
//!
//! Unlike [`std::sync::Mutex`], the [`Mutex`] in this module does not
//! support poisoning: locking a mutex that was held by a panicking thread
//! simply succeeds. Critical sections guarded by these locks must therefore
//! leave the protected data consistent at every point where they could panic.
//!
//! This module provides the following APIs:
//!
//! - [`Mutex`]: a blocking [mutual exclusion] lock.
//! - [`Condvar`]: a condition variable that works with [`MutexGuard`]s.
//!
//! [mutual exclusion]: https://en.wikipedia.org/wiki/Mutual_exclusion
//! [`loom`]: https://crates.io/crates/loom
use crate::{loom::sync, util::fmt};
use core::ops::{Deref, DerefMut};
use std::sync::{PoisonError, TryLockError};

/// A blocking mutual exclusion lock for protecting shared data.
///
/// The data can only be accessed through the RAII guards returned from
/// [`lock`] and [`try_lock`], which guarantees that the data is only ever
/// accessed when the mutex is locked.
///
/// # Loom-specific behavior
///
/// When `cfg(loom)` is enabled, this mutex will use Loom's simulated mutex.
///
/// [`lock`]: Mutex::lock
/// [`try_lock`]: Mutex::try_lock
pub struct Mutex<T> {
    inner: sync::Mutex<T>,
}

/// An RAII implementation of a "scoped lock" of a [`Mutex`]. When this
/// structure is dropped (falls out of scope), the lock will be unlocked.
///
/// The data protected by the mutex can be accessed through this guard via its
/// [`Deref`] and [`DerefMut`] implementations.
#[must_use = "if unused, the `Mutex` will immediately unlock"]
pub struct MutexGuard<'a, T> {
    guard: sync::MutexGuard<'a, T>,
}

/// A condition variable, used to block a thread until a [`Mutex`]-protected
/// condition becomes true.
///
/// Every `Condvar` should be used with a single [`Mutex`] only.
pub struct Condvar {
    inner: sync::Condvar,
}

// === impl Mutex ===

impl<T> Mutex<T> {
    loom_const_fn! {
        /// Returns a new `Mutex` protecting the provided `data`.
        ///
        /// The returned `Mutex` is in an unlocked state, ready for use.
        ///
        /// # Examples
        ///
        /// ```
        /// use hyphae_sync::blocking::Mutex;
        ///
        /// let mutex = Mutex::new(0);
        /// ```
        #[must_use]
        pub fn new(data: T) -> Self {
            Self {
                inner: sync::Mutex::new(data),
            }
        }
    }

    /// Acquires the mutex, blocking the current thread until it is able to
    /// do so.
    ///
    /// Returns a guard that releases the lock when dropped.
    #[track_caller]
    pub fn lock(&self) -> MutexGuard<'_, T> {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        MutexGuard { guard }
    }

    /// Attempts to acquire the mutex without blocking.
    ///
    /// Returns [`None`] if the mutex is currently locked.
    #[track_caller]
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        match self.inner.try_lock() {
            Ok(guard) => Some(MutexGuard { guard }),
            Err(TryLockError::Poisoned(poisoned)) => Some(MutexGuard {
                guard: poisoned.into_inner(),
            }),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Locks the mutex and runs `f` with mutable access to the protected
    /// data, releasing the lock when `f` returns.
    #[track_caller]
    pub fn with_lock<U>(&self, f: impl FnOnce(&mut T) -> U) -> U {
        let mut guard = self.lock();
        f(&mut guard)
    }
}

impl<T: Default> Default for Mutex<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Mutex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Mutex");
        match self.try_lock() {
            Some(guard) => d.field("data", &&*guard),
            None => d.field("data", &format_args!("<locked>")),
        };
        d.finish()
    }
}

// === impl MutexGuard ===

impl<T> Deref for MutexGuard<'_, T> {
    type Target = T;
    #[inline]
    fn deref(&self) -> &Self::Target {
        self.guard.deref()
    }
}

impl<T> DerefMut for MutexGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.guard.deref_mut()
    }
}

impl<T: fmt::Debug> fmt::Debug for MutexGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.deref().fmt(f)
    }
}

// === impl Condvar ===

impl Condvar {
    loom_const_fn! {
        /// Returns a new `Condvar` with no threads waiting on it.
        #[must_use]
        pub fn new() -> Self {
            Self {
                inner: sync::Condvar::new(),
            }
        }
    }

    /// Blocks the current thread until this condition variable receives a
    /// notification, atomically releasing the lock held by `guard` while
    /// blocked.
    ///
    /// The lock is re-acquired before this method returns. As with any
    /// condition variable, wakeups may be spurious: callers must re-check the
    /// condition they are waiting for, or use [`Condvar::wait_while`].
    pub fn wait<'a, T>(&self, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
        let guard = self
            .inner
            .wait(guard.guard)
            .unwrap_or_else(PoisonError::into_inner);
        MutexGuard { guard }
    }

    /// Blocks the current thread for as long as `condition` returns `true`
    /// for the data protected by `guard`.
    ///
    /// `condition` is first checked before blocking, so this returns
    /// immediately if it is already `false`.
    pub fn wait_while<'a, T>(
        &self,
        mut guard: MutexGuard<'a, T>,
        mut condition: impl FnMut(&mut T) -> bool,
    ) -> MutexGuard<'a, T> {
        while condition(&mut guard) {
            guard = self.wait(guard);
        }
        guard
    }

    /// Wakes up one thread blocked on this condition variable.
    #[inline]
    pub fn notify_one(&self) {
        self.inner.notify_one();
    }

    /// Wakes up all threads blocked on this condition variable.
    #[inline]
    pub fn notify_all(&self) {
        self.inner.notify_all();
    }
}

impl Default for Condvar {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Condvar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condvar").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loom::{self, sync::Arc, thread};

    #[test]
    fn mutex_is_send_sync() {
        crate::util::test::assert_send_sync::<Mutex<usize>>();
        crate::util::test::assert_send_sync::<Condvar>();
    }

    #[test]
    #[cfg(not(loom))]
    fn lock_survives_panicking_holder() {
        let _trace = crate::util::test::trace_init();
        let mutex = std::sync::Arc::new(Mutex::new(1));
        let res = std::thread::spawn({
            let mutex = mutex.clone();
            move || {
                let mut guard = mutex.lock();
                *guard = 2;
                panic!("oh no");
            }
        })
        .join();
        assert!(res.is_err());
        assert_eq!(*mutex.lock(), 2);
    }

    #[test]
    #[cfg(not(loom))]
    fn try_lock_while_locked() {
        let mutex = Mutex::new(());
        let guard = mutex.lock();
        assert!(mutex.try_lock().is_none());
        drop(guard);
        assert!(mutex.try_lock().is_some());
    }

    #[test]
    fn condvar_wait_while() {
        loom::model(|| {
            let pair = Arc::new((Mutex::new(false), Condvar::new()));
            let thread = thread::spawn({
                let pair = pair.clone();
                move || {
                    let (lock, cv) = &*pair;
                    *lock.lock() = true;
                    cv.notify_all();
                }
            });

            let (lock, cv) = &*pair;
            let guard = cv.wait_while(lock.lock(), |ready| !*ready);
            assert!(*guard);
            drop(guard);

            thread.join().unwrap();
        });
    }
}
