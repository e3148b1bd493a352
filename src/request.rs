//! The request contract.
//!
//! A [`Request`] is one asynchronous operation (typically a block read or
//! write) that is executed by a background thread and observed by a
//! foreground one. The completion algorithms in this crate ([`wait_any`],
//! [`wait_all`], [`poll_any`] and [`cancel_all`]) are written against this
//! trait only; they never look inside a request.
//!
//! [`IoRequest`] is a ready-made implementation of the contract that storage
//! backends can use directly, and [`WaiterSet`] is the building block for
//! backends that need their own request type.
//!
//! [`wait_any`]: crate::wait_any
//! [`wait_all`]: crate::wait_all
//! [`poll_any`]: crate::poll_any
//! [`cancel_all`]: crate::cancel_all
use crate::RequestError;
use core::fmt;
use hyphae_sync::OnOffSwitch;
use std::sync::Arc;

mod io;
mod waiters;


pub use self::io::{CompletionHandler, IoRequest};
pub use self::waiters::WaiterSet;

/// A handle to a [`OnOffSwitch`] that can be registered with a [`Request`].
///
/// The switch itself belongs to the thread waiting on it; a request only keeps
/// a clone of the handle for as long as it is registered.
pub type Waiter = Arc<OnOffSwitch>;

/// An asynchronous operation that completes on a background thread.
///
/// # Contract
///
/// The completion algorithms rely on the following guarantees from every
/// implementation. They are not checked at runtime.
///
/// - **Monotonic completion.** A request moves through [`State`]s and, once
///   it has reached a [terminal](State::is_terminal) state, never leaves it.
///   After the first time [`poll`] returns `true`, it always returns `true`.
/// - **Error recorded before completion.** If the request fails, its
///   [`RequestError`] is recorded before the terminal state becomes
///   observable to any other thread.
/// - **Atomic registration.** [`add_waiter`] and the transition into a
///   terminal state are serialized by the request. A registration that races
///   with completion has exactly two possible outcomes: the registration
///   happens first and the waiter is turned on by the transition, or the
///   transition happens first and [`add_waiter`] returns `false`.
/// - **Fire at most once, while registered.** A registered waiter is turned
///   on at most once, exactly at the terminal transition. Once
///   [`delete_waiter`] has returned, the request will not touch that waiter
///   again.
///
/// [`poll`]: Request::poll
/// [`add_waiter`]: Request::add_waiter
/// [`delete_waiter`]: Request::delete_waiter
pub trait Request: Send + Sync {
    /// Returns `true` if the request has reached a terminal state.
    ///
    /// This never blocks and never reports the request's error; use
    /// [`check_error`](Request::check_error) or [`wait`](Request::wait) for
    /// that.
    fn poll(&self) -> bool;

    /// Blocks the calling thread until the request reaches a terminal state.
    ///
    /// # Returns
    ///
    /// - [`Ok`]`(())` if the request completed successfully or was canceled.
    /// - [`Err`]`(`[`RequestError`]`)` with the recorded error if the request
    ///   failed.
    ///
    /// Calling `wait` again after the request has completed returns the same
    /// result without blocking.
    fn wait(&self) -> Result<(), RequestError>;

    /// Registers `waiter` to be turned on when the request reaches a terminal
    /// state.
    ///
    /// # Returns
    ///
    /// - `true` if the waiter was registered.
    /// - `false` if the request is *already* terminal. Nothing is registered
    ///   in this case, and the caller must treat the request as done.
    fn add_waiter(&self, waiter: &Waiter) -> bool;

    /// Unregisters `waiter`, if it is registered.
    ///
    /// This is a no-op if `waiter` was never registered, was already removed,
    /// or was already turned on by this request.
    fn delete_waiter(&self, waiter: &Waiter);

    /// Attempts to cancel the request.
    ///
    /// Only requests whose execution has not yet started can be canceled.
    /// Returns `true` if the request was canceled. A canceled request is
    /// terminal, but callers must still observe it through [`poll`] or
    /// [`wait`] like any other request.
    ///
    /// [`poll`]: Request::poll
    /// [`wait`]: Request::wait
    fn cancel(&self) -> bool;

    /// Returns the recorded error if the request is in the
    /// [`Failed`](State::Failed) state, and `Ok(())` otherwise.
    fn check_error(&self) -> Result<(), RequestError>;
}

/// The lifecycle state of a request.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum State {
    /// The request was submitted but has not started executing.
    Pending,
    /// A background thread is executing the request.
    InProgress,
    /// The request completed successfully.
    Done,
    /// The request completed with an error.
    Failed,
    /// The request was canceled before it started executing.
    Canceled,
}

/// Whether an [`IoRequest`] reads from or writes to its backing store.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum IoKind {
    /// Transfer from the backing store into memory.
    Read,
    /// Transfer from memory to the backing store.
    Write,
}

// === impl State ===

impl State {
    /// Returns `true` if no further state transition can occur.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Canceled)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        })
    }
}

// === impl IoKind ===

impl fmt::Display for IoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Read => "read",
            Self::Write => "write",
        })
    }
}

// === forwarding impls ===

impl<R: Request + ?Sized> Request for &R {
    #[inline]
    fn poll(&self) -> bool {
        R::poll(self)
    }

    #[inline]
    fn wait(&self) -> Result<(), RequestError> {
        R::wait(self)
    }

    #[inline]
    fn add_waiter(&self, waiter: &Waiter) -> bool {
        R::add_waiter(self, waiter)
    }

    #[inline]
    fn delete_waiter(&self, waiter: &Waiter) {
        R::delete_waiter(self, waiter)
    }

    #[inline]
    fn cancel(&self) -> bool {
        R::cancel(self)
    }

    #[inline]
    fn check_error(&self) -> Result<(), RequestError> {
        R::check_error(self)
    }
}

impl<R: Request + ?Sized> Request for Arc<R> {
    #[inline]
    fn poll(&self) -> bool {
        R::poll(self)
    }

    #[inline]
    fn wait(&self) -> Result<(), RequestError> {
        R::wait(self)
    }

    #[inline]
    fn add_waiter(&self, waiter: &Waiter) -> bool {
        R::add_waiter(self, waiter)
    }

    #[inline]
    fn delete_waiter(&self, waiter: &Waiter) {
        R::delete_waiter(self, waiter)
    }

    #[inline]
    fn cancel(&self) -> bool {
        R::cancel(self)
    }

    #[inline]
    fn check_error(&self) -> Result<(), RequestError> {
        R::check_error(self)
    }
}
