use super::{IoKind, Request, State, Waiter, WaiterSet};
use crate::{
    stats::{Stats, WaitOp},
    RequestError,
};
use core::fmt;
use hyphae_sync::blocking::{Condvar, Mutex};
use std::{io, sync::Arc};

/// A callback invoked once an [`IoRequest`] reaches a terminal state.
///
/// The second argument is `true` if the request completed successfully, and
/// `false` if it failed or was canceled.
pub type CompletionHandler = Box<dyn Fn(&IoRequest, bool) + Send + Sync>;

/// A block transfer request, implementing the [`Request`] contract.
///
/// An `IoRequest` describes a read or write of `bytes` bytes at byte `offset`
/// of some backing store. It does not perform the transfer itself: a storage
/// backend takes submitted requests, calls [`begin`] when it starts executing
/// one, and [`complete`] when the transfer has finished.
///
/// ```text
///              begin()                complete(Ok)
///   Pending ────────────▶ InProgress ──────────────▶ Done
///      │                      │
///      │ cancel()             │ complete(Err)
///      ▼                      ▼
///   Canceled                Failed
/// ```
///
/// A request may also be completed straight from `Pending`, for backends
/// that perform the transfer synchronously.
///
/// All state (the current [`State`], the recorded error and the registered
/// waiters) is protected by a single lock owned by the request, so unrelated
/// requests never contend with each other.
///
/// # Examples
///
/// ```
/// use hyphae::{IoKind, IoRequest, Request, State};
/// use std::{sync::Arc, thread};
///
/// let req = Arc::new(IoRequest::new(IoKind::Write, 0, 4096));
///
/// // the "disk" thread
/// let disk = thread::spawn({
///     let req = req.clone();
///     move || {
///         if req.begin() {
///             // ... write the block ...
///             req.complete(Ok(()));
///         }
///     }
/// });
///
/// req.wait().expect("write failed");
/// assert_eq!(req.state(), State::Done);
/// disk.join().unwrap();
/// ```
///
/// [`begin`]: IoRequest::begin
/// [`complete`]: IoRequest::complete
pub struct IoRequest {
    kind: IoKind,
    offset: u64,
    bytes: usize,
    on_complete: Option<CompletionHandler>,
    inner: Mutex<Inner>,
    completed: Condvar,
}

struct Inner {
    state: State,
    error: Option<RequestError>,
    waiters: WaiterSet,
}

// === impl IoRequest ===

impl IoRequest {
    /// Returns a new, [`Pending`](State::Pending) request to transfer `bytes`
    /// bytes at byte `offset`.
    #[must_use]
    pub fn new(kind: IoKind, offset: u64, bytes: usize) -> Self {
        Self {
            kind,
            offset,
            bytes,
            on_complete: None,
            inner: Mutex::new(Inner {
                state: State::Pending,
                error: None,
                waiters: WaiterSet::new(),
            }),
            completed: Condvar::new(),
        }
    }

    /// Sets a handler to be invoked once the request reaches a terminal state.
    ///
    /// The handler runs on whichever thread performs the terminal transition
    /// (the backend thread for completion, the caller of [`cancel`] for
    /// cancellation), after the request's lock has been released and every
    /// waiter has been notified.
    ///
    /// [`cancel`]: Request::cancel
    #[must_use]
    pub fn with_completion_handler(
        mut self,
        handler: impl Fn(&IoRequest, bool) + Send + Sync + 'static,
    ) -> Self {
        self.on_complete = Some(Box::new(handler));
        self
    }

    /// Returns whether this request reads or writes.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> IoKind {
        self.kind
    }

    /// Returns the byte offset of the transfer.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the length of the transfer, in bytes.
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// Returns the current state of the request.
    #[must_use]
    pub fn state(&self) -> State {
        self.inner.lock().state
    }

    /// Returns the recorded error, if the request failed.
    #[must_use]
    pub fn error(&self) -> Option<RequestError> {
        self.inner.lock().error.clone()
    }

    /// Returns the number of waiters currently registered with this request.
    #[must_use]
    pub fn num_waiters(&self) -> usize {
        self.inner.lock().waiters.len()
    }

    /// Marks the request as [`InProgress`](State::InProgress).
    ///
    /// Backends call this before starting the transfer. Once a request is in
    /// progress it can no longer be canceled.
    ///
    /// # Returns
    ///
    /// - `true` if the request moved from `Pending` to `InProgress`, and the
    ///   backend should go ahead with the transfer.
    /// - `false` if the request is not pending (most likely because it was
    ///   canceled). The backend must skip it.
    pub fn begin(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.state != State::Pending {
            tracing::debug!(req = ?self, state = %inner.state, "not starting request");
            return false;
        }
        inner.state = State::InProgress;
        tracing::trace!(req = ?self, "request in progress");
        true
    }

    /// Completes the request with the result of the transfer.
    ///
    /// On success, the request becomes [`Done`](State::Done). On failure,
    /// `error` is recorded as a [`RequestError::Io`] and the request becomes
    /// [`Failed`](State::Failed). Either way, every registered waiter is
    /// turned on, threads blocked in [`wait`](Request::wait) are woken, and
    /// the completion handler (if any) runs.
    ///
    /// Completing a request that is already terminal has no effect.
    pub fn complete(&self, result: io::Result<()>) {
        let result = result.map_err(|error| RequestError::Io {
            kind: self.kind,
            offset: self.offset,
            bytes: self.bytes,
            source: Arc::new(error),
        });
        self.finish(result);
    }

    /// Completes the request with an arbitrary failure.
    ///
    /// This behaves like [`complete`](Self::complete) with an error, but
    /// records `error` as-is.
    pub fn fail_with(&self, error: RequestError) {
        self.finish(Err(error));
    }

    fn finish(&self, result: Result<(), RequestError>) {
        let success = result.is_ok();
        {
            let mut inner = self.inner.lock();
            if inner.state.is_terminal() {
                tracing::warn!(
                    req = ?self,
                    state = %inner.state,
                    ?result,
                    "attempted to complete a request that is already complete",
                );
                return;
            }

            // the error must be in place before the state is observable.
            match result {
                Ok(()) => inner.state = State::Done,
                Err(error) => {
                    inner.error = Some(error);
                    inner.state = State::Failed;
                }
            }
            self.notify_locked(&mut inner);
        }

        self.run_completion_handler(success);
    }

    /// Notifies waiters of a terminal transition. Must be called with the
    /// lock held, after the terminal state has been written.
    fn notify_locked(&self, inner: &mut Inner) {
        debug_assert!(inner.state.is_terminal());
        let woken = inner.waiters.notify_all();
        self.completed.notify_all();
        tracing::trace!(req = ?self, state = %inner.state, woken, "request complete");
    }

    fn run_completion_handler(&self, success: bool) {
        if let Some(ref on_complete) = self.on_complete {
            on_complete(self, success);
        }
    }
}

impl Request for IoRequest {
    fn poll(&self) -> bool {
        self.inner.lock().state.is_terminal()
    }

    fn wait(&self) -> Result<(), RequestError> {
        let mut inner = self.inner.lock();
        if !inner.state.is_terminal() {
            let op = match self.kind {
                IoKind::Read => WaitOp::Read,
                IoKind::Write => WaitOp::Write,
            };
            let _timer = Stats::global().wait_timer(op);
            inner = self
                .completed
                .wait_while(inner, |inner| !inner.state.is_terminal());
        }

        match inner.error {
            Some(ref error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn add_waiter(&self, waiter: &Waiter) -> bool {
        let mut inner = self.inner.lock();
        if inner.state.is_terminal() {
            return false;
        }
        inner.waiters.insert(waiter);
        true
    }

    fn delete_waiter(&self, waiter: &Waiter) {
        self.inner.lock().waiters.remove(waiter);
    }

    fn cancel(&self) -> bool {
        {
            let mut inner = self.inner.lock();
            if inner.state != State::Pending {
                return false;
            }
            inner.state = State::Canceled;
            self.notify_locked(&mut inner);
        }

        tracing::debug!(req = ?self, "request canceled");
        self.run_completion_handler(false);
        true
    }

    fn check_error(&self) -> Result<(), RequestError> {
        match self.inner.lock().error {
            Some(ref error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for IoRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // this is called from inside critical sections, so it must not lock.
        f.debug_struct("IoRequest")
            .field("kind", &self.kind)
            .field("offset", &self.offset)
            .field("bytes", &self.bytes)
            .field("addr", &(self as *const Self))
            .finish_non_exhaustive()
    }
}

impl Drop for IoRequest {
    fn drop(&mut self) {
        let inner = self.inner.lock();
        if !inner.state.is_terminal() {
            tracing::warn!(req = ?self, state = %inner.state, "request dropped before completing");
        }
        debug_assert!(
            inner.waiters.is_empty(),
            "request dropped with {} waiter(s) still registered; every `add_waiter` \
             must be paired with a `delete_waiter` before the request is released",
            inner.waiters.len(),
        );
    }
}
