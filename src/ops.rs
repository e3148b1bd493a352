//! Completion tracking for sequences of requests.
//!
//! The functions in this module operate on an ordered sequence of
//! [`Request`]s, such as a slice of `Arc<IoRequest>`s, a `Vec` of
//! `Arc<dyn Request>`s, or any other [`IntoIterator`] whose items implement
//! [`Request`]. Where a function reports a position, it is the index of the
//! request within the sequence, and "first" always means lowest index.
//!
//! To operate on only the first `count` requests of an array, pass a slice:
//! `wait_any(&reqs[..count])`.
//!
//! | function       | blocks? | returns errors? |
//! |----------------|---------|-----------------|
//! | [`wait_all`]   | yes     | first failure, in sequence order |
//! | [`wait_any`]   | yes     | failure of the returned request |
//! | [`poll_any`]   | no      | never |
//! | [`cancel_all`] | no      | never |
use crate::{
    request::{Request, Waiter},
    stats::{Stats, WaitOp},
    RequestError,
};
use hyphae_sync::OnOffSwitch;
use std::sync::Arc;


/// Blocks the calling thread until **all** of the given requests have
/// completed.
///
/// The requests are waited on one at a time, in order.
///
/// # Returns
///
/// - [`Ok`]`(())` once every request is terminal and none of them failed.
/// - [`Err`]`(`[`RequestError`]`)` with the error of the first request (in
///   sequence order) that failed. Requests after the failed one are *not*
///   waited on by this call and may still be running; they must be waited on
///   separately.
///
/// # Examples
///
/// ```
/// use hyphae::{wait_all, IoKind, IoRequest};
/// use std::{sync::Arc, thread};
///
/// let reqs = (0..4)
///     .map(|i| Arc::new(IoRequest::new(IoKind::Read, i * 4096, 4096)))
///     .collect::<Vec<_>>();
///
/// let disk = thread::spawn({
///     let reqs = reqs.clone();
///     move || {
///         for req in reqs {
///             req.complete(Ok(()));
///         }
///     }
/// });
///
/// wait_all(&reqs).expect("no request failed");
/// disk.join().unwrap();
/// ```
pub fn wait_all<I>(reqs: I) -> Result<(), RequestError>
where
    I: IntoIterator,
    I::Item: Request,
{
    enter_test_debug_span!("wait_all");
    for req in reqs {
        test_trace!("waiting for request");
        req.wait()?;
    }
    Ok(())
}

/// Attempts to cancel **all** of the given requests.
///
/// [`Request::cancel`] is called on every request, whether or not canceling
/// the previous ones succeeded. Only requests that have not yet started
/// executing can be canceled. This never blocks.
///
/// Canceled or not, every request must still be observed to completion (with
/// [`wait_all`], [`wait_any`], [`poll_any`] or the request's own methods)
/// before it is released.
///
/// # Returns
///
/// The number of requests that were canceled.
pub fn cancel_all<I>(reqs: I) -> usize
where
    I: IntoIterator,
    I::Item: Request,
{
    let canceled = reqs.into_iter().filter(|req| req.cancel()).count();
    tracing::debug!(canceled, "canceled requests");
    canceled
}

/// Checks, without blocking, whether **any** of the given requests has
/// completed.
///
/// # Returns
///
/// - [`Some`]`(index)` with the position of the first completed request.
/// - [`None`] if no request had completed at the time it was polled. Note
///   that this is only a snapshot: a request may complete immediately after
///   it was checked.
///
/// This never reports a request's error. Use [`Request::check_error`] or
/// [`Request::wait`] on the returned request to find out whether it failed.
#[must_use]
pub fn poll_any<I>(reqs: I) -> Option<usize>
where
    I: IntoIterator,
    I::Item: Request,
{
    reqs.into_iter().position(|req| req.poll())
}

/// Blocks the calling thread until **any** of the given requests has
/// completed.
///
/// # Returns
///
/// - [`Ok`]`(index)` with the position of the first completed request. If
///   several requests have completed by the time this function wakes up, the
///   one with the lowest index is returned, regardless of the order in which
///   they actually completed.
/// - [`Err`]`(`[`RequestError`]`)` with the recorded error if the request
///   that would have been returned failed.
///
/// # Panics
///
/// If `reqs` is empty. Waiting for any of zero requests could never return.
///
/// # Implementation Notes
///
/// A single [`OnOffSwitch`] is registered as a waiter with each request in
/// turn. If a request reports that it is already complete while registering,
/// the switch is unregistered from the requests before it and that request is
/// returned without blocking. Otherwise, the calling thread blocks until one
/// of the requests turns the switch on. Since registration is atomic with
/// respect to each request's completion, a request that completes at any point
/// during this process either turns the switch on or is seen as already
/// complete, so the wakeup cannot be missed.
///
/// The switch only says that *some* request completed, not which one, so
/// after waking the requests are polled again in order to find the first one
/// that is complete. Before returning, the switch is unregistered from every
/// request it was registered with, and no request can turn it on afterwards.
///
/// # Examples
///
/// ```
/// use hyphae::{wait_any, IoKind, IoRequest};
/// use std::{sync::Arc, thread, time::Duration};
///
/// let reqs = [
///     Arc::new(IoRequest::new(IoKind::Read, 0, 4096)),
///     Arc::new(IoRequest::new(IoKind::Read, 4096, 4096)),
/// ];
///
/// let disk = thread::spawn({
///     let second = reqs[1].clone();
///     move || {
///         thread::sleep(Duration::from_millis(10));
///         second.complete(Ok(()));
///     }
/// });
///
/// assert_eq!(wait_any(&reqs), Ok(1));
///
/// reqs[0].complete(Ok(()));
/// disk.join().unwrap();
/// ```
pub fn wait_any<I>(reqs: I) -> Result<usize, RequestError>
where
    I: IntoIterator + Clone,
    I::Item: Request,
{
    enter_test_debug_span!("wait_any");
    let switch: Waiter = Arc::new(OnOffSwitch::new());

    let mut registered = 0;
    for req in reqs.clone() {
        if !test_dbg!(req.add_waiter(&switch)) {
            // already complete; nothing was registered with this request, so
            // only the ones before it need to be cleaned up.
            test_trace!(idx = registered, "request already complete");
            unregister(reqs.into_iter().take(registered), &switch);
            req.check_error()?;
            return Ok(registered);
        }
        registered += 1;
    }

    assert!(
        registered > 0,
        "`wait_any` called with no requests; this would block forever"
    );

    {
        let _timer = Stats::global().wait_timer(WaitOp::Any);
        test_trace!(registered, "waiting for any request to complete");
        switch.wait_for_on();
    }

    // more than one request may have completed before we woke up, and any of
    // them may have been the one to turn on the switch. unregister from all of
    // them before picking the first complete request.
    unregister(reqs.clone(), &switch);

    let (idx, req) = reqs
        .into_iter()
        .enumerate()
        .find(|(_, req)| req.poll())
        .unwrap_or_else(|| {
            unreachable!(
                "`wait_any` woke up, but no request is complete; \
                 a request turned on its waiters before completing"
            )
        });
    test_trace!(idx, "request complete");
    req.check_error()?;
    Ok(idx)
}

fn unregister<I>(reqs: I, switch: &Waiter)
where
    I: IntoIterator,
    I::Item: Request,
{
    for req in reqs {
        req.delete_waiter(switch);
    }
}
