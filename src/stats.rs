//! Wait-time statistics.
//!
//! Every blocking wait performed by this crate is measured by a
//! [`ScopedWaitTimer`], which adds the time spent blocked to the process-wide
//! [`Stats`]. The numbers are purely informational: nothing in the request
//! layer reads them back.
//!
//! ```
//! use hyphae::stats::{Stats, WaitOp};
//!
//! let before = Stats::global().snapshot();
//! {
//!     let _timer = Stats::global().wait_timer(WaitOp::Read);
//!     // ... block on something ...
//! }
//! let delta = Stats::global().snapshot() - before;
//! assert!(delta.waits(WaitOp::Read) >= 1);
//! ```
use core::{fmt, ops::Sub, time::Duration};
use portable_atomic::{AtomicU64, AtomicUsize, Ordering::Relaxed};
use std::time::Instant;

/// The kind of wait being measured.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum WaitOp {
    /// Blocked in [`wait_any`](crate::wait_any).
    Any,
    /// Blocked waiting for a read request.
    Read,
    /// Blocked waiting for a write request.
    Write,
}

/// Process-wide wait statistics.
#[derive(Debug)]
pub struct Stats {
    ops: [OpStats; WaitOp::COUNT],
    blocked: AtomicUsize,
}

/// A point-in-time copy of [`Stats`].
///
/// Subtracting an earlier snapshot from a later one yields the activity in
/// between.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct StatsSnapshot {
    waits: [u64; WaitOp::COUNT],
    wait_nanos: [u64; WaitOp::COUNT],
    blocked: usize,
}

/// Measures one blocking wait, recording it in [`Stats`] when dropped.
///
/// Returned by [`Stats::wait_timer`].
#[derive(Debug)]
#[must_use = "a wait timer measures nothing unless it is held across the wait"]
pub struct ScopedWaitTimer {
    stats: &'static Stats,
    op: WaitOp,
    started: Instant,
}

#[derive(Debug)]
struct OpStats {
    waits: AtomicU64,
    wait_nanos: AtomicU64,
}

static STATS: Stats = Stats::new();

// === impl WaitOp ===

impl WaitOp {
    const COUNT: usize = 3;
    const ALL: [WaitOp; Self::COUNT] = [WaitOp::Any, WaitOp::Read, WaitOp::Write];

    #[inline]
    const fn idx(self) -> usize {
        match self {
            Self::Any => 0,
            Self::Read => 1,
            Self::Write => 2,
        }
    }
}

impl fmt::Display for WaitOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Any => "any",
            Self::Read => "read",
            Self::Write => "write",
        })
    }
}

// === impl Stats ===

impl Stats {
    const fn new() -> Self {
        const OP: OpStats = OpStats {
            waits: AtomicU64::new(0),
            wait_nanos: AtomicU64::new(0),
        };
        Self {
            ops: [OP; WaitOp::COUNT],
            blocked: AtomicUsize::new(0),
        }
    }

    /// Returns the process-wide statistics.
    #[must_use]
    pub fn global() -> &'static Stats {
        &STATS
    }

    /// Starts measuring a wait of kind `op`.
    ///
    /// The wait is counted as soon as the timer is created, and its duration
    /// is added when the timer is dropped.
    pub fn wait_timer(&'static self, op: WaitOp) -> ScopedWaitTimer {
        self.ops[op.idx()].waits.fetch_add(1, Relaxed);
        self.blocked.fetch_add(1, Relaxed);
        ScopedWaitTimer {
            stats: self,
            op,
            started: Instant::now(),
        }
    }

    /// Returns a copy of the current counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        let mut snapshot = StatsSnapshot {
            blocked: self.blocked.load(Relaxed),
            ..StatsSnapshot::default()
        };
        for (i, op) in self.ops.iter().enumerate() {
            snapshot.waits[i] = op.waits.load(Relaxed);
            snapshot.wait_nanos[i] = op.wait_nanos.load(Relaxed);
        }
        snapshot
    }

    fn finish_wait(&self, op: WaitOp, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.ops[op.idx()].wait_nanos.fetch_add(nanos, Relaxed);
        self.blocked.fetch_sub(1, Relaxed);
    }
}

// === impl ScopedWaitTimer ===

impl ScopedWaitTimer {
    /// Returns the kind of wait being measured.
    #[must_use]
    pub fn op(&self) -> WaitOp {
        self.op
    }
}

impl Drop for ScopedWaitTimer {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        tracing::trace!(op = %self.op, ?elapsed, "wait finished");
        self.stats.finish_wait(self.op, elapsed);
    }
}

// === impl StatsSnapshot ===

impl StatsSnapshot {
    /// Returns the number of waits of kind `op`.
    #[must_use]
    pub fn waits(&self, op: WaitOp) -> u64 {
        self.waits[op.idx()]
    }

    /// Returns the total time spent blocked in waits of kind `op`.
    ///
    /// Waits that are still in progress are not included.
    #[must_use]
    pub fn wait_time(&self, op: WaitOp) -> Duration {
        Duration::from_nanos(self.wait_nanos[op.idx()])
    }

    /// Returns the number of threads that were blocked in a measured wait
    /// when the snapshot was taken.
    #[must_use]
    pub fn blocked(&self) -> usize {
        self.blocked
    }
}

impl Sub for StatsSnapshot {
    type Output = StatsSnapshot;

    /// Returns the activity between `rhs` (earlier) and `self` (later).
    ///
    /// The [`blocked`](StatsSnapshot::blocked) count is taken from `self`,
    /// since it is a gauge rather than a counter.
    fn sub(self, rhs: Self) -> Self::Output {
        let mut out = self;
        for i in 0..WaitOp::COUNT {
            out.waits[i] = self.waits[i].saturating_sub(rhs.waits[i]);
            out.wait_nanos[i] = self.wait_nanos[i].saturating_sub(rhs.wait_nanos[i]);
        }
        out
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for op in WaitOp::ALL {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(
                f,
                "wait {op}: {} in {:?}",
                self.waits(op),
                self.wait_time(op)
            )?;
        }
        write!(f, ", blocked: {}", self.blocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_records_on_drop() {
        let before = Stats::global().snapshot();
        let timer = Stats::global().wait_timer(WaitOp::Write);
        assert_eq!(timer.op(), WaitOp::Write);
        let during = Stats::global().snapshot() - before;
        assert!(during.waits(WaitOp::Write) >= 1);

        std::thread::sleep(Duration::from_millis(2));
        drop(timer);

        let after = Stats::global().snapshot() - before;
        assert!(after.waits(WaitOp::Write) >= 1);
        assert!(after.wait_time(WaitOp::Write) >= Duration::from_millis(2));
    }

    #[test]
    fn snapshot_sub_saturates() {
        let earlier = StatsSnapshot {
            waits: [5, 0, 0],
            ..StatsSnapshot::default()
        };
        let later = StatsSnapshot::default();
        assert_eq!((later - earlier).waits(WaitOp::Any), 0);
    }

    #[test]
    fn display() {
        let snapshot = StatsSnapshot {
            waits: [1, 2, 3],
            wait_nanos: [1_000, 0, 0],
            blocked: 1,
        };
        assert_eq!(
            snapshot.to_string(),
            "wait any: 1 in 1µs, wait read: 2 in 0ns, wait write: 3 in 0ns, blocked: 1"
        );
    }
}
