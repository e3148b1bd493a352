#![allow(dead_code)]
use hyphae::{IoKind, IoRequest, Request};
use std::{
    io,
    sync::{mpsc, Arc},
    thread,
    time::Duration,
};

pub fn trace_init() {
    use tracing_subscriber::filter::LevelFilter;
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .try_init();
}

pub fn reads(n: usize) -> Vec<Arc<IoRequest>> {
    (0..n)
        .map(|i| Arc::new(IoRequest::new(IoKind::Read, i as u64 * 4096, 4096)))
        .collect()
}

pub fn io_error(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::Other, msg)
}

/// Asserts that no request in `reqs` has a waiter registered.
#[track_caller]
pub fn assert_no_waiters(reqs: &[Arc<IoRequest>]) {
    for (idx, req) in reqs.iter().enumerate() {
        assert_eq!(req.num_waiters(), 0, "request {idx} still has waiters");
    }
}

/// Completes every request that is not yet complete, so that it can be
/// dropped.
pub fn finish_all(reqs: &[Arc<IoRequest>]) {
    for req in reqs {
        if !req.poll() {
            req.complete(Ok(()));
        }
    }
}

/// How a [`Disk`] finishes a submitted request.
#[derive(Debug)]
pub enum Outcome {
    Success,
    Failure(&'static str),
}

struct Job {
    req: Arc<IoRequest>,
    delay: Duration,
    outcome: Outcome,
}

/// A background thread that executes submitted requests in order, after an
/// artificial delay.
pub struct Disk {
    jobs: Option<mpsc::Sender<Job>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Disk {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel::<Job>();
        let thread = thread::Builder::new()
            .name("disk".into())
            .spawn(move || {
                for Job { req, delay, outcome } in rx {
                    if !req.begin() {
                        tracing::debug!(?req, "skipping request");
                        continue;
                    }
                    thread::sleep(delay);
                    match outcome {
                        Outcome::Success => req.complete(Ok(())),
                        Outcome::Failure(msg) => req.complete(Err(io_error(msg))),
                    }
                }
            })
            .expect("failed to spawn disk thread");
        Self {
            jobs: Some(tx),
            thread: Some(thread),
        }
    }

    pub fn submit(&self, req: &Arc<IoRequest>, delay: Duration, outcome: Outcome) {
        let job = Job {
            req: req.clone(),
            delay,
            outcome,
        };
        self.jobs
            .as_ref()
            .expect("disk already shut down")
            .send(job)
            .expect("disk thread exited");
    }

    /// Waits for every submitted request to be executed (or skipped).
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        drop(self.jobs.take());
        if let Some(thread) = self.thread.take() {
            thread.join().expect("disk thread panicked");
        }
    }
}

impl Drop for Disk {
    fn drop(&mut self) {
        if !thread::panicking() {
            self.stop();
        }
    }
}
