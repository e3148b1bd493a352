use super::*;
use crate::loom::{self, thread};

type Shared<T> = crate::loom::sync::Arc<T>;

fn shared_reads(n: usize) -> Vec<Shared<IoRequest>> {
    (0..n)
        .map(|i| Shared::new(IoRequest::new(IoKind::Read, i as u64 * 4096, 4096)))
        .collect()
}

#[test]
fn wait_any_races_completion() {
    loom::model(|| {
        let reqs = shared_reads(2);
        let disk = thread::spawn({
            let second = reqs[1].clone();
            move || second.complete(Ok(()))
        });

        assert_eq!(test_dbg!(wait_any(reqs.iter().map(|req| &**req))), Ok(1));
        disk.join().unwrap();

        for req in &reqs {
            assert_eq!(req.num_waiters(), 0);
        }
        reqs[0].complete(Ok(()));
    });
}

#[test]
fn wait_any_races_failure() {
    loom::model(|| {
        let reqs = shared_reads(2);
        let disk = thread::spawn({
            let first = reqs[0].clone();
            move || first.complete(Err(io_error("device gone")))
        });

        let result = wait_any(reqs.iter().map(|req| &**req));
        disk.join().unwrap();
        assert_eq!(result, Err(reqs[0].error().unwrap()));

        for req in &reqs {
            assert_eq!(req.num_waiters(), 0);
        }
        reqs[1].complete(Ok(()));
    });
}

#[test]
fn wait_any_concurrent_completions() {
    loom::model(|| {
        let reqs = shared_reads(2);
        let disks = reqs
            .iter()
            .map(|req| {
                let req = req.clone();
                thread::spawn(move || req.complete(Ok(())))
            })
            .collect::<Vec<_>>();

        let idx = wait_any(reqs.iter().map(|req| &**req)).unwrap();
        assert!(reqs[idx].poll());

        for disk in disks {
            disk.join().unwrap();
        }
        assert_eq!(wait_any(reqs.iter().map(|req| &**req)), Ok(0));
        for req in &reqs {
            assert_eq!(req.num_waiters(), 0);
        }
    });
}
