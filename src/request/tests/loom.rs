use super::*;
use crate::loom::{self, thread};

type Shared<T> = crate::loom::sync::Arc<T>;

#[test]
fn add_waiter_races_completion() {
    loom::model(|| {
        let req = Shared::new(read(0));
        let sw = switch();

        let disk = thread::spawn({
            let req = req.clone();
            move || req.complete(Ok(()))
        });

        if req.add_waiter(&sw) {
            // registered before completion: the switch must be turned on.
            sw.wait_for_on();
            req.delete_waiter(&sw);
        } else {
            // completion won: the request must already look complete.
            assert!(req.poll());
            assert!(!sw.is_on());
        }

        disk.join().unwrap();
        assert_eq!(req.num_waiters(), 0);
    });
}

#[test]
fn delete_waiter_races_completion() {
    loom::model(|| {
        let req = Shared::new(read(0));
        let sw = switch();
        assert!(req.add_waiter(&sw));

        let disk = thread::spawn({
            let req = req.clone();
            move || req.complete(Ok(()))
        });

        req.delete_waiter(&sw);
        let on_after_delete = sw.is_on();

        disk.join().unwrap();
        // once `delete_waiter` has returned, the request no longer touches
        // the switch.
        assert_eq!(sw.is_on(), on_after_delete);
        assert_eq!(req.num_waiters(), 0);
    });
}

#[test]
fn cancel_races_begin() {
    loom::model(|| {
        let req = Shared::new(read(0));

        let disk = thread::spawn({
            let req = req.clone();
            move || {
                if req.begin() {
                    req.complete(Ok(()));
                    true
                } else {
                    false
                }
            }
        });

        let canceled = req.cancel();
        let started = disk.join().unwrap();
        assert_ne!(canceled, started, "exactly one of `cancel` and `begin` wins");
        assert_eq!(req.wait(), Ok(()));
        let expected = if canceled { State::Canceled } else { State::Done };
        assert_eq!(req.state(), expected);
    });
}
