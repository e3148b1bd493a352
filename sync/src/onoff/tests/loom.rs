use super::*;
use crate::loom::{self, sync::Arc, thread};

#[test]
fn turn_on_wakes_waiter() {
    loom::model(|| {
        let switch = Arc::new(OnOffSwitch::new());
        let thread = thread::spawn({
            let switch = switch.clone();
            move || {
                switch.turn_on();
            }
        });

        switch.wait_for_on();
        assert!(switch.is_on());
        thread.join().unwrap();
    });
}

#[test]
fn concurrent_turn_on_fires_once() {
    loom::model(|| {
        let switch = Arc::new(OnOffSwitch::new());
        let threads = (0..2)
            .map(|_| {
                let switch = switch.clone();
                thread::spawn(move || switch.turn_on())
            })
            .collect::<Vec<_>>();

        switch.wait_for_on();

        let fired = threads
            .into_iter()
            .map(|thread| thread.join().unwrap())
            .filter(|&fired| fired)
            .count();
        assert_eq!(test_dbg!(fired), 1, "exactly one `turn_on` call flips the switch");
    });
}
