//! Property-based invariant tests for the virtual-time scheduler.
//!
//! 1. Actions run in nondecreasing time order; ties keep scheduling order.
//! 2. The clock never moves backwards.
//! 3. A hot stream observed through `start` records exactly the events
//!    after the subscription and up to the disposal, with their scheduled
//!    times. Hot events queued first win ties at both ends.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use tether_core::Event;
use tether_harness::{DISPOSED, Recorded, SUBSCRIBED, TestScheduler, next};

// 1 + 2. Ordering and monotonic clock

proptest! {
    #[test]
    fn actions_run_in_time_order(times in proptest::collection::vec(0u64..=500, 0..=64)) {
        let scheduler = TestScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (seq, &time) in times.iter().enumerate() {
            let log = Rc::clone(&log);
            let s = scheduler.clone();
            scheduler.schedule_at(time, move || log.borrow_mut().push((s.now(), seq)));
        }
        scheduler.run();

        let log = log.borrow();
        prop_assert_eq!(log.len(), times.len());
        for pair in log.windows(2) {
            prop_assert!(pair[0] <= pair[1], "out of order: {:?}", pair);
        }
        for &(now, seq) in log.iter() {
            prop_assert_eq!(now, times[seq]);
        }
    }
}

// 3. Subscription window

proptest! {
    #[test]
    fn start_records_window(times in proptest::collection::btree_set(1u64..=1500, 0..=32)) {
        let scheduler = TestScheduler::new();
        let events: Vec<Recorded<Event<u64>>> = times.iter().map(|&t| next(t, t)).collect();
        let hot = scheduler.create_hot_observable(events);
        let source = hot.as_observable();
        let recorder = scheduler.start(move || source);

        let expected: Vec<Recorded<Event<u64>>> = times
            .iter()
            .filter(|&&t| t > SUBSCRIBED && t <= DISPOSED)
            .map(|&t| next(t, t))
            .collect();
        prop_assert_eq!(recorder.events(), expected);
    }
}
