#![forbid(unsafe_code)]

//! Time-stamped event recording.
//!
//! A [`TestObserver`] appends every event it receives, stamped with the
//! virtual time of the scheduler that created it. Expected sequences are
//! written with [`next`] and [`completed`]:
//!
//! ```
//! use tether_harness::{completed, next, Recorded};
//! use tether_core::Event;
//!
//! let expected: Vec<Recorded<Event<u32>>> = vec![next(210, 1), completed(300)];
//! assert_eq!(expected[0].value, Event::Next(1));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tether_core::{Event, Observer};

/// Virtual time in ticks.
pub type VirtualTime = u64;

/// A value observed at a virtual time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Recorded<T> {
    pub time: VirtualTime,
    pub value: T,
}

impl<T> Recorded<T> {
    #[must_use]
    pub const fn new(time: VirtualTime, value: T) -> Self {
        Self { time, value }
    }
}

/// A `Next(value)` event at `time`.
#[must_use]
pub const fn next<T>(time: VirtualTime, value: T) -> Recorded<Event<T>> {
    Recorded::new(time, Event::Next(value))
}

/// A completion at `time`.
#[must_use]
pub const fn completed<T>(time: VirtualTime) -> Recorded<Event<T>> {
    Recorded::new(time, Event::Completed)
}

/// Observer that records what it receives.
///
/// Clones share the same recording.
pub struct TestObserver<T> {
    events: Rc<RefCell<Vec<Recorded<Event<T>>>>>,
    observer: Observer<T>,
}

impl<T> Clone for TestObserver<T> {
    fn clone(&self) -> Self {
        Self {
            events: Rc::clone(&self.events),
            observer: self.observer.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for TestObserver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestObserver")
            .field("events", &*self.events.borrow())
            .finish()
    }
}

impl<T: Clone + 'static> TestObserver<T> {
    /// Recorder stamping events with `clock()`.
    pub fn new(clock: impl Fn() -> VirtualTime + 'static) -> Self {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let observer = Observer::new(move |event| {
            sink.borrow_mut().push(Recorded::new(clock(), event));
        });
        Self { events, observer }
    }

    /// The observer to subscribe with.
    #[must_use]
    pub fn observer(&self) -> Observer<T> {
        self.observer.clone()
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<Recorded<Event<T>>> {
        self.events.borrow().clone()
    }

    /// The recorded values, without times or completion.
    #[must_use]
    pub fn values(&self) -> Vec<T> {
        self.events
            .borrow()
            .iter()
            .filter_map(|r| r.value.value().cloned())
            .collect()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.events.borrow().iter().any(|r| r.value.is_completed())
    }
}
