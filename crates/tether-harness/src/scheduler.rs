#![forbid(unsafe_code)]

//! Virtual-time scheduler for stream tests.
//!
//! Nothing runs on its own: actions are queued at a virtual time and the
//! test drives the clock with [`TestScheduler::advance_to`] or
//! [`TestScheduler::run`]. Actions at the same time run in scheduling order.
//!
//! [`TestScheduler::start`] follows the usual lifecycle convention: the
//! stream is created at [`CREATED`], subscribed at [`SUBSCRIBED`] and
//! disposed at [`DISPOSED`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tether_core::{Event, Observable, Subject, Subscription};

use crate::recorder::{Recorded, TestObserver, VirtualTime};

/// Time at which [`TestScheduler::start`] creates the stream.
pub const CREATED: VirtualTime = 100;
/// Time at which [`TestScheduler::start`] subscribes.
pub const SUBSCRIBED: VirtualTime = 200;
/// Time at which [`TestScheduler::start`] disposes the subscription.
pub const DISPOSED: VirtualTime = 1000;

struct ScheduledAction {
    time: VirtualTime,
    seq: u64,
    action: Box<dyn FnOnce()>,
}

struct SchedulerInner {
    clock: Cell<VirtualTime>,
    next_seq: Cell<u64>,
    queue: RefCell<Vec<ScheduledAction>>,
}

impl SchedulerInner {
    /// Remove and return the earliest action due at or before `limit`.
    fn pop_due(&self, limit: VirtualTime) -> Option<ScheduledAction> {
        let mut queue = self.queue.borrow_mut();
        let index = queue
            .iter()
            .enumerate()
            .filter(|(_, a)| a.time <= limit)
            .min_by_key(|(_, a)| (a.time, a.seq))
            .map(|(i, _)| i)?;
        Some(queue.swap_remove(index))
    }
}

/// Single-threaded virtual clock with an action queue.
///
/// Clones share the clock and the queue.
#[derive(Clone)]
pub struct TestScheduler {
    inner: Rc<SchedulerInner>,
}

impl fmt::Debug for TestScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestScheduler")
            .field("now", &self.inner.clock.get())
            .field("pending", &self.inner.queue.borrow().len())
            .finish()
    }
}

impl Default for TestScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TestScheduler {
    /// A scheduler at time zero with an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SchedulerInner {
                clock: Cell::new(0),
                next_seq: Cell::new(0),
                queue: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> VirtualTime {
        self.inner.clock.get()
    }

    /// Number of queued actions.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    /// Queue `action` at absolute time `time`.
    ///
    /// A time in the past runs on the next advance, at the current time.
    pub fn schedule_at(&self, time: VirtualTime, action: impl FnOnce() + 'static) {
        let seq = self.inner.next_seq.get();
        self.inner.next_seq.set(seq + 1);
        self.inner.queue.borrow_mut().push(ScheduledAction {
            time: time.max(self.now()),
            seq,
            action: Box::new(action),
        });
    }

    /// Queue `action` `delay` ticks from now.
    pub fn schedule_after(&self, delay: VirtualTime, action: impl FnOnce() + 'static) {
        self.schedule_at(self.now().saturating_add(delay), action);
    }

    /// Run every action due at or before `time`, then set the clock to `time`.
    ///
    /// Actions scheduled while advancing run too if they are due.
    pub fn advance_to(&self, time: VirtualTime) {
        while let Some(item) = self.inner.pop_due(time) {
            self.inner.clock.set(item.time);
            tracing::trace!(time = item.time, seq = item.seq, "virtual action");
            (item.action)();
        }
        if time > self.now() {
            self.inner.clock.set(time);
        }
    }

    /// Run until the queue is empty.
    pub fn run(&self) {
        while let Some(item) = self.inner.pop_due(VirtualTime::MAX) {
            self.inner.clock.set(item.time);
            tracing::trace!(time = item.time, seq = item.seq, "virtual action");
            (item.action)();
        }
    }

    /// A recorder stamping events with this scheduler's clock.
    #[must_use]
    pub fn create_observer<T: Clone + 'static>(&self) -> TestObserver<T> {
        let clock: Weak<SchedulerInner> = Rc::downgrade(&self.inner);
        TestObserver::new(move || clock.upgrade().map_or(0, |inner| inner.clock.get()))
    }

    /// A hot stream that emits `events` at their times, whether or not anyone
    /// is subscribed.
    pub fn create_hot_observable<T: Clone + 'static>(
        &self,
        events: Vec<Recorded<Event<T>>>,
    ) -> HotObservable<T> {
        let subject = Subject::new();
        for Recorded { time, value } in events {
            let subject = subject.clone();
            self.schedule_at(time, move || subject.on(value));
        }
        HotObservable {
            subject,
            scheduler: self.clone(),
            spans: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Create the stream at [`CREATED`], subscribe at [`SUBSCRIBED`], dispose
    /// at [`DISPOSED`], run to completion and return what was recorded.
    pub fn start<T: Clone + 'static>(
        &self,
        create: impl FnOnce() -> Observable<T> + 'static,
    ) -> TestObserver<T> {
        let recorder = self.create_observer();
        let stream: Rc<RefCell<Option<Observable<T>>>> = Rc::new(RefCell::new(None));
        let subscription: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let created = Rc::clone(&stream);
        self.schedule_at(CREATED, move || {
            *created.borrow_mut() = Some(create());
        });

        let source = Rc::clone(&stream);
        let sink = recorder.observer();
        let held = Rc::clone(&subscription);
        self.schedule_at(SUBSCRIBED, move || {
            let stream = source.borrow_mut().take();
            if let Some(stream) = stream {
                let sub = stream.subscribe_observer(sink);
                *held.borrow_mut() = Some(sub);
            }
        });

        self.schedule_at(DISPOSED, move || {
            let taken = subscription.borrow_mut().take();
            drop(taken);
        });

        self.run();
        recorder
    }
}

/// Subscribe and unsubscribe times of one subscription to a hot stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionSpan {
    pub subscribed: VirtualTime,
    /// `None` while the subscription is live.
    pub unsubscribed: Option<VirtualTime>,
}

impl SubscriptionSpan {
    #[must_use]
    pub const fn new(subscribed: VirtualTime, unsubscribed: VirtualTime) -> Self {
        Self {
            subscribed,
            unsubscribed: Some(unsubscribed),
        }
    }

    #[must_use]
    pub const fn open(subscribed: VirtualTime) -> Self {
        Self {
            subscribed,
            unsubscribed: None,
        }
    }
}

/// A scheduled multicast source that also logs its subscriptions.
pub struct HotObservable<T> {
    subject: Subject<T>,
    scheduler: TestScheduler,
    spans: Rc<RefCell<Vec<SubscriptionSpan>>>,
}

impl<T> fmt::Debug for HotObservable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotObservable")
            .field("subscriptions", &*self.spans.borrow())
            .finish()
    }
}

impl<T: Clone + 'static> HotObservable<T> {
    /// The stream; each subscription is logged with its virtual times.
    #[must_use]
    pub fn as_observable(&self) -> Observable<T> {
        let subject = self.subject.clone();
        let scheduler = self.scheduler.clone();
        let spans = Rc::clone(&self.spans);
        Observable::create(move |observer| {
            let index = {
                let mut spans = spans.borrow_mut();
                spans.push(SubscriptionSpan::open(scheduler.now()));
                spans.len() - 1
            };
            let inner = subject.subscribe(observer);
            let spans = Rc::clone(&spans);
            let scheduler = scheduler.clone();
            Subscription::new(move || {
                inner.dispose();
                if let Some(span) = spans.borrow_mut().get_mut(index) {
                    span.unsubscribed = Some(scheduler.now());
                }
            })
        })
    }

    /// Every subscription seen so far, in subscription order.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<SubscriptionSpan> {
        self.spans.borrow().clone()
    }

    /// Number of currently subscribed observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.subject.observer_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{completed, next};

    #[test]
    fn actions_run_in_time_then_schedule_order() {
        let scheduler = TestScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (time, tag) in [(30, 'c'), (10, 'a'), (30, 'd'), (20, 'b')] {
            let log = Rc::clone(&log);
            scheduler.schedule_at(time, move || log.borrow_mut().push(tag));
        }
        scheduler.advance_to(25);
        assert_eq!(*log.borrow(), vec!['a', 'b']);
        assert_eq!(scheduler.now(), 25);
        scheduler.run();
        assert_eq!(*log.borrow(), vec!['a', 'b', 'c', 'd']);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn nested_scheduling_runs_when_due() {
        let scheduler = TestScheduler::new();
        let hits = Rc::new(Cell::new(0));
        let s = scheduler.clone();
        let h = Rc::clone(&hits);
        scheduler.schedule_at(5, move || {
            let h = Rc::clone(&h);
            s.schedule_after(5, move || h.set(h.get() + 1));
        });
        scheduler.advance_to(10);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn start_window() {
        let scheduler = TestScheduler::new();
        let hot = scheduler.create_hot_observable(vec![
            next(150, 1),
            next(210, 2),
            next(999, 3),
            next(1001, 4),
        ]);
        let source = hot.as_observable();
        let recorder = scheduler.start(move || source.map(|v| v * 10));

        assert_eq!(recorder.events(), vec![next(210, 20), next(999, 30)]);
        assert_eq!(hot.subscriptions(), vec![SubscriptionSpan::new(SUBSCRIBED, DISPOSED)]);
        assert_eq!(hot.observer_count(), 0);
    }

    #[test]
    fn hot_completion_is_recorded() {
        let scheduler = TestScheduler::new();
        let hot = scheduler.create_hot_observable(vec![next(300, 'x'), completed(400)]);
        let source = hot.as_observable();
        let recorder = scheduler.start(move || source);
        assert_eq!(recorder.events(), vec![next(300, 'x'), completed(400)]);
    }
}
