#![forbid(unsafe_code)]

//! Cold observable streams and operators.
//!
//! An [`Observable<T>`] is a recipe: every subscription runs the subscribe
//! function again for the new observer. Hot sources ([`Subject`]) expose
//! themselves through the same type via [`Subject::as_observable`].
//!
//! All operators are synchronous. Nothing here queues, buffers or reorders
//! events.
//!
//! [`Subject`]: super::Subject
//! [`Subject::as_observable`]: super::Subject::as_observable

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::event::{Event, Observer};
use super::subscription::{CompositeSubscription, Subscription};

type SubscribeFn<T> = dyn Fn(Observer<T>) -> Subscription;

/// A push-based stream of `T` values terminated by at most one completion.
///
/// Cloning shares the subscribe function, so clones compare equal under
/// [`Observable::ptr_eq`].
pub struct Observable<T> {
    source: Rc<SubscribeFn<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Build an observable from a subscribe function.
    pub fn create(subscribe: impl Fn(Observer<T>) -> Subscription + 'static) -> Self {
        Self {
            source: Rc::new(subscribe),
        }
    }

    /// Emit `value`, then complete.
    pub fn just(value: T) -> Self {
        Self::create(move |observer| {
            observer.on_next(value.clone());
            observer.on_completed();
            Subscription::empty()
        })
    }

    /// Emit each value in order, then complete.
    pub fn of(values: impl IntoIterator<Item = T>) -> Self {
        let values: Rc<[T]> = values.into_iter().collect();
        Self::create(move |observer| {
            for v in values.iter() {
                if observer.is_stopped() {
                    break;
                }
                observer.on_next(v.clone());
            }
            observer.on_completed();
            Subscription::empty()
        })
    }

    /// Complete immediately.
    pub fn empty() -> Self {
        Self::create(|observer| {
            observer.on_completed();
            Subscription::empty()
        })
    }

    /// Never emit anything.
    pub fn never() -> Self {
        Self::create(|_| Subscription::empty())
    }

    /// Build the actual observable at subscription time.
    pub fn deferred(factory: impl Fn() -> Observable<T> + 'static) -> Self {
        Self::create(move |observer| factory().subscribe_observer(observer))
    }

    /// True when both handles share the same subscribe function.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.source, &b.source)
    }

    /// Subscribe an observer.
    pub fn subscribe_observer(&self, observer: Observer<T>) -> Subscription {
        (self.source)(observer)
    }

    /// Subscribe to values only.
    pub fn subscribe(&self, on_next: impl Fn(T) + 'static) -> Subscription {
        self.subscribe_observer(Observer::from_fns(on_next, || {}))
    }

    /// Subscribe to values and completion.
    pub fn subscribe_with(
        &self,
        on_next: impl Fn(T) + 'static,
        on_completed: impl Fn() + 'static,
    ) -> Subscription {
        self.subscribe_observer(Observer::from_fns(on_next, on_completed))
    }

    /// Transform each value.
    pub fn map<U: Clone + 'static>(&self, f: impl Fn(T) -> U + 'static) -> Observable<U> {
        let source = self.clone();
        let f = Rc::new(f);
        Observable::create(move |observer: Observer<U>| {
            let f = Rc::clone(&f);
            source.subscribe_observer(Observer::new(move |event: Event<T>| {
                observer.on(event.map(|v| f(v)));
            }))
        })
    }

    /// Keep only values matching `predicate`.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool + 'static) -> Observable<T> {
        let source = self.clone();
        let predicate = Rc::new(predicate);
        Observable::create(move |observer: Observer<T>| {
            let predicate = Rc::clone(&predicate);
            source.subscribe_observer(Observer::new(move |event: Event<T>| match event {
                Event::Next(v) if !predicate(&v) => {}
                other => observer.on(other),
            }))
        })
    }

    /// Run a side effect for each value before passing it on.
    pub fn inspect(&self, f: impl Fn(&T) + 'static) -> Observable<T> {
        let source = self.clone();
        let f = Rc::new(f);
        Observable::create(move |observer: Observer<T>| {
            let f = Rc::clone(&f);
            source.subscribe_observer(Observer::new(move |event: Event<T>| {
                if let Event::Next(v) = &event {
                    f(v);
                }
                observer.on(event);
            }))
        })
    }

    /// Emit `value` on subscription, then the source's events.
    pub fn start_with(&self, value: T) -> Observable<T> {
        let source = self.clone();
        Observable::create(move |observer: Observer<T>| {
            observer.on_next(value.clone());
            if observer.is_stopped() {
                return Subscription::empty();
            }
            source.subscribe_observer(observer)
        })
    }

    /// Mirror the source until `trigger` produces its first event of any
    /// kind, then complete and dispose the source subscription.
    pub fn take_until<U: Clone + 'static>(&self, trigger: &Observable<U>) -> Observable<T> {
        let source = self.clone();
        let trigger = trigger.clone();
        Observable::create(move |observer: Observer<T>| {
            let upstream: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

            let stop_observer = observer.clone();
            let stop_upstream = Rc::clone(&upstream);
            let trigger_sub = trigger.subscribe_observer(Observer::new(move |_: Event<U>| {
                stop_observer.on_completed();
                let taken = stop_upstream.borrow_mut().take();
                drop(taken);
            }));
            if observer.is_stopped() {
                return trigger_sub;
            }

            let source_sub = source.subscribe_observer(observer);
            *upstream.borrow_mut() = Some(source_sub);

            let mut bag = CompositeSubscription::new();
            bag.push(trigger_sub);
            bag.push(Subscription::new(move || {
                let taken = upstream.borrow_mut().take();
                drop(taken);
            }));
            bag.into_subscription()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::Subject;

    fn collect<T: Clone + 'static>(obs: &Observable<T>) -> (Rc<RefCell<Vec<Event<T>>>>, Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let sub = obs.subscribe_observer(Observer::new(move |e| sink.borrow_mut().push(e)));
        (log, sub)
    }

    #[test]
    fn just_emits_and_completes() {
        let (log, _sub) = collect(&Observable::just(false));
        assert_eq!(*log.borrow(), vec![Event::Next(false), Event::Completed]);
    }

    #[test]
    fn of_preserves_order() {
        let (log, _sub) = collect(&Observable::of([1, 2, 3]));
        assert_eq!(
            *log.borrow(),
            vec![Event::Next(1), Event::Next(2), Event::Next(3), Event::Completed]
        );
    }

    #[test]
    fn each_subscription_replays_cold_source() {
        let obs = Observable::of(["a", "b"]);
        let (first, _s1) = collect(&obs);
        let (second, _s2) = collect(&obs);
        assert_eq!(*first.borrow(), *second.borrow());
    }

    #[test]
    fn empty_and_never() {
        let (log, _s) = collect(&Observable::<u8>::empty());
        assert_eq!(*log.borrow(), vec![Event::Completed]);
        let (log, _s) = collect(&Observable::<u8>::never());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn map_filter_inspect_chain() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let obs = Observable::of(1..=6)
            .inspect(move |v| s.borrow_mut().push(*v))
            .filter(|v| v % 2 == 0)
            .map(|v| v * 10);
        let (log, _sub) = collect(&obs);
        assert_eq!(
            *log.borrow(),
            vec![
                Event::Next(20),
                Event::Next(40),
                Event::Next(60),
                Event::Completed
            ]
        );
        assert_eq!(*seen.borrow(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn start_with_prepends() {
        let subject = Subject::new();
        let (log, _sub) = collect(&subject.as_observable().start_with(0));
        subject.on_next(1);
        assert_eq!(*log.borrow(), vec![Event::Next(0), Event::Next(1)]);
    }

    #[test]
    fn deferred_builds_at_subscribe_time() {
        let counter = Rc::new(std::cell::Cell::new(0));
        let c = Rc::clone(&counter);
        let obs = Observable::deferred(move || {
            c.set(c.get() + 1);
            Observable::just(c.get())
        });
        assert_eq!(counter.get(), 0);
        let (log, _sub) = collect(&obs);
        assert_eq!(log.borrow()[0], Event::Next(1));
        let (log, _sub) = collect(&obs);
        assert_eq!(log.borrow()[0], Event::Next(2));
    }

    #[test]
    fn take_until_completes_on_trigger_completion() {
        let source = Subject::new();
        let trigger = Subject::<()>::new();
        let (log, _sub) = collect(&source.as_observable().take_until(&trigger.as_observable()));

        source.on_next(1);
        trigger.on_completed();
        source.on_next(2);

        assert_eq!(*log.borrow(), vec![Event::Next(1), Event::Completed]);
        assert_eq!(source.observer_count(), 0);
    }

    #[test]
    fn take_until_completes_on_trigger_value() {
        let source = Subject::new();
        let trigger = Subject::new();
        let (log, _sub) = collect(&source.as_observable().take_until(&trigger.as_observable()));

        trigger.on_next(());
        source.on_next(1);
        assert_eq!(*log.borrow(), vec![Event::<i32>::Completed]);
    }

    #[test]
    fn take_until_with_completed_trigger_never_subscribes_source() {
        let source = Subject::<i32>::new();
        let (log, _sub) = collect(&source.as_observable().take_until(&Observable::<()>::empty()));
        assert_eq!(*log.borrow(), vec![Event::Completed]);
        assert_eq!(source.observer_count(), 0);
    }

    #[test]
    fn dispose_take_until_releases_both_sides() {
        let source = Subject::<i32>::new();
        let trigger = Subject::<()>::new();
        let (_log, sub) = collect(&source.as_observable().take_until(&trigger.as_observable()));
        assert_eq!(source.observer_count(), 1);
        assert_eq!(trigger.observer_count(), 1);
        sub.dispose();
        assert_eq!(source.observer_count(), 0);
        assert_eq!(trigger.observer_count(), 0);
    }

    #[test]
    fn ptr_eq_tracks_identity() {
        let a = Observable::just(1);
        let b = a.clone();
        let c = Observable::just(1);
        assert!(Observable::ptr_eq(&a, &b));
        assert!(!Observable::ptr_eq(&a, &c));
    }
}
