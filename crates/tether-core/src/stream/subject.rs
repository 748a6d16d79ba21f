#![forbid(unsafe_code)]

//! Multicast subject.
//!
//! # Design
//!
//! [`Subject<T>`] keeps its observers in shared, reference-counted storage
//! (`Rc<RefCell<..>>`). Each value is cloned once per live observer and
//! delivered in registration order.
//!
//! # Performance
//!
//! | Operation     | Complexity                 |
//! |---------------|----------------------------|
//! | `on_next()`   | O(S) where S = observers   |
//! | `subscribe()` | O(1) amortized             |
//! | unsubscribe   | O(S)                       |
//!
//! # Failure Modes
//!
//! - **Re-entrant emission**: Emitting from inside an observer callback is
//!   allowed. The inner emission is delivered to the observer snapshot taken
//!   at that point, before the outer emission finishes.
//! - **Late subscriber**: Subscribing after completion delivers the
//!   completion immediately and registers nothing.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::event::{Event, Observer};
use super::observable::Observable;
use super::subscription::Subscription;

struct SubjectInner<T> {
    observers: Vec<(u64, Observer<T>)>,
    next_id: u64,
    completed: bool,
}

/// A hot, multicast stream that is also an observer.
///
/// Cloning a `Subject` creates a new handle to the **same** inner state.
///
/// # Invariants
///
/// 1. Observers are notified in registration order.
/// 2. At most one completion is ever delivered; values after it are dropped.
/// 3. An observer whose subscription was disposed receives nothing further,
///    even when disposal happens in the middle of an emission.
pub struct Subject<T> {
    inner: Rc<RefCell<SubjectInner<T>>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Subject")
            .field("observer_count", &inner.observers.len())
            .field("completed", &inner.completed)
            .finish()
    }
}

impl<T: Clone + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Subject<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SubjectInner {
                observers: Vec::new(),
                next_id: 0,
                completed: false,
            })),
        }
    }

    /// A subject that has already completed.
    #[must_use]
    pub fn completed() -> Self {
        let subject = Self::new();
        subject.on_completed();
        subject
    }

    /// Register an observer.
    pub fn subscribe(&self, observer: Observer<T>) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            if inner.completed {
                None
            } else {
                let id = inner.next_id;
                inner.next_id += 1;
                inner.observers.push((id, observer.clone()));
                Some(id)
            }
        };
        let Some(id) = id else {
            observer.on_completed();
            return Subscription::empty();
        };

        let weak: Weak<RefCell<SubjectInner<T>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            observer.silence();
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().observers.retain(|(oid, _)| *oid != id);
            }
        })
    }

    /// Emit a value to every live observer.
    pub fn on_next(&self, value: T) {
        // Snapshot first so observers can subscribe or dispose re-entrantly.
        let observers: Vec<Observer<T>> = {
            let inner = self.inner.borrow();
            if inner.completed {
                return;
            }
            inner.observers.iter().map(|(_, o)| o.clone()).collect()
        };
        for observer in &observers {
            observer.on_next(value.clone());
        }
    }

    /// Complete the subject. Only the first call has an effect.
    pub fn on_completed(&self) {
        let observers = {
            let mut inner = self.inner.borrow_mut();
            if inner.completed {
                return;
            }
            inner.completed = true;
            std::mem::take(&mut inner.observers)
        };
        for (_, observer) in observers {
            observer.on_completed();
        }
    }

    /// Forward a generic event.
    pub fn on(&self, event: Event<T>) {
        match event {
            Event::Next(v) => self.on_next(v),
            Event::Completed => self.on_completed(),
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.inner.borrow().completed
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    /// Read-only view of this subject.
    #[must_use]
    pub fn as_observable(&self) -> Observable<T> {
        let subject = self.clone();
        Observable::create(move |observer| subject.subscribe(observer))
    }

    /// An observer that feeds this subject.
    #[must_use]
    pub fn as_observer(&self) -> Observer<T> {
        let subject = self.clone();
        Observer::new(move |event| subject.on(event))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
