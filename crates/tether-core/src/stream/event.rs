#![forbid(unsafe_code)]

//! Stream events and observers.
//!
//! An [`Observer`] is the receiving end of a stream. It accepts any number of
//! [`Event::Next`] values followed by at most one [`Event::Completed`]. Once
//! an observer has stopped (completed, or silenced by disposal), every further
//! event is dropped.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// A single event delivered on a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event<T> {
    /// A value.
    Next(T),
    /// Terminal completion. Nothing follows it.
    Completed,
}

impl<T> Event<T> {
    /// True for [`Event::Completed`].
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// The carried value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Next(v) => Some(v),
            Self::Completed => None,
        }
    }

    /// Map the carried value, keeping completion as-is.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Event<U> {
        match self {
            Self::Next(v) => Event::Next(f(v)),
            Self::Completed => Event::Completed,
        }
    }
}

struct ObserverInner<T> {
    on_event: Box<dyn Fn(Event<T>)>,
    stopped: Cell<bool>,
}

/// Receiving end of a stream with at-most-one-terminal-event semantics.
///
/// Cloning an `Observer` yields another handle to the **same** sink: stopping
/// one handle stops all of them.
pub struct Observer<T> {
    inner: Rc<ObserverInner<T>>,
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Observer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("stopped", &self.inner.stopped.get())
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Observer<T> {
    /// Observer driven by a single event callback.
    pub fn new(on_event: impl Fn(Event<T>) + 'static) -> Self {
        Self {
            inner: Rc::new(ObserverInner {
                on_event: Box::new(on_event),
                stopped: Cell::new(false),
            }),
        }
    }

    /// Observer built from separate value and completion callbacks.
    pub fn from_fns(on_next: impl Fn(T) + 'static, on_completed: impl Fn() + 'static) -> Self {
        Self::new(move |event| match event {
            Event::Next(v) => on_next(v),
            Event::Completed => on_completed(),
        })
    }

    /// Deliver an event. Values after the terminal event are dropped.
    pub fn on(&self, event: Event<T>) {
        if self.inner.stopped.get() {
            return;
        }
        if event.is_completed() {
            self.inner.stopped.set(true);
        }
        (self.inner.on_event)(event);
    }

    /// Deliver a value.
    pub fn on_next(&self, value: T) {
        self.on(Event::Next(value));
    }

    /// Deliver the terminal event. Only the first call has an effect.
    pub fn on_completed(&self) {
        self.on(Event::Completed);
    }

    /// True once the observer completed or was silenced.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.get()
    }

    /// Stop without emitting a terminal event. Used on unsubscribe, so an
    /// in-flight emission skips this observer.
    pub fn silence(&self) {
        self.inner.stopped.set(true);
    }
}
