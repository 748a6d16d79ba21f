#![forbid(unsafe_code)]

//! Subscription handles.
//!
//! A [`Subscription`] is an RAII guard: dropping it disposes the registration
//! it guards. Call [`Subscription::detach`] to let a registration live until
//! its stream completes instead.
//!
//! [`CompositeSubscription`] disposes a group together, and
//! [`SerialSubscription`] holds at most one registration at a time, disposing
//! the previous one whenever a new one is set.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// RAII guard for a stream registration.
#[must_use = "dropping a Subscription disposes it immediately; call detach() to keep it"]
pub struct Subscription {
    disposer: Option<Box<dyn FnOnce()>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.disposer.is_some())
            .finish()
    }
}

impl Subscription {
    /// Guard that runs `disposer` exactly once, on dispose or drop.
    pub fn new(disposer: impl FnOnce() + 'static) -> Self {
        Self {
            disposer: Some(Box::new(disposer)),
        }
    }

    /// A handle with nothing to dispose.
    pub fn empty() -> Self {
        Self { disposer: None }
    }

    /// Dispose now. Equivalent to dropping the handle.
    pub fn dispose(mut self) {
        self.run();
    }

    /// Give up the handle without disposing. The registration stays alive
    /// until its source completes or is dropped.
    pub fn detach(mut self) {
        self.disposer = None;
    }

    /// True while dropping this handle would still dispose something.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.disposer.is_some()
    }

    fn run(&mut self) {
        if let Some(disposer) = self.disposer.take() {
            disposer();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

/// A bag of subscriptions disposed together.
#[derive(Debug, Default)]
#[must_use]
pub struct CompositeSubscription {
    members: Vec<Subscription>,
}

impl CompositeSubscription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member.
    pub fn push(&mut self, subscription: Subscription) {
        self.members.push(subscription);
    }

    /// Number of held members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Collapse the bag into a single handle.
    pub fn into_subscription(self) -> Subscription {
        if self.members.is_empty() {
            return Subscription::empty();
        }
        Subscription::new(move || drop(self))
    }
}

impl Drop for CompositeSubscription {
    fn drop(&mut self) {
        // Dispose in registration order.
        for sub in self.members.drain(..) {
            sub.dispose();
        }
    }
}

impl Extend<Subscription> for CompositeSubscription {
    fn extend<I: IntoIterator<Item = Subscription>>(&mut self, iter: I) {
        self.members.extend(iter);
    }
}

#[derive(Default)]
struct SerialState {
    generation: u64,
    current: Option<Subscription>,
}

/// Holds at most one subscription. Setting a new one disposes the previous
/// one first (last writer wins).
///
/// Cloning creates a new handle to the **same** slot.
#[derive(Clone, Default)]
pub struct SerialSubscription {
    state: Rc<RefCell<SerialState>>,
}

impl fmt::Debug for SerialSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SerialSubscription")
            .field("generation", &state.generation)
            .field("occupied", &state.current.is_some())
            .finish()
    }
}

impl SerialSubscription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispose the current occupant and reserve the slot for a new one.
    ///
    /// Returns the generation the next [`fill`](Self::fill) must present.
    /// Disposal happens outside the borrow, so a disposer may touch the slot.
    pub fn replace(&self) -> u64 {
        let (generation, previous) = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            (state.generation, state.current.take())
        };
        drop(previous);
        generation
    }

    /// Store `subscription` if `generation` is still current; otherwise the
    /// slot was claimed again meanwhile and `subscription` is disposed.
    pub fn fill(&self, generation: u64, subscription: Subscription) {
        let rejected = {
            let mut state = self.state.borrow_mut();
            if state.generation == generation {
                state.current = Some(subscription);
                None
            } else {
                Some(subscription)
            }
        };
        drop(rejected);
    }

    /// Replace the occupant in one step. Returns the new generation.
    pub fn set(&self, subscription: Subscription) -> u64 {
        let generation = self.replace();
        self.fill(generation, subscription);
        generation
    }

    /// Dispose the occupant only if it is still the one stored at
    /// `generation`.
    pub fn clear_if(&self, generation: u64) {
        let taken = {
            let mut state = self.state.borrow_mut();
            if state.generation == generation {
                state.current.take()
            } else {
                None
            }
        };
        drop(taken);
    }

    /// Dispose whatever occupies the slot.
    pub fn clear(&self) {
        let taken = self.state.borrow_mut().current.take();
        drop(taken);
    }

    /// Current generation counter.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.state.borrow().current.is_some()
    }
}
