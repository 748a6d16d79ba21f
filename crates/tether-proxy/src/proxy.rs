#![forbid(unsafe_code)]

//! The generic delegate proxy.
//!
//! A [`DelegateProxy<H>`] is the engine embedded in every concrete proxy
//! type. The concrete type implements the host's delegate contract and
//! routes each callback through [`DelegateProxy::intercept`], which
//!
//! 1. forwards to the current forwarded delegate, if it implements the call,
//! 2. publishes the payload on the callback's subject, if anyone asked for
//!    that stream.
//!
//! Forwarding always happens first, so observers see the delegate's side
//! effects for the same callback.
//!
//! # State machine
//!
//! ```text
//!   Installed ──set_forward_delegate──▶ Forwarding
//!       ▲                                   │
//!       └──── dispose / delegate dropped ───┘
//!       │                                   │
//!       └──────── host teardown ──▶ TornDown ◀┘   (terminal)
//! ```
//!
//! # Failure Modes
//!
//! - **Panicking delegate**: a panic inside a forwarded call unwinds through
//!   the proxy untouched. The payload of that callback is not published.
//! - **Dropped delegate**: the forwarded delegate is held weakly. Once its
//!   owner drops it, forwarding silently stops and the slot is cleared.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tether_core::{Observable, ProxyConfig, Subject, Subscription};

use crate::selector::{Selector, SubjectKey};
use crate::slot::HasDelegate;

/// Lifecycle state of an installed proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyState {
    /// In the host's slot, no forwarded delegate.
    Installed,
    /// In the host's slot, forwarding to a live delegate.
    Forwarding,
    /// The host was destroyed; every subject is complete.
    TornDown,
}

/// Subject with its payload type erased, so one proxy can hold subjects for
/// callbacks with different payloads.
trait ErasedSubject {
    fn complete(&self);
    fn observer_count(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
}

impl<P: Clone + 'static> ErasedSubject for Subject<P> {
    fn complete(&self) {
        self.on_completed();
    }

    fn observer_count(&self) -> usize {
        Subject::observer_count(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct SubjectEntry {
    key: SubjectKey,
    subject: Box<dyn ErasedSubject>,
}

/// The forwarding target, shared with the handles returned by
/// [`DelegateProxy::set_forward_delegate`].
struct ForwardSlot<D: ?Sized> {
    target: RefCell<Option<Weak<D>>>,
    generation: Cell<u64>,
}

impl<D: ?Sized> ForwardSlot<D> {
    fn clear_if(&self, generation: u64) {
        if self.generation.get() == generation {
            self.target.borrow_mut().take();
        }
    }
}

/// Shared engine of every delegate proxy for hosts of type `H`.
///
/// # Invariants
///
/// 1. One subject per selector, created on first request.
/// 2. Each subject completes at most once, when the host is torn down.
/// 3. The host and the forwarded delegate are held weakly.
/// 4. Replacing the forwarded delegate never touches the subjects, so live
///    subscriptions survive it.
/// 5. Only the host's deallocation tears the proxy down; application code
///    cannot:
///
/// ```compile_fail
/// fn end<H: tether_proxy::HasDelegate>(proxy: &tether_proxy::DelegateProxy<H>) {
///     proxy.tear_down();
/// }
/// ```
pub struct DelegateProxy<H: HasDelegate> {
    host: Weak<H>,
    forward: Rc<ForwardSlot<H::Delegate>>,
    subjects: RefCell<Vec<SubjectEntry>>,
    torn_down: Cell<bool>,
    config: ProxyConfig,
    teardown: RefCell<Option<Subscription>>,
}

impl<H: HasDelegate> fmt::Debug for DelegateProxy<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subjects = self.subjects.borrow();
        f.debug_struct("DelegateProxy")
            .field("host", &std::any::type_name::<H>())
            .field("state", &self.state())
            .field(
                "streams",
                &subjects.iter().map(|e| e.key.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<H: HasDelegate> DelegateProxy<H> {
    /// Engine for a proxy of `host`. Installation into the host's slot is
    /// the registry's job.
    #[must_use]
    pub fn new(host: &Rc<H>, config: ProxyConfig) -> Self {
        Self {
            host: Rc::downgrade(host),
            forward: Rc::new(ForwardSlot {
                target: RefCell::new(None),
                generation: Cell::new(0),
            }),
            subjects: RefCell::new(Vec::new()),
            torn_down: Cell::new(false),
            config,
            teardown: RefCell::new(None),
        }
    }

    /// The host, while it is alive.
    #[must_use]
    pub fn host(&self) -> Option<Rc<H>> {
        self.host.upgrade()
    }

    #[must_use]
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> ProxyState {
        if self.torn_down.get() {
            ProxyState::TornDown
        } else if self.forward_delegate().is_some() {
            ProxyState::Forwarding
        } else {
            ProxyState::Installed
        }
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down.get()
    }

    /// Forward every intercepted call to `delegate` from now on, replacing
    /// any previous target.
    ///
    /// The proxy does not keep `delegate` alive. Disposing the returned
    /// handle clears the target, unless another delegate replaced it in the
    /// meantime. Use [`Subscription::detach`] to keep the delegate installed
    /// until it is replaced or dropped.
    ///
    /// A torn-down proxy ignores the call and returns an inert handle.
    pub fn set_forward_delegate(&self, delegate: &Rc<H::Delegate>) -> Subscription {
        if self.torn_down.get() {
            return Subscription::empty();
        }
        let generation = self.forward.generation.get() + 1;
        self.forward.generation.set(generation);
        *self.forward.target.borrow_mut() = Some(Rc::downgrade(delegate));
        tracing::debug!(
            host = std::any::type_name::<H>(),
            generation,
            "forward delegate set"
        );

        let forward = Rc::downgrade(&self.forward);
        Subscription::new(move || {
            if let Some(forward) = forward.upgrade() {
                forward.clear_if(generation);
            }
        })
    }

    /// Stop forwarding. No effect once torn down.
    pub fn clear_forward_delegate(&self) {
        if self.torn_down.get() {
            return;
        }
        let generation = self.forward.generation.get() + 1;
        self.forward.generation.set(generation);
        self.forward.target.borrow_mut().take();
        tracing::debug!(host = std::any::type_name::<H>(), "forward delegate cleared");
    }

    /// The forwarded delegate, if one is set and still alive.
    ///
    /// A target whose owner dropped it is cleared here.
    #[must_use]
    pub fn forward_delegate(&self) -> Option<Rc<H::Delegate>> {
        let mut target = self.forward.target.borrow_mut();
        let upgraded = target.as_ref().and_then(Weak::upgrade);
        if upgraded.is_none() && target.take().is_some() {
            tracing::debug!(
                host = std::any::type_name::<H>(),
                "forward delegate released by its owner"
            );
        }
        upgraded
    }

    /// Stream of payloads for `selector`, backed by a subject shared by every
    /// subscriber.
    ///
    /// After teardown this returns a stream that completes immediately.
    pub fn stream<P: Clone + 'static>(&self, selector: Selector<P>) -> Observable<P> {
        if self.torn_down.get() {
            return Observable::empty();
        }
        self.subject(selector, true)
            .map_or_else(Observable::empty, |s| s.as_observable())
    }

    /// Number of subscribers currently attached to `selector`'s subject.
    #[must_use]
    pub fn subscriber_count<P: Clone + 'static>(&self, selector: Selector<P>) -> usize {
        let key = selector.key();
        self.subjects
            .borrow()
            .iter()
            .find(|e| e.key == key)
            .map_or(0, |e| e.subject.observer_count())
    }

    /// Publish one payload on `selector`'s subject.
    ///
    /// `payload` is only evaluated when the subject exists, so callbacks
    /// nobody observes cost nothing beyond the lookup.
    pub fn publish<P: Clone + 'static>(&self, selector: Selector<P>, payload: impl FnOnce() -> P) {
        if self.torn_down.get() {
            return;
        }
        let Some(subject) = self.subject(selector, false) else {
            return;
        };
        if self.config.log_events {
            tracing::trace!(
                callback = selector.name(),
                observers = subject.observer_count(),
                "publish"
            );
        }
        subject.on_next(payload());
    }

    /// Handle one callback from the host: forward, then publish.
    ///
    /// `forward` receives the forwarded delegate and returns `None` when the
    /// delegate does not implement the callback; in that case nothing is
    /// called on it. The delegate's answer is returned to the caller.
    pub fn intercept<P, R>(
        &self,
        selector: Selector<P>,
        payload: impl FnOnce() -> P,
        forward: impl FnOnce(&H::Delegate) -> Option<R>,
    ) -> Option<R>
    where
        P: Clone + 'static,
    {
        // No borrow is held while the delegate runs; it may re-enter the proxy.
        let answer = self
            .forward_delegate()
            .and_then(|delegate| forward(&*delegate));
        if self.config.log_events {
            tracing::trace!(
                callback = selector.name(),
                forwarded = answer.is_some(),
                "intercept"
            );
        }
        self.publish(selector, payload);
        answer
    }

    /// Keep `subscription` alive for as long as the proxy; used for the
    /// deallocation wiring.
    pub(crate) fn attach_teardown(&self, subscription: Subscription) {
        let previous = self.teardown.borrow_mut().replace(subscription);
        drop(previous);
    }

    /// Complete every subject and enter [`ProxyState::TornDown`].
    ///
    /// Runs only when the host's deallocation signal fires, so streams
    /// complete exactly when the host goes away. Idempotent.
    pub(crate) fn tear_down(&self) {
        if self.torn_down.replace(true) {
            return;
        }
        let subjects = std::mem::take(&mut *self.subjects.borrow_mut());
        tracing::debug!(
            host = std::any::type_name::<H>(),
            streams = subjects.len(),
            "delegate proxy torn down"
        );
        for entry in &subjects {
            entry.subject.complete();
        }
        self.forward.target.borrow_mut().take();
        let teardown = self.teardown.borrow_mut().take();
        if let Some(sub) = teardown {
            sub.detach();
        }
    }

    fn subject<P: Clone + 'static>(&self, selector: Selector<P>, create: bool) -> Option<Subject<P>> {
        let key = selector.key();
        let mut subjects = self.subjects.borrow_mut();
        if let Some(entry) = subjects.iter().find(|e| e.key == key) {
            return entry.subject.as_any().downcast_ref::<Subject<P>>().cloned();
        }
        if !create {
            return None;
        }
        let subject = Subject::<P>::new();
        subjects.push(SubjectEntry {
            key,
            subject: Box::new(subject.clone()),
        });
        Some(subject)
    }
}
