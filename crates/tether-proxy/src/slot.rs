#![forbid(unsafe_code)]

//! The host side of the contract: one weak delegate slot.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tether_core::Anchor;

/// A single-occupant, non-owning delegate slot.
///
/// The slot never keeps its occupant alive: whoever assigns a delegate stays
/// its owner.
pub struct DelegateSlot<D: ?Sized> {
    occupant: RefCell<Option<Weak<D>>>,
}

impl<D: ?Sized> Default for DelegateSlot<D> {
    fn default() -> Self {
        Self {
            occupant: RefCell::new(None),
        }
    }
}

impl<D: ?Sized> fmt::Debug for DelegateSlot<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateSlot")
            .field("occupied", &self.get().is_some())
            .finish()
    }
}

impl<D: ?Sized> DelegateSlot<D> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current occupant, if it is still alive.
    #[must_use]
    pub fn get(&self) -> Option<Rc<D>> {
        self.occupant.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Replace the occupant.
    pub fn set(&self, delegate: Option<&Rc<D>>) {
        *self.occupant.borrow_mut() = delegate.map(Rc::downgrade);
    }

    /// True when `candidate` is the live occupant.
    #[must_use]
    pub fn holds(&self, candidate: &Rc<D>) -> bool {
        self.get().is_some_and(|current| same_object(&current, candidate))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.get().is_none()
    }
}

/// Object identity for possibly-unsized pointees, ignoring vtables.
#[must_use]
pub fn same_object<D: ?Sized>(a: &Rc<D>, b: &Rc<D>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// A host exposing exactly one delegate slot.
///
/// The host must also be an [`Anchor`], so the proxy can live in its
/// attachment registry and learn about its teardown.
pub trait HasDelegate: Anchor + 'static {
    /// The delegate contract, usually a `dyn Trait`.
    type Delegate: ?Sized + 'static;

    fn delegate_slot(&self) -> &DelegateSlot<Self::Delegate>;
}
