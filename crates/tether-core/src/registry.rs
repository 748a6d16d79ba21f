#![forbid(unsafe_code)]

//! Per-object attachment registry.
//!
//! [`Attachments`] lets auxiliary state (a delegate proxy, binding slots, the
//! deallocation signal) ride along with an object without the object knowing
//! its concrete types, and without that state keeping the object alive.
//!
//! # Ownership
//!
//! ```text
//!   Rc<Host> ──owns──▶ Host { attachments, delegate slot, .. }
//!                              │
//!                              └──owns──▶ Rc<Proxy> ──weak──▶ Host
//! ```
//!
//! Entries are owned by the registry; anything that points back at the owner
//! must do so through a `Weak`. When the owner is destroyed the registry is
//! torn down: the deallocation signal completes first, then every entry is
//! released in insertion order.
//!
//! # Teardown ordering
//!
//! Teardown runs from `Drop for Attachments`. Rust drops fields in
//! declaration order, so a host that declares its `Attachments` field first
//! (or calls [`Attachments::teardown`] from its own `Drop`) gets the signal
//! while every other field is still intact.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::dealloc::DeallocSignal;
use crate::error::AttachError;

/// An object that carries an [`Attachments`] registry.
pub trait Anchor {
    fn attachments(&self) -> &Attachments;
}

impl<T: Anchor + ?Sized> Anchor for Rc<T> {
    fn attachments(&self) -> &Attachments {
        (**self).attachments()
    }
}

/// Identity of one attachment: the stored type plus a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentKey {
    type_id: TypeId,
    name: &'static str,
}

impl AttachmentKey {
    /// Key for the single attachment of type `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self::named::<T>(std::any::type_name::<T>())
    }

    /// Key for one of several attachments of type `T`, told apart by `name`.
    #[must_use]
    pub fn named<T: 'static>(name: &'static str) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

struct Entry {
    key: AttachmentKey,
    value: Rc<dyn Any>,
}

#[derive(Default)]
pub(crate) struct State {
    torn_down: bool,
    entries: Vec<Entry>,
    pub(crate) dealloc: Option<DeallocSignal>,
}

impl State {
    pub(crate) fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    fn find(&self, key: &AttachmentKey) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key == *key)
    }
}

/// Registry of state attached to one object.
///
/// # Invariants
///
/// 1. At most one entry per [`AttachmentKey`].
/// 2. After teardown nothing can be attached and every lookup misses.
/// 3. Teardown happens at most once; the deallocation signal completes
///    before any entry is released.
#[derive(Default)]
pub struct Attachments {
    pub(crate) state: RefCell<State>,
}

impl fmt::Debug for Attachments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Attachments")
            .field("entries", &state.entries.iter().map(|e| e.key.name).collect::<Vec<_>>())
            .field("torn_down", &state.torn_down)
            .finish()
    }
}

impl Attachments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry.
    #[must_use]
    pub fn get<T: 'static>(&self, key: AttachmentKey) -> Option<Rc<T>> {
        let state = self.state.borrow();
        let entry = state.find(&key)?;
        Rc::clone(&entry.value).downcast::<T>().ok()
    }

    #[must_use]
    pub fn contains(&self, key: AttachmentKey) -> bool {
        self.state.borrow().find(&key).is_some()
    }

    /// Attach `value` under `key`.
    ///
    /// # Errors
    ///
    /// [`AttachError::TornDown`] after teardown, [`AttachError::Duplicate`]
    /// when the key is taken.
    pub fn insert<T: 'static>(&self, key: AttachmentKey, value: Rc<T>) -> Result<(), AttachError> {
        let mut state = self.state.borrow_mut();
        if state.torn_down {
            return Err(AttachError::TornDown);
        }
        if state.find(&key).is_some() {
            return Err(AttachError::Duplicate { key: key.name });
        }
        state.entries.push(Entry { key, value });
        Ok(())
    }

    /// Return the entry under `key`, creating it with `init` if absent.
    ///
    /// `init` runs without the registry borrowed, so it may itself use the
    /// registry.
    ///
    /// # Errors
    ///
    /// [`AttachError::TornDown`] after teardown.
    pub fn get_or_insert_with<T: 'static>(
        &self,
        key: AttachmentKey,
        init: impl FnOnce() -> T,
    ) -> Result<Rc<T>, AttachError> {
        if self.is_torn_down() {
            return Err(AttachError::TornDown);
        }
        if let Some(existing) = self.get::<T>(key) {
            return Ok(existing);
        }
        let value = Rc::new(init());
        match self.insert(key, Rc::clone(&value)) {
            Ok(()) => Ok(value),
            // `init` attached the same key re-entrantly; the first one wins.
            Err(AttachError::Duplicate { .. }) => self
                .get::<T>(key)
                .ok_or(AttachError::Duplicate { key: key.name }),
            Err(e) => Err(e),
        }
    }

    /// Detach and return the entry under `key`.
    pub fn remove(&self, key: AttachmentKey) -> Option<Rc<dyn Any>> {
        let mut state = self.state.borrow_mut();
        let index = state.entries.iter().position(|e| e.key == key)?;
        Some(state.entries.remove(index).value)
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.state.borrow().torn_down
    }

    /// Complete the deallocation signal, then release every entry.
    ///
    /// Idempotent. Called automatically on drop; hosts call it explicitly
    /// from their own `Drop` when the registry is not their first field.
    pub fn teardown(&self) {
        let (signal, entries) = {
            let mut state = self.state.borrow_mut();
            if state.torn_down {
                return;
            }
            state.torn_down = true;
            let signal = state.dealloc.as_ref().map(DeallocSignal::subject);
            (signal, std::mem::take(&mut state.entries))
        };
        tracing::trace!(
            entries = entries.len(),
            signalled = signal.is_some(),
            "attachments teardown"
        );
        if let Some(signal) = signal {
            signal.on_completed();
        }
        drop(entries);
    }
}

impl Drop for Attachments {
    fn drop(&mut self) {
        self.teardown();
    }
}
