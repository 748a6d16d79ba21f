#![forbid(unsafe_code)]

//! Deallocation signals.
//!
//! [`deallocated`] returns a stream that completes, with no values, when the
//! object owning the [`Attachments`] registry is destroyed. The stream is
//! cached in the registry, so every call for the same object returns the
//! same observable (see [`Observable::ptr_eq`]).
//!
//! Once the registry is torn down, [`deallocated`] returns a stream that is
//! already complete. Its identity stays stable from then on too.

use crate::registry::{Anchor, Attachments};
use crate::stream::{Observable, Subject};

/// The one-shot subject stored inside a registry.
pub(crate) struct DeallocSignal {
    subject: Subject<()>,
    stream: Observable<()>,
}

impl DeallocSignal {
    fn new() -> Self {
        Self::from_subject(Subject::new())
    }

    fn completed() -> Self {
        Self::from_subject(Subject::completed())
    }

    fn from_subject(subject: Subject<()>) -> Self {
        let stream = subject.as_observable();
        Self { subject, stream }
    }

    /// Handle used to complete the signal outside the registry borrow.
    pub(crate) fn subject(&self) -> Subject<()> {
        self.subject.clone()
    }
}

impl Attachments {
    /// Completion-only stream fired when this registry is torn down.
    #[must_use]
    pub fn deallocated(&self) -> Observable<()> {
        let mut state = self.state.borrow_mut();
        let torn_down = state.is_torn_down();
        state
            .dealloc
            .get_or_insert_with(|| {
                if torn_down {
                    DeallocSignal::completed()
                } else {
                    DeallocSignal::new()
                }
            })
            .stream
            .clone()
    }
}

/// Completion-only stream fired when `anchor` is destroyed.
#[must_use]
pub fn deallocated<A: Anchor + ?Sized>(anchor: &A) -> Observable<()> {
    anchor.attachments().deallocated()
}
