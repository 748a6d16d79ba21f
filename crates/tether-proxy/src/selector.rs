#![forbid(unsafe_code)]

//! Typed callback identities.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;

/// Identity of one intercepted callback and the payload type its stream
/// carries.
///
/// Two selectors address the same subject only when both the name and the
/// payload type match, so a payload type mismatch cannot occur at runtime.
///
/// ```
/// use tether_proxy::Selector;
///
/// const DID_SCROLL: Selector<(f64, f64)> = Selector::new("did_scroll");
/// assert_eq!(DID_SCROLL.name(), "did_scroll");
/// ```
pub struct Selector<P> {
    name: &'static str,
    _payload: PhantomData<fn() -> P>,
}

impl<P> Selector<P> {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _payload: PhantomData,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<P: 'static> Selector<P> {
    pub(crate) fn key(&self) -> SubjectKey {
        SubjectKey {
            name: self.name,
            payload: TypeId::of::<P>(),
        }
    }
}

// Manual impls: derives would demand `P: Clone` etc.
impl<P> Clone for Selector<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Selector<P> {}

impl<P> fmt::Debug for Selector<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.name).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SubjectKey {
    pub(crate) name: &'static str,
    payload: TypeId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_include_payload_type() {
        let a: Selector<bool> = Selector::new("x");
        let b: Selector<u8> = Selector::new("x");
        let c: Selector<bool> = Selector::new("x");
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key(), c.key());
    }

    #[test]
    fn debug_shows_name() {
        let s: Selector<()> = Selector::new("did_zoom");
        assert_eq!(format!("{s:?}"), "Selector(\"did_zoom\")");
    }
}
