#![forbid(unsafe_code)]

//! Drive a target property from a stream.
//!
//! - [`bind_weak`] applies values while a weakly-held target is alive.
//! - [`bind`] additionally makes the binding the single owner of one named
//!   property of an [`Anchor`] target: binding the same `(target, key)` again
//!   disposes the previous binding first (last writer wins), and the binding
//!   ends when the target is destroyed.
//!
//! A dead target is never an error. Values stop being applied and the source
//! subscription is released.

use std::rc::{Rc, Weak};

use crate::dealloc::deallocated;
use crate::registry::{Anchor, AttachmentKey};
use crate::stream::{Observable, SerialSubscription, Subscription};

/// Name of one bindable property on a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingKey(pub &'static str);

/// Registry entry holding the live binding for one property.
#[derive(Debug, Default)]
struct BindingSlot {
    serial: SerialSubscription,
}

/// Apply every value from `source` to `target` through `setter` while the
/// target is alive.
///
/// The first value arriving after the target died releases the source
/// subscription.
pub fn bind_weak<T: 'static, V: Clone + 'static>(
    source: &Observable<V>,
    target: &Rc<T>,
    setter: impl Fn(&T, V) + 'static,
) -> Subscription {
    let weak: Weak<T> = Rc::downgrade(target);
    source.subscribe(move |value| {
        if let Some(target) = weak.upgrade() {
            setter(&target, value);
        }
    })
}

/// Bind `source` to the property `key` of `target`.
///
/// Any binding previously established for the same `(target, key)` is
/// disposed before `source` is subscribed. The returned handle disposes this
/// binding, unless a newer one replaced it already. Dropping the target ends
/// the binding.
pub fn bind<T: Anchor + 'static, V: Clone + 'static>(
    source: &Observable<V>,
    target: &Rc<T>,
    key: BindingKey,
    setter: impl Fn(&T, V) + 'static,
) -> Subscription {
    let slot = match target
        .attachments()
        .get_or_insert_with(AttachmentKey::named::<BindingSlot>(key.0), BindingSlot::default)
    {
        Ok(slot) => slot,
        Err(err) => {
            tracing::debug!(property = key.0, %err, "bind to torn-down target ignored");
            return Subscription::empty();
        }
    };

    let generation = slot.serial.replace();
    let guarded = source.take_until(&deallocated(&**target));
    let subscription = bind_weak(&guarded, target, setter);
    slot.serial.fill(generation, subscription);
    tracing::trace!(property = key.0, generation, "binding established");

    let serial = slot.serial.clone();
    Subscription::new(move || serial.clear_if(generation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Attachments;
    use crate::stream::Subject;
    use std::cell::Cell;

    struct Switch {
        attachments: Attachments,
        enabled: Cell<bool>,
        writes: Cell<u32>,
    }

    impl Anchor for Switch {
        fn attachments(&self) -> &Attachments {
            &self.attachments
        }
    }

    const ENABLED: BindingKey = BindingKey("enabled");

    fn switch(enabled: bool) -> Rc<Switch> {
        Rc::new(Switch {
            attachments: Attachments::new(),
            enabled: Cell::new(enabled),
            writes: Cell::new(0),
        })
    }

    fn set_enabled(s: &Switch, v: bool) {
        s.enabled.set(v);
        s.writes.set(s.writes.get() + 1);
    }

    #[test]
    fn just_false_then_dispose() {
        let target = switch(true);
        bind(&Observable::just(false), &target, ENABLED, set_enabled).dispose();
        assert!(!target.enabled.get());
    }

    #[test]
    fn just_true_then_dispose() {
        let target = switch(false);
        bind(&Observable::just(true), &target, ENABLED, set_enabled).dispose();
        assert!(target.enabled.get());
    }

    #[test]
    fn no_values_after_dispose() {
        let target = switch(true);
        let source = Subject::new();
        let binding = bind(&source.as_observable(), &target, ENABLED, set_enabled);
        source.on_next(false);
        binding.dispose();
        source.on_next(true);
        assert!(!target.enabled.get());
        assert_eq!(source.observer_count(), 0);
    }

    #[test]
    fn last_writer_wins() {
        let target = switch(false);
        let first = Subject::new();
        let second = Subject::new();

        let _a = bind(&first.as_observable(), &target, ENABLED, set_enabled);
        let _b = bind(&second.as_observable(), &target, ENABLED, set_enabled);

        first.on_next(true);
        assert!(!target.enabled.get());
        assert_eq!(first.observer_count(), 0);

        second.on_next(true);
        assert!(target.enabled.get());
    }

    #[test]
    fn disposing_stale_binding_keeps_newer_one() {
        let target = switch(false);
        let first = Subject::new();
        let second = Subject::new();

        let a = bind(&first.as_observable(), &target, ENABLED, set_enabled);
        let _b = bind(&second.as_observable(), &target, ENABLED, set_enabled);
        a.dispose();

        second.on_next(true);
        assert!(target.enabled.get());
    }

    #[test]
    fn target_drop_releases_source() {
        let target = switch(false);
        let source = Subject::new();
        let binding = bind(&source.as_observable(), &target, ENABLED, set_enabled);
        assert_eq!(source.observer_count(), 1);

        drop(target);
        assert_eq!(source.observer_count(), 0);
        source.on_next(true);
        drop(binding);
    }

    #[test]
    fn bind_weak_stops_silently() {
        let target = switch(false);
        let source = Subject::new();
        let _binding = bind_weak(&source.as_observable(), &target, set_enabled);
        source.on_next(true);
        assert_eq!(target.writes.get(), 1);

        let weak = Rc::downgrade(&target);
        drop(target);
        source.on_next(false);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn bind_to_torn_down_target_is_noop() {
        let target = switch(false);
        target.attachments.teardown();
        let binding = bind(&Observable::just(true), &target, ENABLED, set_enabled);
        assert!(!binding.is_active());
        assert!(!target.enabled.get());
    }
}
