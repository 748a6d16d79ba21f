#![forbid(unsafe_code)]

//! A non-visual scroll view host.
//!
//! [`ScrollView`] models the scrolling state machine of a scroll container
//! (content offset, zoom, drag and deceleration phases, scroll-to-top) and
//! reports every transition to the single delegate in its slot. It renders
//! nothing.
//!
//! # Teardown
//!
//! The attachment registry is the first field and is also torn down
//! explicitly in `Drop`, so delegate proxies and bindings see the view's
//! deallocation while every other field is still intact.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tether_core::{Anchor, Attachments};
use tether_proxy::{DelegateSlot, HasDelegate};

use crate::geometry::{Point, same_value};
use crate::scroll_delegate::{ScrollCallbacks, ScrollViewDelegate};

/// Scroll container host with one delegate slot.
pub struct ScrollView {
    attachments: Attachments,
    delegate: DelegateSlot<dyn ScrollViewDelegate>,
    content_offset: Cell<Point>,
    zoom_scale: Cell<f64>,
    scroll_enabled: Cell<bool>,
    dragging: Cell<bool>,
    decelerating: Cell<bool>,
}

impl fmt::Debug for ScrollView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollView")
            .field("content_offset", &self.content_offset.get())
            .field("zoom_scale", &self.zoom_scale.get())
            .field("scroll_enabled", &self.scroll_enabled.get())
            .field("dragging", &self.dragging.get())
            .field("decelerating", &self.decelerating.get())
            .field("has_delegate", &!self.delegate.is_empty())
            .finish()
    }
}

impl ScrollView {
    /// A scroll view at offset zero, zoom 1.0, scrolling enabled.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            attachments: Attachments::new(),
            delegate: DelegateSlot::new(),
            content_offset: Cell::new(Point::ZERO),
            zoom_scale: Cell::new(1.0),
            scroll_enabled: Cell::new(true),
            dragging: Cell::new(false),
            decelerating: Cell::new(false),
        })
    }

    // ========================================================================
    // Delegate slot
    // ========================================================================

    /// The current delegate, if it is alive.
    #[must_use]
    pub fn delegate(&self) -> Option<Rc<dyn ScrollViewDelegate>> {
        self.delegate.get()
    }

    /// Assign the delegate slot directly. The view does not own `delegate`.
    pub fn set_delegate(&self, delegate: Option<&Rc<dyn ScrollViewDelegate>>) {
        self.delegate.set(delegate);
    }

    // ========================================================================
    // State
    // ========================================================================

    #[must_use]
    pub fn content_offset(&self) -> Point {
        self.content_offset.get()
    }

    /// Move the content. Reports `did_scroll` when the offset changes.
    pub fn set_content_offset(&self, offset: Point) {
        if !Point::same(self.content_offset.replace(offset), offset) {
            self.dispatch(ScrollCallbacks::DID_SCROLL, |d| d.did_scroll(self));
        }
    }

    #[must_use]
    pub fn zoom_scale(&self) -> f64 {
        self.zoom_scale.get()
    }

    /// Change the zoom scale. Reports `did_zoom` when the scale changes;
    /// NaN counts as equal to NaN.
    pub fn set_zoom_scale(&self, scale: f64) {
        if !same_value(self.zoom_scale.replace(scale), scale) {
            self.dispatch(ScrollCallbacks::DID_ZOOM, |d| d.did_zoom(self));
        }
    }

    #[must_use]
    pub fn is_scroll_enabled(&self) -> bool {
        self.scroll_enabled.get()
    }

    pub fn set_scroll_enabled(&self, enabled: bool) {
        self.scroll_enabled.set(enabled);
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging.get()
    }

    #[must_use]
    pub fn is_decelerating(&self) -> bool {
        self.decelerating.get()
    }

    // ========================================================================
    // Gesture phases
    // ========================================================================

    /// A drag starts. Ignored while scrolling is disabled.
    pub fn begin_dragging(&self) {
        if !self.scroll_enabled.get() {
            return;
        }
        self.dragging.set(true);
        self.decelerating.set(false);
        self.dispatch(ScrollCallbacks::WILL_BEGIN_DRAGGING, |d| {
            d.will_begin_dragging(self)
        });
    }

    /// The drag ends; deceleration follows when `will_decelerate` is set.
    pub fn end_dragging(&self, will_decelerate: bool) {
        self.dragging.set(false);
        self.dispatch(ScrollCallbacks::DID_END_DRAGGING, |d| {
            d.did_end_dragging(self, will_decelerate)
        });
        if will_decelerate {
            self.begin_decelerating();
        }
    }

    /// Deceleration starts after a flick.
    pub fn begin_decelerating(&self) {
        self.decelerating.set(true);
        self.dispatch(ScrollCallbacks::WILL_BEGIN_DECELERATING, |d| {
            d.will_begin_decelerating(self)
        });
    }

    /// Deceleration comes to rest.
    pub fn end_decelerating(&self) {
        self.decelerating.set(false);
        self.dispatch(ScrollCallbacks::DID_END_DECELERATING, |d| {
            d.did_end_decelerating(self)
        });
    }

    /// Status-bar tap: scroll to the top if scrolling is enabled and the
    /// delegate agrees (a delegate that does not answer agrees).
    ///
    /// Returns whether the scroll happened.
    pub fn scroll_to_top(&self) -> bool {
        if !self.scroll_enabled.get() {
            return false;
        }
        let allowed = match self.delegate() {
            Some(d) if d.callbacks().contains(ScrollCallbacks::SHOULD_SCROLL_TO_TOP) => {
                d.should_scroll_to_top(self)
            }
            _ => true,
        };
        if !allowed {
            return false;
        }
        let offset = self.content_offset.get();
        self.set_content_offset(Point::new(offset.x, 0.0));
        self.dispatch(ScrollCallbacks::DID_SCROLL_TO_TOP, |d| {
            d.did_scroll_to_top(self)
        });
        true
    }

    /// Invoke `call` on the delegate only if it declares `callback`.
    fn dispatch(&self, callback: ScrollCallbacks, call: impl FnOnce(&dyn ScrollViewDelegate)) {
        if let Some(delegate) = self.delegate.get() {
            if delegate.callbacks().contains(callback) {
                call(&*delegate);
            }
        }
    }
}

impl Drop for ScrollView {
    fn drop(&mut self) {
        self.attachments.teardown();
    }
}

impl Anchor for ScrollView {
    fn attachments(&self) -> &Attachments {
        &self.attachments
    }
}

impl HasDelegate for ScrollView {
    type Delegate = dyn ScrollViewDelegate;

    fn delegate_slot(&self) -> &DelegateSlot<dyn ScrollViewDelegate> {
        &self.delegate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Journal {
        calls: RefCell<Vec<String>>,
        allow_top: Cell<bool>,
    }

    impl ScrollViewDelegate for Journal {
        fn callbacks(&self) -> ScrollCallbacks {
            ScrollCallbacks::all()
        }

        fn did_scroll(&self, view: &ScrollView) {
            self.calls
                .borrow_mut()
                .push(format!("scroll {}", view.content_offset()));
        }

        fn did_zoom(&self, view: &ScrollView) {
            self.calls.borrow_mut().push(format!("zoom {}", view.zoom_scale()));
        }

        fn will_begin_dragging(&self, _: &ScrollView) {
            self.calls.borrow_mut().push("drag".into());
        }

        fn did_end_dragging(&self, _: &ScrollView, will_decelerate: bool) {
            self.calls
                .borrow_mut()
                .push(format!("end-drag {will_decelerate}"));
        }

        fn will_begin_decelerating(&self, _: &ScrollView) {
            self.calls.borrow_mut().push("decel".into());
        }

        fn did_end_decelerating(&self, _: &ScrollView) {
            self.calls.borrow_mut().push("end-decel".into());
        }

        fn should_scroll_to_top(&self, _: &ScrollView) -> bool {
            self.calls.borrow_mut().push("should-top".into());
            self.allow_top.get()
        }

        fn did_scroll_to_top(&self, _: &ScrollView) {
            self.calls.borrow_mut().push("top".into());
        }
    }

    /// Implements callbacks but declares none.
    struct Silent(Cell<u32>);

    impl ScrollViewDelegate for Silent {
        fn did_scroll(&self, _: &ScrollView) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn with_journal(view: &ScrollView) -> Rc<Journal> {
        let journal = Rc::new(Journal::default());
        let as_dyn: Rc<dyn ScrollViewDelegate> = journal.clone();
        view.set_delegate(Some(&as_dyn));
        journal
    }

    #[test]
    fn defaults() {
        let view = ScrollView::new();
        assert_eq!(view.content_offset(), Point::ZERO);
        assert_eq!(view.zoom_scale(), 1.0);
        assert!(view.is_scroll_enabled());
        assert!(view.delegate().is_none());
    }

    #[test]
    fn offset_change_reports_once() {
        let view = ScrollView::new();
        let journal = with_journal(&view);
        view.set_content_offset(Point::new(2.0, 2.0));
        view.set_content_offset(Point::new(2.0, 2.0));
        assert_eq!(*journal.calls.borrow(), vec!["scroll (2, 2)"]);
    }

    #[test]
    fn repeated_nan_reports_once() {
        let view = ScrollView::new();
        let journal = with_journal(&view);
        view.set_zoom_scale(f64::NAN);
        view.set_zoom_scale(f64::NAN);
        view.set_content_offset(Point::new(f64::NAN, 1.0));
        view.set_content_offset(Point::new(f64::NAN, 1.0));
        assert_eq!(*journal.calls.borrow(), vec!["zoom NaN", "scroll (NaN, 1)"]);

        view.set_zoom_scale(2.0);
        assert_eq!(journal.calls.borrow().last().map(String::as_str), Some("zoom 2"));
    }

    #[test]
    fn drag_cycle_order() {
        let view = ScrollView::new();
        let journal = with_journal(&view);
        view.begin_dragging();
        assert!(view.is_dragging());
        view.end_dragging(true);
        assert!(view.is_decelerating());
        view.end_decelerating();
        assert_eq!(
            *journal.calls.borrow(),
            vec!["drag", "end-drag true", "decel", "end-decel"]
        );
    }

    #[test]
    fn disabled_scrolling_ignores_drag_and_top() {
        let view = ScrollView::new();
        let journal = with_journal(&view);
        view.set_scroll_enabled(false);
        view.begin_dragging();
        assert!(!view.scroll_to_top());
        assert!(journal.calls.borrow().is_empty());
    }

    #[test]
    fn scroll_to_top_respects_answer() {
        let view = ScrollView::new();
        let journal = with_journal(&view);
        view.set_content_offset(Point::new(1.0, 40.0));
        journal.calls.borrow_mut().clear();

        assert!(!view.scroll_to_top());
        assert_eq!(view.content_offset(), Point::new(1.0, 40.0));

        journal.allow_top.set(true);
        assert!(view.scroll_to_top());
        assert_eq!(view.content_offset(), Point::new(1.0, 0.0));
        assert_eq!(
            *journal.calls.borrow(),
            vec!["should-top", "should-top", "scroll (1, 0)", "top"]
        );
    }

    #[test]
    fn undeclared_callbacks_are_not_invoked() {
        let view = ScrollView::new();
        let silent = Rc::new(Silent(Cell::new(0)));
        let as_dyn: Rc<dyn ScrollViewDelegate> = silent.clone();
        view.set_delegate(Some(&as_dyn));
        view.set_content_offset(Point::new(0.0, 5.0));
        assert_eq!(silent.0.get(), 0);
        assert!(view.scroll_to_top());
    }

    #[test]
    fn delegate_slot_is_weak() {
        let view = ScrollView::new();
        let journal = with_journal(&view);
        drop(journal);
        assert!(view.delegate().is_none());
        view.set_content_offset(Point::new(0.0, 1.0));
    }
}
