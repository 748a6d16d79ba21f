#![forbid(unsafe_code)]

//! Delegate proxy for [`ScrollView`].
//!
//! [`ScrollViewDelegateProxy`] declares every callback, forwards each one to
//! the application's delegate when that delegate declares it, and publishes
//! the callback on its stream.

use std::rc::Rc;

use tether_proxy::{DelegateProxy, DelegateProxyType, Selector};

use crate::geometry::Point;
use crate::scroll_delegate::{ScrollCallbacks, ScrollViewDelegate};
use crate::scroll_view::ScrollView;

/// `did_scroll`, carrying the content offset after the change.
pub const DID_SCROLL: Selector<Point> = Selector::new("did_scroll");
pub const DID_ZOOM: Selector<()> = Selector::new("did_zoom");
pub const WILL_BEGIN_DRAGGING: Selector<()> = Selector::new("will_begin_dragging");
/// `did_end_dragging`, carrying `will_decelerate`.
pub const DID_END_DRAGGING: Selector<bool> = Selector::new("did_end_dragging");
pub const WILL_BEGIN_DECELERATING: Selector<()> = Selector::new("will_begin_decelerating");
pub const DID_END_DECELERATING: Selector<()> = Selector::new("did_end_decelerating");
/// `should_scroll_to_top`, published after the answer is decided.
pub const SHOULD_SCROLL_TO_TOP: Selector<()> = Selector::new("should_scroll_to_top");
pub const DID_SCROLL_TO_TOP: Selector<()> = Selector::new("did_scroll_to_top");

/// The proxy installed in a [`ScrollView`]'s delegate slot.
#[derive(Debug)]
pub struct ScrollViewDelegateProxy {
    core: DelegateProxy<ScrollView>,
}

/// Run `call` only if `delegate` declares `callback`.
fn declared<R>(
    delegate: &dyn ScrollViewDelegate,
    callback: ScrollCallbacks,
    call: impl FnOnce(&dyn ScrollViewDelegate) -> R,
) -> Option<R> {
    delegate.callbacks().contains(callback).then(|| call(delegate))
}

impl ScrollViewDelegate for ScrollViewDelegateProxy {
    fn callbacks(&self) -> ScrollCallbacks {
        ScrollCallbacks::all()
    }

    fn did_scroll(&self, view: &ScrollView) {
        self.core.intercept(
            DID_SCROLL,
            || view.content_offset(),
            |d| declared(d, ScrollCallbacks::DID_SCROLL, |d| d.did_scroll(view)),
        );
    }

    fn did_zoom(&self, view: &ScrollView) {
        self.core.intercept(
            DID_ZOOM,
            || (),
            |d| declared(d, ScrollCallbacks::DID_ZOOM, |d| d.did_zoom(view)),
        );
    }

    fn will_begin_dragging(&self, view: &ScrollView) {
        self.core.intercept(
            WILL_BEGIN_DRAGGING,
            || (),
            |d| {
                declared(d, ScrollCallbacks::WILL_BEGIN_DRAGGING, |d| {
                    d.will_begin_dragging(view)
                })
            },
        );
    }

    fn did_end_dragging(&self, view: &ScrollView, will_decelerate: bool) {
        self.core.intercept(
            DID_END_DRAGGING,
            || will_decelerate,
            |d| {
                declared(d, ScrollCallbacks::DID_END_DRAGGING, |d| {
                    d.did_end_dragging(view, will_decelerate)
                })
            },
        );
    }

    fn will_begin_decelerating(&self, view: &ScrollView) {
        self.core.intercept(
            WILL_BEGIN_DECELERATING,
            || (),
            |d| {
                declared(d, ScrollCallbacks::WILL_BEGIN_DECELERATING, |d| {
                    d.will_begin_decelerating(view)
                })
            },
        );
    }

    fn did_end_decelerating(&self, view: &ScrollView) {
        self.core.intercept(
            DID_END_DECELERATING,
            || (),
            |d| {
                declared(d, ScrollCallbacks::DID_END_DECELERATING, |d| {
                    d.did_end_decelerating(view)
                })
            },
        );
    }

    /// The forwarded delegate's answer wins; without one the gesture proceeds.
    fn should_scroll_to_top(&self, view: &ScrollView) -> bool {
        self.core
            .intercept(
                SHOULD_SCROLL_TO_TOP,
                || (),
                |d| {
                    declared(d, ScrollCallbacks::SHOULD_SCROLL_TO_TOP, |d| {
                        d.should_scroll_to_top(view)
                    })
                },
            )
            .unwrap_or(true)
    }

    fn did_scroll_to_top(&self, view: &ScrollView) {
        self.core.intercept(
            DID_SCROLL_TO_TOP,
            || (),
            |d| {
                declared(d, ScrollCallbacks::DID_SCROLL_TO_TOP, |d| {
                    d.did_scroll_to_top(view)
                })
            },
        );
    }
}

impl DelegateProxyType for ScrollViewDelegateProxy {
    type Host = ScrollView;

    fn from_core(core: DelegateProxy<ScrollView>) -> Self {
        Self { core }
    }

    fn core(&self) -> &DelegateProxy<ScrollView> {
        &self.core
    }

    fn as_delegate(this: &Rc<Self>) -> Rc<dyn ScrollViewDelegate> {
        Rc::clone(this) as Rc<dyn ScrollViewDelegate>
    }
}
