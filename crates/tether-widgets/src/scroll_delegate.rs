#![forbid(unsafe_code)]

//! The scroll view's delegate contract.
//!
//! Every callback is optional. A delegate declares which ones it implements
//! through [`ScrollViewDelegate::callbacks`]; the host only invokes declared
//! callbacks, and the delegate proxy only forwards declared callbacks.

use bitflags::bitflags;

use crate::scroll_view::ScrollView;

bitflags! {
    /// Callbacks a [`ScrollViewDelegate`] implements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ScrollCallbacks: u16 {
        /// Content offset changed.
        const DID_SCROLL              = 1 << 0;
        /// Zoom scale changed.
        const DID_ZOOM                = 1 << 1;
        /// The user started dragging.
        const WILL_BEGIN_DRAGGING     = 1 << 2;
        /// The user lifted their finger.
        const DID_END_DRAGGING        = 1 << 3;
        /// Deceleration is about to start.
        const WILL_BEGIN_DECELERATING = 1 << 4;
        /// Deceleration came to rest.
        const DID_END_DECELERATING    = 1 << 5;
        /// Asked whether a scroll-to-top gesture may proceed.
        const SHOULD_SCROLL_TO_TOP    = 1 << 6;
        /// A scroll-to-top finished.
        const DID_SCROLL_TO_TOP       = 1 << 7;
    }
}

/// Delegate of a [`ScrollView`].
///
/// All methods default to no-ops. Implement the ones you need and list them
/// in [`callbacks`](Self::callbacks); an unlisted method is never called.
pub trait ScrollViewDelegate {
    /// The callbacks this delegate implements.
    fn callbacks(&self) -> ScrollCallbacks {
        ScrollCallbacks::empty()
    }

    fn did_scroll(&self, _view: &ScrollView) {}

    fn did_zoom(&self, _view: &ScrollView) {}

    fn will_begin_dragging(&self, _view: &ScrollView) {}

    fn did_end_dragging(&self, _view: &ScrollView, _will_decelerate: bool) {}

    fn will_begin_decelerating(&self, _view: &ScrollView) {}

    fn did_end_decelerating(&self, _view: &ScrollView) {}

    /// Whether a scroll-to-top gesture may proceed.
    fn should_scroll_to_top(&self, _view: &ScrollView) -> bool {
        true
    }

    fn did_scroll_to_top(&self, _view: &ScrollView) {}
}
