#![forbid(unsafe_code)]

//! Named streams and bindings for [`ScrollView`].
//!
//! `view.rx()` borrows the view and hands out streams backed by the view's
//! [`ScrollViewDelegateProxy`], which is installed on first use. Every
//! stream completes when the view is destroyed.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use tether_widgets::{Point, ScrollView};
//!
//! let view = ScrollView::new();
//! let last = Rc::new(Cell::new(Point::ZERO));
//! let sink = Rc::clone(&last);
//! let _sub = view.rx().content_offset().subscribe(move |p| sink.set(p));
//!
//! view.set_content_offset(Point::new(0.0, 120.0));
//! assert_eq!(last.get(), Point::new(0.0, 120.0));
//! ```

use std::rc::Rc;

use tether_core::{BindingKey, Observable, Subscription, bind, deallocated};
use tether_proxy::{DelegateProxyType, ProxyError, Selector, proxy_for};

use crate::geometry::Point;
use crate::scroll_delegate::ScrollViewDelegate;
use crate::scroll_proxy::{self, ScrollViewDelegateProxy};
use crate::scroll_view::ScrollView;

const SCROLL_ENABLED: BindingKey = BindingKey("scroll_enabled");
const CONTENT_OFFSET: BindingKey = BindingKey("content_offset");
const ZOOM_SCALE: BindingKey = BindingKey("zoom_scale");

impl ScrollView {
    /// Reactive view of this scroll view.
    #[must_use]
    pub fn rx(self: &Rc<Self>) -> ScrollViewRx<'_> {
        ScrollViewRx { view: self }
    }
}

/// Streams and bindings of one [`ScrollView`].
#[derive(Debug, Clone, Copy)]
pub struct ScrollViewRx<'a> {
    view: &'a Rc<ScrollView>,
}

impl ScrollViewRx<'_> {
    /// The view's delegate proxy, installed on first access.
    ///
    /// # Errors
    ///
    /// See [`tether_proxy::proxy_for_with`].
    pub fn delegate_proxy(&self) -> Result<Rc<ScrollViewDelegateProxy>, ProxyError> {
        proxy_for::<ScrollViewDelegateProxy>(self.view)
    }

    fn stream<P: Clone + 'static>(&self, selector: Selector<P>) -> Observable<P> {
        match self.delegate_proxy() {
            Ok(proxy) => proxy.core().stream(selector),
            Err(err) => {
                tracing::warn!(callback = selector.name(), %err, "scroll view stream unavailable");
                Observable::empty()
            }
        }
    }

    // ========================================================================
    // Callback streams
    // ========================================================================

    #[must_use]
    pub fn did_scroll(&self) -> Observable<()> {
        self.stream(scroll_proxy::DID_SCROLL).map(|_| ())
    }

    #[must_use]
    pub fn did_zoom(&self) -> Observable<()> {
        self.stream(scroll_proxy::DID_ZOOM)
    }

    #[must_use]
    pub fn will_begin_dragging(&self) -> Observable<()> {
        self.stream(scroll_proxy::WILL_BEGIN_DRAGGING)
    }

    /// Emits `will_decelerate` each time a drag ends.
    #[must_use]
    pub fn did_end_dragging(&self) -> Observable<bool> {
        self.stream(scroll_proxy::DID_END_DRAGGING)
    }

    #[must_use]
    pub fn will_begin_decelerating(&self) -> Observable<()> {
        self.stream(scroll_proxy::WILL_BEGIN_DECELERATING)
    }

    #[must_use]
    pub fn did_end_decelerating(&self) -> Observable<()> {
        self.stream(scroll_proxy::DID_END_DECELERATING)
    }

    #[must_use]
    pub fn did_scroll_to_top(&self) -> Observable<()> {
        self.stream(scroll_proxy::DID_SCROLL_TO_TOP)
    }

    /// The content offset: the current value on subscribe, then every change.
    #[must_use]
    pub fn content_offset(&self) -> Observable<Point> {
        let view = Rc::downgrade(self.view);
        let scrolls = self.stream(scroll_proxy::DID_SCROLL);
        Observable::deferred(move || match view.upgrade() {
            Some(view) => scrolls.start_with(view.content_offset()),
            None => Observable::empty(),
        })
    }

    /// Completes when the view is destroyed.
    #[must_use]
    pub fn deallocated(&self) -> Observable<()> {
        deallocated(&**self.view)
    }

    // ========================================================================
    // Delegate and bindings
    // ========================================================================

    /// Forward every callback to `delegate` while keeping the streams alive.
    ///
    /// The view does not own `delegate`. Disposing the returned handle stops
    /// forwarding, unless another delegate was installed since.
    ///
    /// # Errors
    ///
    /// Fails when the delegate proxy cannot be installed.
    pub fn set_delegate<T: ScrollViewDelegate + 'static>(
        &self,
        delegate: &Rc<T>,
    ) -> Result<Subscription, ProxyError> {
        let proxy = self.delegate_proxy()?;
        let delegate: Rc<dyn ScrollViewDelegate> = delegate.clone();
        Ok(proxy.core().set_forward_delegate(&delegate))
    }

    /// Drive the scroll-enabled flag from `source`.
    pub fn bind_scroll_enabled(&self, source: &Observable<bool>) -> Subscription {
        bind(source, self.view, SCROLL_ENABLED, ScrollView::set_scroll_enabled)
    }

    /// Drive the content offset from `source`.
    pub fn bind_content_offset(&self, source: &Observable<Point>) -> Subscription {
        bind(source, self.view, CONTENT_OFFSET, ScrollView::set_content_offset)
    }

    pub fn bind_zoom_scale(&self, source: &Observable<f64>) -> Subscription {
        bind(source, self.view, ZOOM_SCALE, ScrollView::set_zoom_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use tether_core::Subject;

    #[test]
    fn content_offset_starts_with_current_value() {
        let view = ScrollView::new();
        view.set_content_offset(Point::new(1.0, 2.0));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = view
            .rx()
            .content_offset()
            .subscribe(move |p| sink.borrow_mut().push(p));
        view.set_content_offset(Point::new(1.0, 3.0));

        assert_eq!(*seen.borrow(), vec![Point::new(1.0, 2.0), Point::new(1.0, 3.0)]);
    }

    #[test]
    fn streams_share_one_proxy() {
        let view = ScrollView::new();
        let a = view.rx().delegate_proxy().unwrap();
        let b = view.rx().delegate_proxy().unwrap();
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn zoom_binding_reports_did_zoom() {
        let view = ScrollView::new();
        let zooms = Rc::new(Cell::new(0));
        let z = Rc::clone(&zooms);
        let _events = view.rx().did_zoom().subscribe(move |()| z.set(z.get() + 1));

        let scale = Subject::new();
        let _bound = view.rx().bind_zoom_scale(&scale.as_observable());
        scale.on_next(2.0);
        scale.on_next(2.0);
        scale.on_next(0.5);

        assert_eq!(view.zoom_scale(), 0.5);
        assert_eq!(zooms.get(), 2);
    }

    #[test]
    fn rebinding_offset_replaces_previous_source() {
        let view = ScrollView::new();
        let first = Subject::new();
        let second = Subject::new();
        let _a = view.rx().bind_content_offset(&first.as_observable());
        let _b = view.rx().bind_content_offset(&second.as_observable());

        first.on_next(Point::new(0.0, 10.0));
        assert_eq!(view.content_offset(), Point::ZERO);
        second.on_next(Point::new(0.0, 20.0));
        assert_eq!(view.content_offset(), Point::new(0.0, 20.0));
        assert_eq!(first.observer_count(), 0);
    }
}
