#![forbid(unsafe_code)]

//! Reference host for Tether: a non-visual scroll view.
//!
//! # Role in Tether
//! `tether-widgets` plugs one concrete host into the generic delegate proxy
//! of `tether-proxy`. [`ScrollView`] has a single delegate slot;
//! [`ScrollViewDelegateProxy`] occupies it and turns every callback into a
//! stream, while still forwarding to the application's delegate.
//!
//! # Pieces
//! - [`ScrollView`]: scrolling state machine and callback dispatch.
//! - [`ScrollViewDelegate`] / [`ScrollCallbacks`]: the optional-callback
//!   contract.
//! - [`ScrollViewDelegateProxy`] and its selectors in [`scroll_proxy`].
//! - [`ScrollViewRx`]: named streams and bindings, via [`ScrollView::rx`].

pub mod geometry;
pub mod reactive;
pub mod scroll_delegate;
pub mod scroll_proxy;
pub mod scroll_view;

pub use geometry::Point;
pub use reactive::ScrollViewRx;
pub use scroll_delegate::{ScrollCallbacks, ScrollViewDelegate};
pub use scroll_proxy::ScrollViewDelegateProxy;
pub use scroll_view::ScrollView;
