#![forbid(unsafe_code)]

//! Delegate proxy: one delegate slot, many observers.
//!
//! # Role in Tether
//! A host object (a widget, a session, a device handle) exposes a single
//! delegate slot. `tether-proxy` puts a proxy into that slot which
//!
//! - forwards every callback to the application's own delegate, unchanged,
//! - publishes every callback on a multicast stream, and
//! - completes those streams when the host is destroyed.
//!
//! # Pieces
//! - [`HasDelegate`] / [`DelegateSlot`]: the host-side contract.
//! - [`Selector`]: typed identity of one callback stream.
//! - [`DelegateProxy`]: the forwarding and publishing engine.
//! - [`DelegateProxyType`]: glue between the engine and one host's delegate
//!   trait.
//! - [`proxy_for`] / [`install`]: lifetime-tied lookup and installation.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use tether_core::{Anchor, Attachments};
//! use tether_proxy::{DelegateProxy, DelegateProxyType, DelegateSlot, HasDelegate, Selector};
//!
//! trait ButtonDelegate {
//!     fn pressed(&self) {}
//! }
//!
//! #[derive(Default)]
//! struct Button {
//!     attachments: Attachments,
//!     slot: DelegateSlot<dyn ButtonDelegate>,
//! }
//!
//! impl Anchor for Button {
//!     fn attachments(&self) -> &Attachments { &self.attachments }
//! }
//!
//! impl HasDelegate for Button {
//!     type Delegate = dyn ButtonDelegate;
//!     fn delegate_slot(&self) -> &DelegateSlot<dyn ButtonDelegate> { &self.slot }
//! }
//!
//! const PRESSED: Selector<()> = Selector::new("pressed");
//!
//! struct ButtonProxy(DelegateProxy<Button>);
//!
//! impl ButtonDelegate for ButtonProxy {
//!     fn pressed(&self) {
//!         self.0.intercept(PRESSED, || (), |d| Some(d.pressed()));
//!     }
//! }
//!
//! impl DelegateProxyType for ButtonProxy {
//!     type Host = Button;
//!     fn from_core(core: DelegateProxy<Button>) -> Self { Self(core) }
//!     fn core(&self) -> &DelegateProxy<Button> { &self.0 }
//!     fn as_delegate(this: &Rc<Self>) -> Rc<dyn ButtonDelegate> { this.clone() }
//! }
//!
//! let button = Rc::new(Button::default());
//! let proxy = tether_proxy::proxy_for::<ButtonProxy>(&button).unwrap();
//! let presses = Rc::new(std::cell::Cell::new(0));
//! let p = Rc::clone(&presses);
//! let _sub = proxy.core().stream(PRESSED).subscribe(move |()| p.set(p.get() + 1));
//!
//! button.slot.get().unwrap().pressed();
//! assert_eq!(presses.get(), 1);
//! ```

pub mod error;
pub mod proxy;
pub mod registry;
pub mod selector;
pub mod slot;

pub use error::ProxyError;
pub use proxy::{DelegateProxy, ProxyState};
pub use registry::{DelegateOf, DelegateProxyType, install, installed, proxy_for, proxy_for_with};
pub use selector::Selector;
pub use slot::{DelegateSlot, HasDelegate, same_object};
