#![forbid(unsafe_code)]

//! Core: streams, weak attachment registry, deallocation signals, bindings.
//!
//! # Role in Tether
//! `tether-core` is the leaf layer. It owns the push-based stream primitive
//! every delegate proxy publishes on, the per-object [`Attachments`] registry
//! that keeps a proxy alive exactly as long as its host, and the
//! [`deallocated`] signal that completes derived streams on teardown.
//!
//! # Primary responsibilities
//! - **Streams**: [`Observable`], [`Subject`], [`Observer`], [`Subscription`].
//! - **Registry**: [`Anchor`] / [`Attachments`] for lifetime-tied state.
//! - **Deallocation signal**: one completion, no values, cached per object.
//! - **Binding**: [`bind`] / [`bind_weak`] drive a property from a stream.
//! - **Config**: [`ProxyConfig`] with environment overrides.
//!
//! # How it fits in the system
//! `tether-proxy` builds the generic delegate proxy on top of these pieces;
//! `tether-widgets` plugs a concrete host into the proxy.

pub mod binding;
pub mod config;
pub mod dealloc;
pub mod error;
pub mod logging;
pub mod registry;
pub mod stream;

pub use binding::{BindingKey, bind, bind_weak};
pub use config::{ProxyConfig, SlotPolicy};
pub use dealloc::deallocated;
pub use error::AttachError;
pub use registry::{Anchor, AttachmentKey, Attachments};
pub use stream::{
    CompositeSubscription, Event, Observable, Observer, SerialSubscription, Subject, Subscription,
};
