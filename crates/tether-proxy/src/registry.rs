#![forbid(unsafe_code)]

//! Proxy lookup and installation.
//!
//! A proxy lives in its host's attachment registry, which makes the host its
//! indirect owner: the proxy is released when the host is destroyed, and it
//! only refers back to the host weakly.
//!
//! [`proxy_for`] is the usual entry point. It returns the installed proxy or
//! creates one:
//!
//! 1. refuse hosts whose registry is already torn down,
//! 2. build the concrete proxy around a fresh [`DelegateProxy`],
//! 3. attach it to the host,
//! 4. subscribe it to the host's deallocation signal,
//! 5. adopt whatever delegate occupied the slot as the forwarded delegate,
//! 6. put the proxy into the slot.

use std::rc::Rc;

use tether_core::{Anchor, AttachmentKey, ProxyConfig, SlotPolicy, deallocated};

use crate::error::ProxyError;
use crate::proxy::DelegateProxy;
use crate::slot::{HasDelegate, same_object};

/// Shorthand for the delegate contract of a proxy's host.
pub type DelegateOf<P> = <<P as DelegateProxyType>::Host as HasDelegate>::Delegate;

/// A concrete proxy type for one host type.
///
/// Implementors wrap a [`DelegateProxy`], implement the host's delegate
/// contract by calling [`DelegateProxy::intercept`] for each callback, and
/// expose themselves as that contract through [`as_delegate`].
///
/// [`as_delegate`]: DelegateProxyType::as_delegate
pub trait DelegateProxyType: Sized + 'static {
    type Host: HasDelegate;

    /// Wrap a freshly created engine.
    fn from_core(core: DelegateProxy<Self::Host>) -> Self;

    fn core(&self) -> &DelegateProxy<Self::Host>;

    /// View the proxy as the host's delegate contract (an unsizing clone).
    fn as_delegate(this: &Rc<Self>) -> Rc<DelegateOf<Self>>;
}

/// The proxy already installed on `host`, if any.
#[must_use]
pub fn installed<P: DelegateProxyType>(host: &P::Host) -> Option<Rc<P>> {
    host.attachments().get::<P>(AttachmentKey::of::<P>())
}

/// The proxy for `host`, created and installed on first access.
///
/// Uses [`ProxyConfig::global`].
///
/// # Errors
///
/// See [`proxy_for_with`].
pub fn proxy_for<P: DelegateProxyType>(host: &Rc<P::Host>) -> Result<Rc<P>, ProxyError> {
    proxy_for_with(host, ProxyConfig::global())
}

/// The proxy for `host` with an explicit configuration.
///
/// `config` only applies when the proxy is created here.
///
/// # Errors
///
/// - [`ProxyError::HostTornDown`] when the host's registry is torn down.
/// - [`ProxyError::SlotReplaced`] when the slot was reassigned behind an
///   installed proxy that uses [`SlotPolicy::Reject`].
pub fn proxy_for_with<P: DelegateProxyType>(
    host: &Rc<P::Host>,
    config: &ProxyConfig,
) -> Result<Rc<P>, ProxyError> {
    if host.attachments().is_torn_down() {
        return Err(ProxyError::HostTornDown);
    }
    match installed::<P>(host) {
        Some(existing) => {
            ensure_in_slot::<P>(host, &existing)?;
            Ok(existing)
        }
        None => create(host, config),
    }
}

/// Explicitly install a proxy on `host`.
///
/// # Errors
///
/// [`ProxyError::AlreadyInstalled`] if a proxy of this type is already
/// installed, [`ProxyError::HostTornDown`] for a torn-down host.
pub fn install<P: DelegateProxyType>(
    host: &Rc<P::Host>,
    config: &ProxyConfig,
) -> Result<Rc<P>, ProxyError> {
    if installed::<P>(host).is_some() {
        return Err(ProxyError::AlreadyInstalled {
            proxy: std::any::type_name::<P>(),
        });
    }
    create(host, config)
}

fn create<P: DelegateProxyType>(
    host: &Rc<P::Host>,
    config: &ProxyConfig,
) -> Result<Rc<P>, ProxyError> {
    let attachments = host.attachments();
    if attachments.is_torn_down() {
        return Err(ProxyError::HostTornDown);
    }

    let proxy = Rc::new(P::from_core(DelegateProxy::new(host, config.clone())));
    attachments.insert(AttachmentKey::of::<P>(), Rc::clone(&proxy))?;

    let weak = Rc::downgrade(&proxy);
    let teardown = deallocated(&**host).subscribe_with(
        |()| {},
        move || {
            if let Some(proxy) = weak.upgrade() {
                proxy.core().tear_down();
            }
        },
    );
    proxy.core().attach_teardown(teardown);

    adopt_and_occupy::<P>(host, &proxy);
    tracing::debug!(
        proxy = std::any::type_name::<P>(),
        forwarding = proxy.core().forward_delegate().is_some(),
        "delegate proxy installed"
    );
    Ok(proxy)
}

/// Take over the host's slot, keeping its previous occupant as the forward
/// target.
fn adopt_and_occupy<P: DelegateProxyType>(host: &P::Host, proxy: &Rc<P>) {
    let slot = host.delegate_slot();
    let me = P::as_delegate(proxy);
    if let Some(current) = slot.get() {
        if !same_object(&current, &me) {
            proxy.core().set_forward_delegate(&current).detach();
        }
    }
    slot.set(Some(&me));
}

fn ensure_in_slot<P: DelegateProxyType>(host: &P::Host, proxy: &Rc<P>) -> Result<(), ProxyError> {
    if host.delegate_slot().holds(&P::as_delegate(proxy)) {
        return Ok(());
    }
    match proxy.core().config().slot_policy {
        SlotPolicy::Readopt => {
            tracing::warn!(
                proxy = std::any::type_name::<P>(),
                "delegate slot reassigned behind proxy; adopting occupant as forward delegate"
            );
            adopt_and_occupy::<P>(host, proxy);
            Ok(())
        }
        SlotPolicy::Reject => Err(ProxyError::SlotReplaced {
            proxy: std::any::type_name::<P>(),
        }),
    }
}
