#![forbid(unsafe_code)]

//! Proxy registry errors.

use std::fmt;

use tether_core::AttachError;

/// Misuse of the delegate proxy registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// The host is being (or has been) destroyed.
    HostTornDown,
    /// An explicit install found a proxy already in place.
    AlreadyInstalled { proxy: &'static str },
    /// The host's delegate slot was reassigned behind the proxy and the
    /// strict slot policy is active.
    SlotReplaced { proxy: &'static str },
    /// The attachment registry refused the proxy.
    Attach(AttachError),
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostTornDown => write!(f, "host already torn down"),
            Self::AlreadyInstalled { proxy } => write!(f, "delegate proxy already installed: {proxy}"),
            Self::SlotReplaced { proxy } => {
                write!(f, "delegate slot reassigned behind installed proxy: {proxy}")
            }
            Self::Attach(e) => write!(f, "attachment failed: {e}"),
        }
    }
}

impl std::error::Error for ProxyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Attach(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AttachError> for ProxyError {
    fn from(err: AttachError) -> Self {
        match err {
            AttachError::TornDown => Self::HostTornDown,
            other => Self::Attach(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn torn_down_maps_to_host_torn_down() {
        assert_eq!(ProxyError::from(AttachError::TornDown), ProxyError::HostTornDown);
    }

    #[test]
    fn duplicate_keeps_source() {
        let err = ProxyError::from(AttachError::Duplicate { key: "p" });
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("attachment failed"));
    }
}
