#![forbid(unsafe_code)]

//! Runtime configuration for delegate proxies.
//!
//! Defaults suit production. Each field can be overridden from the
//! environment:
//!
//! | Variable             | Field          | Values                     |
//! |----------------------|----------------|----------------------------|
//! | `TETHER_LOG_EVENTS`  | `log_events`   | `1`/`true`/`yes`/`on`      |
//! | `TETHER_STRICT_SLOT` | `slot_policy`  | truthy selects `Reject`    |

use std::sync::OnceLock;

/// What a proxy does when it finds a different occupant in the host's
/// delegate slot on access (someone assigned the slot directly).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotPolicy {
    /// Adopt the occupant as the forwarded delegate and reinstall the proxy.
    #[default]
    Readopt,
    /// Refuse access with a slot-replaced error.
    Reject,
}

/// Configuration shared by every delegate proxy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProxyConfig {
    /// Emit a `trace!` record for every intercepted callback.
    pub log_events: bool,
    /// Reaction to a delegate slot replaced behind the proxy.
    pub slot_policy: SlotPolicy,
}

impl ProxyConfig {
    /// Configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set per-event logging.
    #[must_use]
    pub fn with_log_events(mut self, enabled: bool) -> Self {
        self.log_events = enabled;
        self
    }

    /// Set the slot policy.
    #[must_use]
    pub fn with_slot_policy(mut self, policy: SlotPolicy) -> Self {
        self.slot_policy = policy;
        self
    }

    /// Read overrides from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Read overrides through `get_env` (used by tests).
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| get_env(key).is_some_and(|v| env_flag(&v));
        Self {
            log_events: flag("TETHER_LOG_EVENTS"),
            slot_policy: if flag("TETHER_STRICT_SLOT") {
                SlotPolicy::Reject
            } else {
                SlotPolicy::Readopt
            },
        }
    }

    /// Process-wide configuration, read from the environment once.
    #[must_use]
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<ProxyConfig> = OnceLock::new();
        GLOBAL.get_or_init(Self::from_env)
    }
}

#[inline]
fn env_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = ProxyConfig::default();
        assert!(!cfg.log_events);
        assert_eq!(cfg.slot_policy, SlotPolicy::Readopt);
    }

    #[test]
    fn env_overrides() {
        let cfg = ProxyConfig::from_env_with(env(&[
            ("TETHER_LOG_EVENTS", " Yes "),
            ("TETHER_STRICT_SLOT", "1"),
        ]));
        assert!(cfg.log_events);
        assert_eq!(cfg.slot_policy, SlotPolicy::Reject);
    }

    #[test]
    fn falsy_values_keep_defaults() {
        let cfg = ProxyConfig::from_env_with(env(&[
            ("TETHER_LOG_EVENTS", "0"),
            ("TETHER_STRICT_SLOT", "off"),
        ]));
        assert_eq!(cfg, ProxyConfig::default());
    }

    #[test]
    fn builder() {
        let cfg = ProxyConfig::new()
            .with_log_events(true)
            .with_slot_policy(SlotPolicy::Reject);
        assert!(cfg.log_events);
        assert_eq!(cfg.slot_policy, SlotPolicy::Reject);
    }
}
