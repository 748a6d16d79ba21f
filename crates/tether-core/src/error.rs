#![forbid(unsafe_code)]

//! Errors raised by the attachment registry.

use std::fmt;

/// Misuse of an [`Attachments`](crate::registry::Attachments) registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachError {
    /// The owning object is being (or has been) destroyed.
    TornDown,
    /// An entry with this key is already attached.
    Duplicate { key: &'static str },
}

impl fmt::Display for AttachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TornDown => write!(f, "attachments already torn down"),
            Self::Duplicate { key } => write!(f, "attachment already present: {key}"),
        }
    }
}

impl std::error::Error for AttachError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(AttachError::TornDown.to_string(), "attachments already torn down");
        assert!(
            AttachError::Duplicate { key: "proxy" }
                .to_string()
                .contains("proxy")
        );
    }
}
