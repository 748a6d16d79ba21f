#![forbid(unsafe_code)]

//! Logging setup.
//!
//! Every Tether crate logs through `tracing`. Applications that already
//! install a subscriber need nothing from here. With the `tracing-json`
//! feature, [`init_json_logging`] installs a JSON formatter filtered by the
//! `TETHER_LOG` variable (same syntax as `RUST_LOG`).

pub use tracing::{debug, debug_span, error, info, trace, trace_span, warn};

/// Environment variable holding the log filter.
pub const LOG_FILTER_ENV: &str = "TETHER_LOG";

/// Install a global JSON subscriber.
///
/// Returns `false` when a global subscriber was already set.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .try_init()
        .is_ok()
}
