//! Log output for the binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! binary's decision.

use deckhand_foundation::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Filter used when neither `--log-level` nor `RUST_LOG` is given.
pub const DEFAULT_FILTER: &str = "warn";

/// Builds the filter: an explicit directive wins over `RUST_LOG`.
///
/// # Errors
///
/// Returns an invalid input error for a malformed directive.
pub fn env_filter(directive: Option<&str>) -> Result<EnvFilter> {
    match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .map_err(|e| Error::invalid_input(format!("invalid log level '{directive}': {e}"))),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Installs a `fmt` subscriber writing to stderr.
///
/// # Errors
///
/// Returns an error for a malformed directive or when a global subscriber
/// is already installed.
pub fn init_logging(directive: Option<&str>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(directive)?)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| Error::internal(format!("failed to install logger: {e}")))
}
