//! Logging bootstrap for binaries and demos.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! caller's decision.

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The default directive is not a valid filter.
    #[error("invalid log directive: {0}")]
    Directive(#[from] ParseError),

    /// A global subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Installs a formatted subscriber filtered by `RUST_LOG`.
///
/// When `RUST_LOG` is unset or invalid, `default_directive` (for example
/// `"info"` or `"chatfeed=debug"`) is used instead.
///
/// # Errors
///
/// Returns [`TelemetryError::Directive`] when `default_directive` cannot be
/// parsed and [`TelemetryError::Install`] when a subscriber is already set.
pub fn init_tracing(default_directive: &str) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| TelemetryError::Install(err.to_string()))
}
