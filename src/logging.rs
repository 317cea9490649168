//! Tracing subscriber setup
//!
//! The library only emits `tracing` events. Binaries and tests that want to
//! see them install a subscriber with [`init_with_level`].

use tracing_subscriber::EnvFilter;

use crate::errors::LoggingError;
use crate::Result;

/// Filter used when neither a level nor `RUST_LOG` is given
pub const DEFAULT_FILTER: &str = "info";

/// Installs a compact `fmt` subscriber
///
/// Explicit `level` directives win. Otherwise `RUST_LOG` is used when it
/// parses, and [`DEFAULT_FILTER`] when it is unset or does not.
///
/// # Returns
/// `true` if this call installed the subscriber, `false` if a global
/// subscriber was already set
///
/// # Errors
/// * `LoggingError::InvalidFilter` - If `level` does not parse
/// * `LoggingError::InstallFailed` - If the subscriber could not be installed
pub fn init_with_level(level: Option<&str>) -> Result<bool> {
    let filter = build_filter(level)?;
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    match tracing_subscriber::fmt().with_env_filter(filter).compact().try_init() {
        Ok(()) => Ok(true),
        Err(_) if tracing::dispatcher::has_been_set() => Ok(false),
        Err(err) => Err(LoggingError::InstallFailed { reason: err.to_string() }.into()),
    }
}

fn build_filter(level: Option<&str>) -> Result<EnvFilter> {
    let parsed = match level {
        Some(directives) => EnvFilter::try_new(directives),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER)),
    };
    parsed.map_err(|err| {
        LoggingError::InvalidFilter {
            directives: level.unwrap_or(DEFAULT_FILTER).to_string(),
            reason: err.to_string(),
        }
        .into()
    })
}
