//! Logging
//!
//! The crate emits `tracing` events; binaries that embed it can install a
//! subscriber with these helpers.

use crate::error::{DeepSeekError, Result};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "deepseek_client=info,warn";

/// Install a global fmt subscriber. `RUST_LOG` takes precedence over
/// `default_filter`. Fails if a global subscriber is already set.
pub fn try_init_tracing(default_filter: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| DeepSeekError::Internal(format!("Failed to install subscriber: {}", e)))
}

/// Like [`try_init_tracing`] with [`DEFAULT_FILTER`], ignoring an already installed subscriber
pub fn init_tracing() {
    let _ = try_init_tracing(DEFAULT_FILTER);
}
