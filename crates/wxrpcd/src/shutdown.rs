//! Blocking wait for process termination signals.

use std::io;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

const SHUTDOWN_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::shutdown");

/// Errors reported while waiting for a shutdown signal.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Blocks until SIGINT, SIGTERM or SIGHUP arrives.
///
/// # Errors
///
/// Returns [`ShutdownError::Install`] if the handlers cannot be registered.
pub fn wait_for_signal() -> Result<(), ShutdownError> {
    let mut signals = Signals::new([SIGTERM, SIGINT, SIGHUP])
        .map_err(|source| ShutdownError::Install { source })?;
    if let Some(signal) = signals.forever().next() {
        info!(target: SHUTDOWN_TARGET, signal, "shutdown signal received");
    }
    Ok(())
}
