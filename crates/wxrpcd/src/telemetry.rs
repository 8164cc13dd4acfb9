//! Structured telemetry initialisation for the server.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, time::UtcTime};

use wxrpc_config::{Config, LogFormat};

static TELEMETRY_GUARD: OnceCell<LogFormat> = OnceCell::new();

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Proof that the global subscriber is in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Format chosen by the call that installed the subscriber.
    #[must_use]
    pub const fn format(self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global subscriber on the first call.
///
/// Later calls leave the installed subscriber alone and report the format it
/// was installed with.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an unparsable filter, or
/// [`TelemetryError::Subscriber`] if another subscriber is already installed.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let format = TELEMETRY_GUARD.get_or_try_init(|| {
        let subscriber = build_subscriber(config)?;
        tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)?;
        Ok::<_, TelemetryError>(config.log_format())
    })?;
    Ok(TelemetryHandle { format: *format })
}

fn build_subscriber(config: &Config) -> Result<BoxedSubscriber, TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(io::stderr)
        // Colour only when a person is watching.
        .with_ansi(io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339());

    Ok(match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    })
}
