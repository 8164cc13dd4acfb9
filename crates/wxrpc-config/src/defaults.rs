//! Default values shared by the server and client binaries.

use crate::endpoint::Endpoint;
use crate::logging::LogFormat;

/// Host the server binds to and the client dials when nothing is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// TCP port used when nothing is configured.
pub const DEFAULT_PORT: u16 = 8787;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Largest accepted envelope line, terminator included.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Timeout applied to each upstream provider HTTP call.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Timeout applied when the client dials the server.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Endpoint used when neither the command line nor the environment names one.
#[must_use]
pub fn default_endpoint() -> Endpoint {
    Endpoint::new(DEFAULT_HOST, DEFAULT_PORT)
}
