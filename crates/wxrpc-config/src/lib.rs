//! Shared configuration for the weather RPC server and client.
//!
//! Both binaries resolve the same [`Config`] so that they agree on the
//! endpoint, the message size limit, and how logs are rendered. Values are
//! layered with command-line flags taking precedence over `WXRPC_*`
//! environment variables, which in turn take precedence over the built-in
//! defaults. Invalid values fail the load instead of falling back silently.

mod defaults;
mod endpoint;
mod load;
mod logging;

use std::time::Duration;

pub use defaults::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_MAX_MESSAGE_BYTES,
    DEFAULT_PORT, DEFAULT_UPSTREAM_TIMEOUT_SECS, default_endpoint, default_log_filter,
    default_log_format,
};
pub use endpoint::{Endpoint, EndpointParseError};
pub use load::{ConfigArgs, ConfigError};
pub use logging::LogFormat;

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Endpoint the server listens on and the client connects to.
    pub endpoint: Endpoint,
    /// `tracing` filter directive, for example `info,wxrpcd=debug`.
    pub log_filter: String,
    /// Output format for log events.
    pub log_format: LogFormat,
    /// Largest envelope line accepted in either direction.
    pub max_message_bytes: usize,
    /// Timeout for each upstream provider call, in seconds.
    pub upstream_timeout_secs: u64,
    /// Timeout for establishing the client connection, in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: default_log_format(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a flag or environment variable is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from an explicit argument list.
    ///
    /// The first item is treated as the program name, as with
    /// [`std::env::args_os`]. Environment variables are still consulted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a flag or environment variable is invalid.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        load::parse_standalone(args)?.resolve()
    }

    /// Endpoint the server listens on and the client connects to.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Largest envelope line accepted in either direction.
    #[must_use]
    pub const fn max_message_bytes(&self) -> usize {
        self.max_message_bytes
    }

    /// Timeout for each upstream provider call.
    #[must_use]
    pub const fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Timeout for establishing the client connection.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
