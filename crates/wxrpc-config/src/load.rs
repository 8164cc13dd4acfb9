//! Layered configuration loading on top of `clap`.
//!
//! [`ConfigArgs`] is a flattenable argument group: binaries embed it in their
//! own parser and call [`ConfigArgs::resolve`]. Every flag also reads a
//! `WXRPC_*` environment variable, and anything left unset falls back to the
//! defaults in [`crate::defaults`].

use std::ffi::OsString;

use clap::{Args, Parser};
use thiserror::Error;

use crate::defaults::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_LOG_FILTER, DEFAULT_MAX_MESSAGE_BYTES,
    DEFAULT_UPSTREAM_TIMEOUT_SECS,
};
use crate::{Config, Endpoint, LogFormat, default_endpoint, default_log_format};

/// Configuration flags shared by every binary in the workspace.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Server endpoint as `tcp://host:port`.
    #[arg(long, env = "WXRPC_ENDPOINT", value_name = "URL", global = true)]
    pub endpoint: Option<Endpoint>,
    /// Log filter directive, for example `info,wxrpcd=debug`.
    #[arg(long, env = "WXRPC_LOG_FILTER", value_name = "FILTER", global = true)]
    pub log_filter: Option<String>,
    /// Log output format (`json` or `compact`).
    #[arg(long, env = "WXRPC_LOG_FORMAT", value_name = "FORMAT", global = true)]
    pub log_format: Option<LogFormat>,
    /// Largest accepted envelope line in bytes.
    #[arg(
        long,
        env = "WXRPC_MAX_MESSAGE_BYTES",
        value_name = "BYTES",
        global = true,
    )]
    pub max_message_bytes: Option<usize>,
    /// Timeout for upstream provider calls in seconds.
    #[arg(
        long,
        env = "WXRPC_UPSTREAM_TIMEOUT_SECS",
        value_name = "SECS",
        global = true,
    )]
    pub upstream_timeout_secs: Option<u64>,
    /// Timeout for establishing the client connection in seconds.
    #[arg(
        long,
        env = "WXRPC_CONNECT_TIMEOUT_SECS",
        value_name = "SECS",
        global = true,
    )]
    pub connect_timeout_secs: Option<u64>,
}

impl ConfigArgs {
    /// Applies defaults to unset values and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is out of range.
    pub fn resolve(self) -> Result<Config, ConfigError> {
        let max_message_bytes = self.max_message_bytes.unwrap_or(DEFAULT_MAX_MESSAGE_BYTES);
        if max_message_bytes == 0 {
            return Err(ConfigError::invalid("max_message_bytes", "must be greater than zero"));
        }
        let log_filter = self.log_filter.unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned());
        if log_filter.trim().is_empty() {
            return Err(ConfigError::invalid("log_filter", "must not be empty"));
        }
        let connect_timeout_secs = self
            .connect_timeout_secs
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        if connect_timeout_secs == 0 {
            return Err(ConfigError::invalid("connect_timeout_secs", "must be greater than zero"));
        }

        Ok(Config {
            endpoint: self.endpoint.unwrap_or_else(default_endpoint),
            log_filter,
            log_format: self.log_format.unwrap_or_else(default_log_format),
            max_message_bytes,
            upstream_timeout_secs: self
                .upstream_timeout_secs
                .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            connect_timeout_secs,
        })
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A flag or environment variable could not be parsed.
    #[error(transparent)]
    Arguments(#[from] clap::Error),
    /// A value parsed but is outside its permitted range.
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Name of the offending setting.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

impl ConfigError {
    const fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::Invalid { field, reason }
    }
}

#[derive(Debug, Parser)]
#[command(about = None, long_about = None)]
struct StandaloneArgs {
    #[command(flatten)]
    config: ConfigArgs,
}

pub(crate) fn parse_standalone<I, T>(args: I) -> Result<ConfigArgs, ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    StandaloneArgs::try_parse_from(args)
        .map(|parsed| parsed.config)
        .map_err(ConfigError::from)
}
