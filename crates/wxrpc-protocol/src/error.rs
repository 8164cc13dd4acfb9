//! Errors raised while framing, encoding, or decoding envelopes.

use std::io;

use thiserror::Error;

/// Failures surfaced by the wire codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The line is not JSON, or lacks a field required for its direction.
    #[error("malformed envelope: {message}")]
    MalformedEnvelope {
        /// Human-readable description of the defect.
        message: String,
        /// Underlying JSON error, when there is one.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The line exceeded the configured maximum and was discarded.
    #[error("message exceeds {limit} byte limit")]
    OversizedMessage {
        /// Configured maximum line length in bytes.
        limit: usize,
    },

    /// The underlying stream failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// An envelope could not be serialised.
    #[error("failed to serialise envelope: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl CodecError {
    /// Creates a malformed envelope error with a custom message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedEnvelope {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a malformed envelope error from a serde error.
    #[must_use]
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedEnvelope {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates an oversized message error.
    #[must_use]
    pub const fn oversized(limit: usize) -> Self {
        Self::OversizedMessage { limit }
    }

    /// Returns `true` when the error leaves the stream positioned at the
    /// start of the next line, so the connection can keep being read.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedEnvelope { .. } | Self::OversizedMessage { .. }
        )
    }
}

/// Reasons an argument lookup on [`crate::Arguments`] can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// The argument was not supplied.
    #[error("missing argument '{name}'")]
    Missing {
        /// Argument name.
        name: String,
    },
    /// The argument was supplied with the wrong JSON type.
    #[error("argument '{name}' must be a {expected}")]
    WrongType {
        /// Argument name.
        name: String,
        /// JSON type the operation expects.
        expected: &'static str,
    },
}
