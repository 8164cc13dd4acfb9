//! Error types for request dispatch failures.
//!
//! Each variant maps to one failure class of the protocol. The `Display`
//! text is what the client sees in the `error` field of the response.

use thiserror::Error;

use wxrpc_protocol::{ArgumentError, CodecError};

/// Errors surfaced while decoding or dispatching a single request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Request line is not JSON or lacks required fields.
    #[error("malformed envelope: {message}")]
    MalformedEnvelope {
        /// Decoder explanation.
        message: String,
    },

    /// No operation is registered under the requested name.
    #[error("unknown operation '{operation}'")]
    UnknownOperation {
        /// Requested operation name.
        operation: String,
    },

    /// Required arguments are missing or have the wrong type.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        /// What is wrong with the arguments.
        message: String,
    },

    /// A collaborator the operation depends on failed.
    #[error("upstream unavailable: {message}")]
    UpstreamUnavailable {
        /// Operation-level explanation.
        message: String,
    },

    /// Request line exceeded the configured limit and was discarded.
    #[error("request exceeds {limit} byte limit")]
    OversizedMessage {
        /// Configured limit in bytes.
        limit: usize,
    },

    /// The operation failed unexpectedly, for example by panicking.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the fault.
        message: String,
    },
}

impl DispatchError {
    /// Creates a malformed envelope error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedEnvelope {
            message: message.into(),
        }
    }

    /// Creates an unknown operation error.
    pub fn unknown_operation(operation: impl Into<String>) -> Self {
        Self::UnknownOperation {
            operation: operation.into(),
        }
    }

    /// Creates an invalid arguments error.
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
        }
    }

    /// Creates an upstream failure error.
    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    /// Creates an oversized request error.
    #[must_use]
    pub const fn oversized(limit: usize) -> Self {
        Self::OversizedMessage { limit }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<ArgumentError> for DispatchError {
    fn from(error: ArgumentError) -> Self {
        Self::invalid_arguments(error.to_string())
    }
}

impl From<CodecError> for DispatchError {
    fn from(error: CodecError) -> Self {
        match error {
            CodecError::MalformedEnvelope { message, .. } => Self::malformed(message),
            CodecError::OversizedMessage { limit } => Self::oversized(limit),
            other => Self::internal(other.to_string()),
        }
    }
}
