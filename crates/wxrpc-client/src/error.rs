//! Error types surfaced by the correlating client.

use std::io;

use thiserror::Error;

use wxrpc_config::Endpoint;
use wxrpc_protocol::{CodecError, RequestId};

use crate::PendingCall;

/// Failures reported by [`crate::Client`] and [`PendingCall`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The endpoint host could not be resolved.
    #[error("failed to resolve {endpoint}: {source}")]
    Resolve {
        /// Endpoint as configured.
        endpoint: String,
        /// Resolver error.
        #[source]
        source: io::Error,
    },

    /// The TCP connection could not be established.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        /// Endpoint as configured.
        endpoint: String,
        /// Connect error.
        #[source]
        source: io::Error,
    },

    /// The socket could not be duplicated for the background reader, or the
    /// reader thread could not be started.
    #[error("failed to prepare connection: {source}")]
    Setup {
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The connection ended before a response arrived.
    #[error("connection lost: {reason}")]
    ConnectionLost {
        /// Why the reader stopped.
        reason: String,
    },

    /// The server answered `ok:false`.
    #[error("server error: {message}")]
    Remote {
        /// Error text sent by the server.
        message: String,
    },

    /// Interest in the request was dropped with [`crate::Client::forget`].
    #[error("request {id} was forgotten")]
    Forgotten {
        /// Id of the abandoned request.
        id: RequestId,
    },

    /// The request could not be encoded, or exceeds the message limit.
    #[error("failed to encode request: {0}")]
    Encode(#[source] CodecError),

    /// Writing the request to the socket failed.
    #[error("failed to send request: {source}")]
    Write {
        /// Socket error.
        #[source]
        source: io::Error,
    },

    /// A successful result did not have the expected shape.
    #[error("unexpected result for request {id}: {source}")]
    Decode {
        /// Request whose result was rejected.
        id: RequestId,
        /// Deserialisation error.
        #[source]
        source: serde_json::Error,
    },

    /// The background reader thread panicked.
    #[error("response reader thread panicked")]
    ReaderPanicked,
}

impl ClientError {
    pub(crate) fn resolve(endpoint: &Endpoint, source: io::Error) -> Self {
        Self::Resolve {
            endpoint: endpoint.to_string(),
            source,
        }
    }

    pub(crate) fn connect(endpoint: &Endpoint, source: io::Error) -> Self {
        Self::Connect {
            endpoint: endpoint.to_string(),
            source,
        }
    }
}

/// Outcome of [`PendingCall::wait_timeout`] when no response is available.
#[derive(Debug, Error)]
pub enum WaitError {
    /// Nothing arrived in time. The call is handed back so the caller can
    /// keep waiting or drop it.
    #[error("timed out waiting for response to request {}", .0.id())]
    TimedOut(PendingCall),

    /// The call can no longer complete.
    #[error(transparent)]
    Failed(#[from] ClientError),
}
