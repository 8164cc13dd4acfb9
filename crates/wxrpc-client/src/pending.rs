//! Table of requests awaiting a response.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender, sync_channel};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use wxrpc_protocol::{RequestId, Response};

use crate::error::{ClientError, WaitError};

/// What the reader hands to a waiting caller.
#[derive(Debug)]
pub(crate) enum Delivery {
    Response(Response),
    Lost(String),
}

/// Pending entries keyed by request id.
///
/// Once closed the table stays closed: the reason is kept so later
/// submissions fail with the same explanation.
#[derive(Debug)]
pub(crate) enum PendingTable {
    Open(HashMap<RequestId, SyncSender<Delivery>>),
    Closed(String),
}

impl Default for PendingTable {
    fn default() -> Self {
        Self::Open(HashMap::new())
    }
}

impl PendingTable {
    /// Registers `id` and returns the caller's side of its delivery slot.
    pub(crate) fn register(&mut self, id: RequestId) -> Result<PendingCall, ClientError> {
        match self {
            Self::Open(entries) => {
                let (sender, receiver) = sync_channel(1);
                entries.insert(id.clone(), sender);
                Ok(PendingCall { id, receiver })
            }
            Self::Closed(reason) => Err(ClientError::ConnectionLost {
                reason: reason.clone(),
            }),
        }
    }

    /// Removes and returns the entry for `id`.
    pub(crate) fn take(&mut self, id: &RequestId) -> Option<SyncSender<Delivery>> {
        match self {
            Self::Open(entries) => entries.remove(id),
            Self::Closed(_) => None,
        }
    }

    /// Closes the table and returns every entry that was still waiting.
    ///
    /// Closing an already closed table keeps the first reason.
    pub(crate) fn close(&mut self, reason: &str) -> Vec<SyncSender<Delivery>> {
        match std::mem::replace(self, Self::Closed(reason.to_owned())) {
            Self::Open(entries) => entries.into_values().collect(),
            Self::Closed(previous) => {
                *self = Self::Closed(previous);
                Vec::new()
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Open(entries) => entries.len(),
            Self::Closed(_) => 0,
        }
    }

    pub(crate) const fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }
}

/// A submitted request whose response has not been collected yet.
///
/// Dropping a `PendingCall` abandons interest in the response; its table
/// entry is released when the response arrives or the connection ends.
#[derive(Debug)]
pub struct PendingCall {
    id: RequestId,
    receiver: Receiver<Delivery>,
}

impl PendingCall {
    /// Id the request was sent with.
    #[must_use]
    pub const fn id(&self) -> &RequestId {
        &self.id
    }

    /// Blocks until the response, or a synthetic failure, arrives.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConnectionLost`] if the connection ended first,
    /// or [`ClientError::Forgotten`] if the entry was removed by
    /// [`crate::Client::forget`].
    pub fn wait(self) -> Result<Response, ClientError> {
        match self.receiver.recv() {
            Ok(delivery) => delivery.into_response(),
            Err(_) => Err(ClientError::Forgotten { id: self.id }),
        }
    }

    /// Waits at most `timeout` for the response.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::TimedOut`] with the call itself when nothing
    /// arrived in time, or [`WaitError::Failed`] as for [`PendingCall::wait`].
    pub fn wait_timeout(self, timeout: Duration) -> Result<Response, WaitError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(delivery) => delivery.into_response().map_err(WaitError::from),
            Err(RecvTimeoutError::Timeout) => Err(WaitError::TimedOut(self)),
            Err(RecvTimeoutError::Disconnected) => {
                Err(WaitError::Failed(ClientError::Forgotten { id: self.id }))
            }
        }
    }

    /// Waits and returns the `result` of a successful response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Remote`] for an `ok:false` response, or any
    /// error from [`PendingCall::wait`].
    pub fn into_result(self) -> Result<Value, ClientError> {
        self.wait()?
            .into_result()
            .map_err(|message| ClientError::Remote { message })
    }

    /// Waits and deserialises the `result` into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Decode`] when the result does not fit `T`, or
    /// any error from [`PendingCall::into_result`].
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        let id = self.id.clone();
        let value = self.into_result()?;
        serde_json::from_value(value).map_err(|source| ClientError::Decode { id, source })
    }
}

impl Delivery {
    fn into_response(self) -> Result<Response, ClientError> {
        match self {
            Self::Response(response) => Ok(response),
            Self::Lost(reason) => Err(ClientError::ConnectionLost { reason }),
        }
    }
}
