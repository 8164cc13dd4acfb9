//! The correlating client.

use std::io::Write;
use std::net::{Shutdown, TcpStream};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use wxrpc_config::{Config, DEFAULT_MAX_MESSAGE_BYTES, Endpoint};
use wxrpc_protocol::{Arguments, CodecError, Request, RequestId, encode};

use crate::error::ClientError;
use crate::pending::{Delivery, PendingCall, PendingTable};
use crate::tools::{ToolDescriptor, ToolList, WeatherReport};
use crate::{reader, transport};

const CLIENT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::client");
const CLIENT_CLOSED: &str = "connection closed by client";
const TOOLS_LIST: &str = "tools.list";
const GET_WEATHER: &str = "get_weather";

/// Write side of the connection plus the id counter it hands out.
///
/// Keeping both under one lock means ids reach the wire in increasing order.
#[derive(Debug)]
struct WriteHalf {
    stream: TcpStream,
    next_id: u64,
}

/// State shared between callers and the background reader.
#[derive(Debug)]
pub(crate) struct Shared {
    writer: Mutex<WriteHalf>,
    pending: Mutex<PendingTable>,
}

impl Shared {
    /// Locks the pending table.
    ///
    /// A poisoned lock is recovered: every mutation of the table is a single
    /// map operation, so it is never left half-updated.
    pub(crate) fn pending(&self) -> MutexGuard<'_, PendingTable> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn writer(&self) -> MutexGuard<'_, WriteHalf> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Client for one long-lived RPC connection.
///
/// Requests may be submitted from any number of threads; a single
/// background thread reads responses and routes each one to its caller by
/// id, whatever order they arrive in. When the connection ends every
/// outstanding call fails with [`ClientError::ConnectionLost`], and the
/// client stays unusable until a new one is connected.
#[derive(Debug)]
pub struct Client {
    shared: Arc<Shared>,
    control: TcpStream,
    reader: Option<JoinHandle<()>>,
    limit: usize,
}

impl Client {
    /// Connects to `endpoint` with the default message limit.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Resolve`], [`ClientError::Connect`] or
    /// [`ClientError::Setup`].
    pub fn connect(endpoint: &Endpoint, connect_timeout: Duration) -> Result<Self, ClientError> {
        let stream = transport::connect(endpoint, connect_timeout)?;
        Self::from_stream(stream, DEFAULT_MAX_MESSAGE_BYTES)
    }

    /// Connects using the endpoint, timeout and limit from `config`.
    ///
    /// # Errors
    ///
    /// As for [`Client::connect`].
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let stream = transport::connect(config.endpoint(), config.connect_timeout())?;
        Self::from_stream(stream, config.max_message_bytes())
    }

    /// Wraps an already connected stream and starts the reader.
    ///
    /// `max_message_bytes` bounds both outgoing requests and incoming
    /// responses.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Setup`] if the socket cannot be cloned or the
    /// reader thread cannot be spawned.
    pub fn from_stream(stream: TcpStream, max_message_bytes: usize) -> Result<Self, ClientError> {
        let setup = |source| ClientError::Setup { source };
        let read_half = stream.try_clone().map_err(setup)?;
        let control = stream.try_clone().map_err(setup)?;
        let shared = Arc::new(Shared {
            writer: Mutex::new(WriteHalf { stream, next_id: 1 }),
            pending: Mutex::new(PendingTable::default()),
        });

        let reader_shared = Arc::clone(&shared);
        let reader = thread::Builder::new()
            .name("wxrpc-reader".to_owned())
            .spawn(move || reader::run(read_half, &reader_shared, max_message_bytes))
            .map_err(setup)?;

        Ok(Self {
            shared,
            control,
            reader: Some(reader),
            limit: max_message_bytes,
        })
    }

    /// Sends a request and returns without waiting for its response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConnectionLost`] once the connection has
    /// ended, [`ClientError::Encode`] if the request cannot be encoded or is
    /// over the message limit, or [`ClientError::Write`] if the socket
    /// write fails.
    pub fn submit(
        &self,
        operation: &str,
        arguments: Arguments,
    ) -> Result<PendingCall, ClientError> {
        let mut writer = self.shared.writer();
        let id = RequestId::from(writer.next_id);
        writer.next_id += 1;

        let line =
            encode(&Request::new(id.clone(), operation, arguments)).map_err(ClientError::Encode)?;
        if line.len() > self.limit {
            return Err(ClientError::Encode(CodecError::oversized(self.limit)));
        }

        // Registered before the write so the response cannot overtake it.
        let call = self.shared.pending().register(id.clone())?;
        if let Err(source) = writer
            .stream
            .write_all(&line)
            .and_then(|()| writer.stream.flush())
        {
            self.shared.pending().take(&id);
            return Err(ClientError::Write { source });
        }
        debug!(target: CLIENT_TARGET, id = id.as_str(), operation, "request sent");
        Ok(call)
    }

    /// Sends a request and waits for its result.
    ///
    /// # Errors
    ///
    /// Any error from [`Client::submit`] or [`PendingCall::into_result`].
    pub fn call(&self, operation: &str, arguments: Arguments) -> Result<Value, ClientError> {
        self.submit(operation, arguments)?.into_result()
    }

    /// Lists the operations the server offers.
    ///
    /// # Errors
    ///
    /// As for [`Client::call`], plus [`ClientError::Decode`] for an
    /// unexpected result shape.
    pub fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ClientError> {
        let list: ToolList = self.submit(TOOLS_LIST, Arguments::new())?.into_typed()?;
        Ok(list.tools)
    }

    /// Submits a `get_weather` lookup without waiting.
    ///
    /// # Errors
    ///
    /// As for [`Client::submit`].
    pub fn submit_weather(&self, query: &str) -> Result<PendingCall, ClientError> {
        self.submit(GET_WEATHER, Arguments::new().with("q", query))
    }

    /// Looks up the current weather for `query`.
    ///
    /// # Errors
    ///
    /// As for [`Client::list_tools`].
    pub fn get_weather(&self, query: &str) -> Result<WeatherReport, ClientError> {
        self.submit_weather(query)?.into_typed()
    }

    /// Drops interest in `id`. A late response for it is discarded.
    ///
    /// Returns `false` when no such request was pending.
    #[must_use]
    pub fn forget(&self, id: &RequestId) -> bool {
        self.shared.pending().take(id).is_some()
    }

    /// Number of requests still awaiting a response.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared.pending().len()
    }

    /// Returns `false` once the reader has stopped or the client is closed.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.shared.pending().is_open()
    }

    /// Shuts the connection down and waits for the reader to exit.
    ///
    /// Outstanding calls fail with [`ClientError::ConnectionLost`]. Closing
    /// twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ReaderPanicked`] if the reader thread panicked.
    pub fn close(&mut self) -> Result<(), ClientError> {
        let orphans = self.shared.pending().close(CLIENT_CLOSED);
        for sender in orphans {
            if sender
                .try_send(Delivery::Lost(CLIENT_CLOSED.to_owned()))
                .is_err()
            {
                debug!(target: CLIENT_TARGET, "caller stopped waiting");
            }
        }
        if let Err(error) = self.control.shutdown(Shutdown::Both) {
            debug!(target: CLIENT_TARGET, %error, "socket already shut down");
        }
        match self.reader.take() {
            Some(handle) => handle.join().map_err(|_| ClientError::ReaderPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            warn!(target: CLIENT_TARGET, %error, "client shutdown failed");
        }
    }
}
