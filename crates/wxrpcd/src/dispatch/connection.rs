//! Connection handler that serves JSONL requests until the peer leaves.

use std::io::BufReader;
use std::net::TcpStream;
use std::sync::Arc;

use tracing::{debug, info, warn};

use wxrpc_protocol::{
    EnvelopeWriter, LineReader, RequestId, Response, decode_request,
    recover_request_id,
};

use crate::transport::ConnectionHandler;

use super::{DISPATCH_TARGET, DispatchError, Dispatcher};

/// Connection handler that decodes, dispatches and answers requests.
///
/// Each connection is served by a loop of read one line, dispatch, then
/// write one response. Requests on a connection are therefore answered
/// strictly in the order they arrive.
#[derive(Debug, Clone)]
pub struct DispatchConnectionHandler {
    dispatcher: Arc<Dispatcher>,
    max_message_bytes: usize,
}

impl DispatchConnectionHandler {
    /// Creates a handler sharing `dispatcher` across connections.
    #[must_use]
    pub const fn new(dispatcher: Arc<Dispatcher>, max_message_bytes: usize) -> Self {
        Self {
            dispatcher,
            max_message_bytes,
        }
    }

    fn serve(&self, stream: &TcpStream) {
        let peer = stream
            .peer_addr()
            .map_or_else(|_| "unknown".to_owned(), |addr| addr.to_string());
        info!(target: DISPATCH_TARGET, %peer, "client connected");

        let mut lines = LineReader::new(BufReader::new(stream), self.max_message_bytes);
        let mut writer = EnvelopeWriter::new(stream);
        loop {
            let response = match lines.read_line() {
                Ok(Some(line)) => self.respond(&line),
                Ok(None) => {
                    info!(target: DISPATCH_TARGET, %peer, "client closed the connection");
                    break;
                }
                Err(error) if error.is_recoverable() => {
                    let error = DispatchError::from(error);
                    warn!(target: DISPATCH_TARGET, %peer, %error, "request discarded");
                    Response::failure(None, error.to_string())
                }
                Err(error) => {
                    warn!(target: DISPATCH_TARGET, %peer, %error, "connection read failed");
                    break;
                }
            };

            if let Err(error) = writer.write_envelope(&response) {
                warn!(target: DISPATCH_TARGET, %peer, %error, "connection write failed");
                break;
            }
        }
    }

    /// Produces the single response owed for one request line.
    fn respond(&self, line: &[u8]) -> Response {
        let request = match decode_request(line) {
            Ok(request) => request,
            Err(error) => {
                let id = recover_request_id(line);
                let error = DispatchError::from(error);
                warn!(
                    target: DISPATCH_TARGET,
                    id = id.as_ref().map(RequestId::as_str),
                    %error,
                    "malformed request"
                );
                return Response::failure(id, error.to_string());
            }
        };

        let (id, operation, arguments) = request.into_parts();
        debug!(
            target: DISPATCH_TARGET,
            id = id.as_str(),
            operation = operation.as_str(),
            "dispatching request"
        );
        match self.dispatcher.dispatch(&operation, &arguments) {
            Ok(result) => Response::success(id, result),
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    id = id.as_str(),
                    operation = operation.as_str(),
                    %error,
                    "request failed"
                );
                Response::failure(Some(id), error.to_string())
            }
        }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, stream: TcpStream) {
        self.serve(&stream);
    }
}
