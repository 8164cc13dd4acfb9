//! Background reader that routes responses to waiting callers.

use std::io::BufReader;
use std::net::TcpStream;
use std::sync::Arc;

use tracing::{debug, info, warn};

use wxrpc_protocol::{LineReader, Response, decode_response};

use crate::client::Shared;
use crate::pending::Delivery;

const READER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::reader");

/// Reason recorded when the server closes the stream cleanly.
pub(crate) const SERVER_CLOSED: &str = "connection closed by server";

/// Drains the stream until it ends, then fails every remaining caller.
///
/// This is the only consumer of the read half.
pub(crate) fn run(stream: TcpStream, shared: &Arc<Shared>, limit: usize) {
    let mut lines = LineReader::new(BufReader::new(stream), limit);
    let reason = loop {
        match lines.read_line() {
            Ok(Some(line)) => match decode_response(&line) {
                Ok(response) => deliver(shared, response),
                Err(error) => break format!("undecodable response: {error}"),
            },
            Ok(None) => break SERVER_CLOSED.to_owned(),
            Err(error) => break error.to_string(),
        }
    };

    let orphans = shared.pending().close(&reason);
    if orphans.is_empty() {
        info!(target: READER_TARGET, %reason, "response reader stopped");
    } else {
        warn!(
            target: READER_TARGET,
            %reason,
            pending = orphans.len(),
            "response reader stopped with requests in flight"
        );
    }
    for sender in orphans {
        if sender.try_send(Delivery::Lost(reason.clone())).is_err() {
            debug!(target: READER_TARGET, "caller stopped waiting");
        }
    }
}

fn deliver(shared: &Shared, response: Response) {
    let Some(id) = response.id().cloned() else {
        warn!(
            target: READER_TARGET,
            error = response.error(),
            "server reported an error without a request id"
        );
        return;
    };
    let Some(sender) = shared.pending().take(&id) else {
        debug!(target: READER_TARGET, id = id.as_str(), "dropping response for unknown id");
        return;
    };
    if sender.try_send(Delivery::Response(response)).is_err() {
        debug!(target: READER_TARGET, id = id.as_str(), "caller stopped waiting");
    }
}
