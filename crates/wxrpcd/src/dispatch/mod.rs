//! JSONL request dispatch for the RPC server.
//!
//! The [`DispatchConnectionHandler`] plugs into the transport layer via the
//! [`ConnectionHandler`](crate::ConnectionHandler) trait. It reads
//! one request per line, hands it to the shared [`Dispatcher`], and writes
//! exactly one response per request, in the order the requests were read.
//!
//! ## Protocol
//!
//! ```json
//! {"id":"7","tool":"get_weather","args":{"q":"Lima"}}
//! ```
//!
//! is answered with either
//!
//! ```json
//! {"id":"7","ok":true,"result":{"location":"Lima","temp_c":18.4,"humidity":81.0,"condition":"overcast","wind_kph":9.7,"updated_at":"2024-05-01T13:00"}}
//! ```
//!
//! or a failure envelope carrying the `Display` text of a [`DispatchError`]:
//!
//! ```json
//! {"id":"7","ok":false,"error":"upstream unavailable: city not found or no data available (Lima)"}
//! ```
//!
//! Per-request failures never close the connection. Only a read or write
//! fault on the socket does, and that affects no other connection.

mod connection;
mod dispatcher;
mod errors;
mod operation;

pub use self::connection::DispatchConnectionHandler;
pub use self::dispatcher::{Dispatcher, DispatcherBuilder, RegistryError, TOOLS_LIST};
pub use self::errors::DispatchError;
pub use self::operation::{Operation, OperationDescriptor};

const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
