//! Correlating client for the newline-delimited JSON RPC.
//!
//! A [`Client`] owns one TCP connection. [`Client::submit`] assigns the next
//! id (starting at 1), registers a pending entry, writes the request and
//! returns a [`PendingCall`] straight away. A background thread reads
//! responses and hands each one to the call with the matching id, so
//! responses may arrive in any order. Responses for ids nobody is waiting
//! on are dropped. When the connection ends, every call still pending
//! receives [`ClientError::ConnectionLost`].
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use wxrpc_client::Client;
//! use wxrpc_config::Endpoint;
//!
//! let client = Client::connect(&Endpoint::new("127.0.0.1", 8787), Duration::from_secs(5))?;
//! let lima = client.submit_weather("Lima")?;
//! let quito = client.submit_weather("Quito")?;
//! println!("{:?}", quito.into_typed::<wxrpc_client::WeatherReport>()?);
//! println!("{:?}", lima.into_typed::<wxrpc_client::WeatherReport>()?);
//! # Ok::<(), wxrpc_client::ClientError>(())
//! ```

pub mod cli;
mod client;
mod error;
mod pending;
mod reader;
mod tools;
mod transport;

pub use client::Client;
pub use error::{ClientError, WaitError};
pub use pending::PendingCall;
pub use tools::{ToolDescriptor, WeatherReport};
