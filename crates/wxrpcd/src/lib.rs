//! Newline-delimited JSON RPC server.
//!
//! The server accepts TCP connections on the configured endpoint and serves
//! each one on its own thread. Every connection runs a strict read, dispatch,
//! write loop against a shared, immutable [`Dispatcher`]; a failure on one
//! connection never reaches another. Two operations are available out of the
//! box: the built-in `tools.list` and [`GetWeather`], which resolves a city
//! through a [`WeatherProvider`] collaborator.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use wxrpcd::{DispatchConnectionHandler, SocketListener, default_dispatcher};
//! use wxrpc_config::Config;
//!
//! let config = Config::default();
//! let dispatcher = default_dispatcher(Duration::from_secs(10))?;
//! let handler = DispatchConnectionHandler::new(Arc::new(dispatcher), config.max_message_bytes());
//! let listener = SocketListener::bind(config.endpoint())?;
//! let handle = listener.start(Arc::new(handler))?;
//! handle.shutdown();
//! handle.join()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod dispatch;
mod shutdown;
pub mod telemetry;
mod transport;
pub mod weather;

use std::time::Duration;

pub use dispatch::{
    DispatchConnectionHandler, DispatchError, Dispatcher, DispatcherBuilder, Operation,
    OperationDescriptor, RegistryError, TOOLS_LIST,
};
pub use shutdown::{ShutdownError, wait_for_signal};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{ConnectionHandler, ListenerError, ListenerHandle, SocketListener};
pub use weather::{GET_WEATHER, GetWeather, OpenMeteoProvider, WeatherProvider};

/// Builds the dispatcher served by the `wxrpcd` binary.
///
/// # Errors
///
/// Returns [`RegistryError`] if two operations claim the same name.
pub fn default_dispatcher(upstream_timeout: Duration) -> Result<Dispatcher, RegistryError> {
    Ok(Dispatcher::builder()
        .register(GetWeather::new(OpenMeteoProvider::new(upstream_timeout)))?
        .build())
}
