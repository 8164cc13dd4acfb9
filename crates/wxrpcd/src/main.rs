//! Entry point for the `wxrpcd` server binary.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use wxrpc_config::{Config, ConfigError};
use wxrpcd::{
    DispatchConnectionHandler, ListenerError, RegistryError, ShutdownError, SocketListener,
    TelemetryError, default_dispatcher, telemetry, wait_for_signal,
};

const MAIN_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::main");

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Listener(#[from] ListenerError),
    #[error(transparent)]
    Shutdown(#[from] ShutdownError),
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        // Covers --help and --version as well as genuine usage errors.
        Err(StartupError::Config(ConfigError::Arguments(clap_error))) => clap_error.exit(),
        Err(startup_error) => {
            error!(target: MAIN_TARGET, error = %startup_error, "server failed");
            if let Err(write_error) = writeln!(io::stderr(), "wxrpcd: {startup_error}") {
                error!(target: MAIN_TARGET, error = %write_error, "could not write to stderr");
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), StartupError> {
    let config = Config::load()?;
    telemetry::initialise(&config)?;

    let dispatcher = Arc::new(default_dispatcher(config.upstream_timeout())?);
    let handler = DispatchConnectionHandler::new(dispatcher, config.max_message_bytes());
    let listener = SocketListener::bind(config.endpoint())?;
    if let Some(addr) = listener.local_addr() {
        info!(target: MAIN_TARGET, %addr, "listening");
    }
    let handle = listener.start(Arc::new(handler))?;

    let waited = wait_for_signal();
    handle.shutdown();
    handle.join()?;
    waited?;
    info!(target: MAIN_TARGET, "server stopped");
    Ok(())
}
