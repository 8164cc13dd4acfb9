//! Entry point for the `wxrpc` command-line driver.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Unlocked handles: the reader thread logs to stderr while `run` waits
    // for it to exit.
    wxrpc_client::cli::run(std::env::args_os(), &mut io::stdout(), &mut io::stderr())
}
