//! Command-line driver for the `wxrpc` binary.
//!
//! The driver is a thin presentation layer: it parses arguments, connects
//! one [`Client`], and renders results. Output streams are injected so tests
//! can capture them.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

use wxrpc_config::{Config, ConfigArgs, ConfigError, LogFormat};

use crate::{Client, ClientError, ToolDescriptor, WeatherReport};

#[derive(Debug, Parser)]
#[command(name = "wxrpc", version, about = "Query a wxrpcd server")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the operations the server offers.
    Tools,
    /// Look up the current weather for one or more cities.
    Weather {
        /// City names; all lookups run concurrently over one connection.
        #[arg(required = true, value_name = "CITY")]
        cities: Vec<String>,
    },
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid log filter: {0}")]
    LogFilter(#[from] ParseError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Runs the driver and returns the process exit code.
///
/// Exit code 0 means every call succeeded.
pub fn run<I, T, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let rendered = error.render();
            let written = if error.use_stderr() {
                write!(stderr, "{rendered}")
            } else {
                write!(stdout, "{rendered}")
            };
            return if error.exit_code() == 0 && written.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
        }
    };

    match execute(cli, stdout, stderr) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            if let Err(write_error) = writeln!(stderr, "wxrpc: {error}") {
                debug!(%write_error, "could not report failure");
            }
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every call succeeded.
fn execute<W: Write, E: Write>(cli: Cli, stdout: &mut W, stderr: &mut E) -> Result<bool, AppError> {
    let config = cli.config.resolve()?;
    install_logging(&config)?;
    let client = Client::from_config(&config)?;

    match cli.command {
        Command::Tools => {
            for tool in client.list_tools()? {
                writeln!(stdout, "{}", render_tool(&tool))?;
            }
            Ok(true)
        }
        Command::Weather { cities } => {
            let calls = cities
                .iter()
                .map(|city| client.submit_weather(city))
                .collect::<Result<Vec<_>, _>>()?;
            let mut all_ok = true;
            for (city, call) in cities.iter().zip(calls) {
                match call.into_typed::<WeatherReport>() {
                    Ok(report) => writeln!(stdout, "{}", render_report(&report))?,
                    Err(error) => {
                        all_ok = false;
                        writeln!(stderr, "{city}: {error}")?;
                    }
                }
            }
            Ok(all_ok)
        }
    }
}

fn install_logging(config: &Config) -> Result<(), ParseError> {
    let filter = EnvFilter::try_new(config.log_filter())?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false);
    let installed = match config.log_format() {
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    // Tests share one process, so a subscriber may already be installed.
    if installed.is_err() {
        debug!("keeping the existing log subscriber");
    }
    Ok(())
}

fn render_fields(fields: &std::collections::BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(name, kind)| format!("{name}: {kind}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_tool(tool: &ToolDescriptor) -> String {
    if tool.returns.is_empty() {
        format!("{}({})", tool.name, render_fields(&tool.args))
    } else {
        format!(
            "{}({}) -> {{{}}}",
            tool.name,
            render_fields(&tool.args),
            render_fields(&tool.returns)
        )
    }
}

fn render_report(report: &WeatherReport) -> String {
    let humidity = report
        .humidity
        .map_or_else(|| "n/a".to_owned(), |value| format!("{value}%"));
    let wind = report
        .wind_kph
        .map_or_else(|| "n/a".to_owned(), |value| format!("{value} km/h"));
    format!(
        "{}: {} °C, {}, humidity {humidity}, wind {wind} (updated {})",
        report.location, report.temp_c, report.condition, report.updated_at
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rstest::rstest;

    use super::*;

    #[test]
    fn renders_tool_signature() {
        let tool = ToolDescriptor {
            name: "get_weather".to_owned(),
            args: BTreeMap::from([("q".to_owned(), "string".to_owned())]),
            returns: BTreeMap::from([
                ("humidity".to_owned(), "number?".to_owned()),
                ("temp_c".to_owned(), "number".to_owned()),
            ]),
        };
        assert_eq!(
            render_tool(&tool),
            "get_weather(q: string) -> {humidity: number?, temp_c: number}"
        );
    }

    #[rstest]
    #[case(Some(81.0), "humidity 81%")]
    #[case(None, "humidity n/a")]
    fn renders_report(#[case] humidity: Option<f64>, #[case] expected: &str) {
        let report = WeatherReport {
            location: "Lima".to_owned(),
            temp_c: 18.5,
            humidity,
            condition: "overcast".to_owned(),
            wind_kph: Some(9.5),
            updated_at: "2024-05-01T13:00".to_owned(),
        };
        let line = render_report(&report);
        assert!(line.starts_with("Lima: 18.5 °C, overcast"));
        assert!(line.contains(expected));
        assert!(line.contains("wind 9.5 km/h"));
    }

    #[test]
    fn missing_command_is_a_usage_error() {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run(["wxrpc"], &mut stdout, &mut stderr);
        assert_eq!(code, ExitCode::FAILURE);
        assert!(!stderr.is_empty());
    }

    #[test]
    fn weather_requires_a_city() {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run(["wxrpc", "weather"], &mut stdout, &mut stderr);
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[test]
    fn unparsable_log_filter_is_reported() {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run(
            ["wxrpc", "--log-filter", "wxrpc=notalevel", "tools"],
            &mut stdout,
            &mut stderr,
        );
        assert_eq!(code, ExitCode::FAILURE);
        let message = String::from_utf8_lossy(&stderr);
        assert!(message.contains("invalid log filter"), "stderr: {message}");
    }

    #[test]
    fn help_goes_to_stdout() {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run(["wxrpc", "--help"], &mut stdout, &mut stderr);
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(String::from_utf8_lossy(&stdout).contains("weather"));
    }
}
