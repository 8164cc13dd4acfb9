//! Client against a real server on a loopback port.

use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rstest::{fixture, rstest};
use serde_json::{Value, json};

use wxrpc_client::{Client, ClientError, WeatherReport, cli};
use wxrpc_config::Endpoint;
use wxrpc_protocol::Arguments;
use wxrpcd::weather::{CurrentWeather, Location, ProviderError, WeatherProvider};
use wxrpcd::{
    DispatchConnectionHandler, DispatchError, Dispatcher, GetWeather, ListenerHandle, Operation,
    OperationDescriptor, SocketListener,
};

struct Echo;

impl Operation for Echo {
    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new("echo")
            .arg("n", "number")
            .returns("n", "number")
    }

    fn invoke(&self, arguments: &Arguments) -> Result<Value, DispatchError> {
        let n = arguments
            .get("n")
            .cloned()
            .ok_or_else(|| DispatchError::invalid_arguments("missing parameter n"))?;
        Ok(json!({ "n": n }))
    }
}

struct TwoCities;

impl WeatherProvider for TwoCities {
    fn geocode(&self, query: &str) -> Result<Location, ProviderError> {
        let (latitude, longitude) = match query {
            "Lima" => (-12.04, -77.03),
            "Quito" => (-0.22, -78.5),
            _ => {
                return Err(ProviderError::NotFound {
                    query: query.to_owned(),
                });
            }
        };
        Ok(Location {
            name: query.to_owned(),
            latitude,
            longitude,
        })
    }

    fn current_weather(&self, location: &Location) -> Result<CurrentWeather, ProviderError> {
        Ok(CurrentWeather {
            temp_c: if location.name == "Lima" { 18.5 } else { 12.0 },
            humidity: Some(80.0),
            condition: "overcast".to_owned(),
            wind_kph: Some(9.5),
            updated_at: "2024-05-01T13:00".to_owned(),
        })
    }
}

struct Server {
    endpoint: Endpoint,
    handle: ListenerHandle,
}

impl Server {
    fn client(&self) -> Client {
        Client::connect(&self.endpoint, Duration::from_secs(2)).expect("connect")
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.handle.shutdown();
    }
}

#[fixture]
fn server() -> Server {
    let dispatcher = Dispatcher::builder()
        .register(Echo)
        .and_then(|builder| builder.register(GetWeather::new(TwoCities)))
        .expect("register")
        .build();
    let handler = DispatchConnectionHandler::new(Arc::new(dispatcher), 64 * 1024);
    let listener = SocketListener::bind(&Endpoint::new("127.0.0.1", 0)).expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let handle = listener.start(Arc::new(handler)).expect("start");
    Server {
        endpoint: Endpoint::new("127.0.0.1", port),
        handle,
    }
}

#[rstest]
fn concurrent_callers_each_get_their_own_response(server: Server) {
    let client = server.client();
    thread::scope(|scope| {
        let workers: Vec<_> = (0..16)
            .map(|worker| {
                let client = &client;
                scope.spawn(move || {
                    for round in 0..8 {
                        let n = worker * 100 + round;
                        let result = client
                            .call("echo", Arguments::new().with("n", n))
                            .expect("echo");
                        assert_eq!(result, json!({ "n": n }));
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("worker");
        }
    });
    assert_eq!(client.pending_count(), 0);
}

#[rstest]
fn typed_wrappers_decode_results(server: Server) {
    let client = server.client();

    let tools = client.list_tools().expect("tools");
    let names: Vec<&str> = tools.iter().map(|tool| tool.name.as_str()).collect();
    assert_eq!(names, ["echo", "get_weather", "tools.list"]);
    let weather = tools
        .iter()
        .find(|tool| tool.name == "get_weather")
        .expect("get_weather listed");
    assert_eq!(weather.args.get("q").map(String::as_str), Some("string"));

    let report = client.get_weather("Lima").expect("report");
    assert_eq!(report.location, "Lima");
    assert_eq!(report.humidity, Some(80.0));

    let error = client.get_weather("  ").expect_err("blank city");
    let ClientError::Remote { message } = error else {
        panic!("expected a remote failure, got {error:?}");
    };
    assert!(message.contains("missing parameter q"));
    assert!(client.is_connected());
}

#[rstest]
fn pipelined_lookups_complete(server: Server) {
    let client = server.client();
    let quito = client.submit_weather("Quito").expect("submit quito");
    let lima = client.submit_weather("Lima").expect("submit lima");
    let nowhere = client.submit_weather("Atlantis").expect("submit atlantis");

    assert!(matches!(nowhere.into_result(), Err(ClientError::Remote { .. })));
    let lima: WeatherReport = lima.into_typed().expect("lima");
    let quito: WeatherReport = quito.into_typed().expect("quito");
    assert!((lima.temp_c - 18.5).abs() < 1e-9);
    assert!((quito.temp_c - 12.0).abs() < 1e-9);
}

#[rstest]
fn driver_prints_reports_in_argument_order(server: Server) {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let endpoint = server.endpoint.to_string();
    let code = cli::run(
        [
            "wxrpc",
            "--endpoint",
            endpoint.as_str(),
            "--log-filter",
            "off",
            "weather",
            "Quito",
            "Atlantis",
            "Lima",
        ],
        &mut stdout,
        &mut stderr,
    );
    assert_eq!(code, std::process::ExitCode::FAILURE);

    let stdout = String::from_utf8(stdout).expect("utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Quito: 12 °C"));
    assert!(lines[1].starts_with("Lima: 18.5 °C"));
    assert!(String::from_utf8_lossy(&stderr).contains("Atlantis"));
}

#[rstest]
fn driver_lists_tools(server: Server) {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let endpoint = server.endpoint.to_string();
    let code = cli::run(
        [
            "wxrpc",
            "tools",
            "--endpoint",
            endpoint.as_str(),
            "--log-filter",
            "off",
        ],
        &mut stdout,
        &mut stderr,
    );
    assert_eq!(code, std::process::ExitCode::SUCCESS);
    let stdout = String::from_utf8(stdout).expect("utf8");
    assert!(stdout.contains("get_weather(q: string)"));
}

#[test]
fn driver_reports_connection_failure() {
    let unused = std::net::TcpListener::bind(("127.0.0.1", 0)).expect("bind");
    let port = unused.local_addr().expect("addr").port();
    drop(unused);

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let endpoint = format!("tcp://127.0.0.1:{port}");
    let code = cli::run(
        [
            "wxrpc",
            "--endpoint",
            endpoint.as_str(),
            "--log-filter",
            "off",
            "tools",
        ],
        &mut stdout,
        &mut stderr,
    );
    assert_eq!(code, std::process::ExitCode::FAILURE);
    assert!(String::from_utf8_lossy(&stderr).contains("failed to connect"));
}

#[rstest]
#[case::json("json")]
#[case::compact("compact")]
fn binary_exits_with_default_logging(server: Server, #[case] log_format: &str) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_wxrpc"))
        .args(["--endpoint", &server.endpoint.to_string(), "tools"])
        .env_remove("WXRPC_LOG_FILTER")
        .env("WXRPC_LOG_FORMAT", log_format)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn wxrpc");

    let deadline = Instant::now() + Duration::from_secs(10);
    let status = loop {
        if let Some(status) = child.try_wait().expect("poll wxrpc") {
            break status;
        }
        if Instant::now() >= deadline {
            child.kill().expect("kill wxrpc");
            panic!("wxrpc did not exit after printing its output");
        }
        thread::sleep(Duration::from_millis(20));
    };

    let output = child.wait_with_output().expect("collect output");
    assert!(status.success(), "exit status {status}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("get_weather(q: string)"), "stdout: {stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("response reader stopped"), "stderr: {stderr}");
}
