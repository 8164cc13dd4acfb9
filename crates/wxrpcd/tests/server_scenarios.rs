//! End-to-end scenarios against a running listener.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use rstest::{fixture, rstest};
use serde_json::{Value, json};

use wxrpc_config::Endpoint;
use wxrpcd::weather::{CurrentWeather, Location, ProviderError, WeatherProvider};
use wxrpcd::{DispatchConnectionHandler, Dispatcher, GetWeather, ListenerHandle, SocketListener};

const LIMIT: usize = 4 * 1024;

/// Provider with one known city.
struct FixedProvider;

impl WeatherProvider for FixedProvider {
    fn geocode(&self, query: &str) -> Result<Location, ProviderError> {
        if query != "Lima" {
            return Err(ProviderError::NotFound {
                query: query.to_owned(),
            });
        }
        Ok(Location {
            name: "Lima".to_owned(),
            latitude: -12.04,
            longitude: -77.03,
        })
    }

    fn current_weather(&self, _location: &Location) -> Result<CurrentWeather, ProviderError> {
        Ok(CurrentWeather {
            temp_c: 19.0,
            humidity: None,
            condition: "overcast".to_owned(),
            wind_kph: Some(11.0),
            updated_at: "2024-05-01T13:00".to_owned(),
        })
    }
}

struct Server {
    addr: SocketAddr,
    handle: ListenerHandle,
}

impl Server {
    fn connect(&self) -> Peer {
        let stream = TcpStream::connect(self.addr).expect("connect");
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("read timeout");
        let reader = BufReader::new(stream.try_clone().expect("clone"));
        Peer { stream, reader }
    }

    fn stop(self) {
        self.handle.shutdown();
        self.handle.join().expect("join listener");
    }
}

struct Peer {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl Peer {
    fn call(&mut self, line: &str) -> Value {
        self.stream.write_all(line.as_bytes()).expect("write");
        let mut response = String::new();
        self.reader.read_line(&mut response).expect("read");
        serde_json::from_str(&response).expect("json response")
    }
}

#[fixture]
fn server() -> Server {
    let dispatcher = Dispatcher::builder()
        .register(GetWeather::new(FixedProvider))
        .expect("register")
        .build();
    let handler = DispatchConnectionHandler::new(Arc::new(dispatcher), LIMIT);
    let listener = SocketListener::bind(&Endpoint::new("127.0.0.1", 0)).expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = listener.start(Arc::new(handler)).expect("start");
    Server { addr, handle }
}

#[rstest]
fn tools_list_names_get_weather(server: Server) {
    let mut peer = server.connect();
    let response = peer.call("{\"id\":\"1\",\"tool\":\"tools.list\",\"args\":{}}\n");
    assert_eq!(response["id"], "1");
    assert_eq!(response["ok"], true);
    let tools = response["result"]["tools"].as_array().expect("tools");
    assert!(tools.iter().any(|tool| tool["name"] == "get_weather"));
    server.stop();
}

#[rstest]
fn empty_location_is_rejected(server: Server) {
    let mut peer = server.connect();
    let response = peer.call("{\"id\":\"2\",\"tool\":\"get_weather\",\"args\":{\"q\":\"\"}}\n");
    assert_eq!(response["id"], "2");
    assert_eq!(response["ok"], false);
    assert!(response["error"].as_str().is_some_and(|error| !error.is_empty()));
    assert!(response.get("result").is_none());
    server.stop();
}

#[rstest]
fn weather_lookup_round_trips(server: Server) {
    let mut peer = server.connect();
    let found = peer.call("{\"id\":\"3\",\"tool\":\"get_weather\",\"args\":{\"q\":\"Lima\"}}\n");
    assert_eq!(
        found,
        json!({
            "id": "3",
            "ok": true,
            "result": {
                "location": "Lima",
                "temp_c": 19.0,
                "humidity": null,
                "condition": "overcast",
                "wind_kph": 11.0,
                "updated_at": "2024-05-01T13:00"
            }
        })
    );

    let missing =
        peer.call("{\"id\":\"4\",\"tool\":\"get_weather\",\"args\":{\"q\":\"Atlantis\"}}\n");
    assert_eq!(
        missing["error"],
        "upstream unavailable: city not found or no data available (Atlantis)"
    );
    server.stop();
}

#[rstest]
fn dead_connection_does_not_disturb_sibling(server: Server) {
    let mut sibling = server.connect();
    assert_eq!(
        sibling.call("{\"id\":\"1\",\"tool\":\"tools.list\"}\n")["ok"],
        true
    );

    {
        let mut doomed = TcpStream::connect(server.addr).expect("connect doomed");
        doomed
            .write_all(b"{\"id\":\"9\",\"tool\":\"tools.li")
            .expect("write partial line");
        doomed
            .shutdown(std::net::Shutdown::Both)
            .expect("shutdown doomed");
    }

    let response = sibling.call("{\"id\":\"2\",\"tool\":\"tools.list\"}\n");
    assert_eq!(response["id"], "2");
    assert_eq!(response["ok"], true);

    let mut newcomer = server.connect();
    assert_eq!(
        newcomer.call("{\"id\":\"1\",\"tool\":\"tools.list\"}\n")["id"],
        "1"
    );
    server.stop();
}

#[rstest]
fn connections_are_served_concurrently(server: Server) {
    let mut first = server.connect();
    let mut second = server.connect();
    for round in 1..=5 {
        let line = format!("{{\"id\":\"{round}\",\"tool\":\"tools.list\"}}\n");
        assert_eq!(second.call(&line)["id"], round.to_string());
        assert_eq!(first.call(&line)["id"], round.to_string());
    }
    server.stop();
}
