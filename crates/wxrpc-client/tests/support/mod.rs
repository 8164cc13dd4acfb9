//! Scripted TCP peer used to drive the client from the server side.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::Value;

use wxrpc_client::Client;
use wxrpc_config::Endpoint;

/// Server half of one scripted connection.
pub struct ScriptedPeer {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl ScriptedPeer {
    /// Reads one request line and returns it parsed.
    pub fn read_request(&mut self) -> Value {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).expect("read request");
        assert!(read > 0, "client closed before sending a request");
        serde_json::from_str(&line).expect("request is JSON")
    }

    /// Reads until the client closes its side.
    pub fn wait_for_close(&mut self) {
        let mut line = String::new();
        while self.reader.read_line(&mut line).unwrap_or(0) > 0 {
            line.clear();
        }
    }

    /// Writes a raw line, terminator included.
    pub fn send_raw(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).expect("write line");
        self.writer.flush().expect("flush");
    }

    /// Writes a response envelope.
    pub fn send(&mut self, response: &Value) {
        self.send_raw(&format!("{response}\n"));
    }
}

/// Accepts a single connection and runs `script` against it.
pub fn scripted_server<F>(script: F) -> (SocketAddr, JoinHandle<()>)
where
    F: FnOnce(ScriptedPeer) + Send + 'static,
{
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let reader = BufReader::new(stream.try_clone().expect("clone"));
        script(ScriptedPeer {
            reader,
            writer: stream,
        });
    });
    (addr, handle)
}

/// Connects a client to `addr`.
pub fn connect(addr: SocketAddr) -> Client {
    Client::connect(
        &Endpoint::new("127.0.0.1", addr.port()),
        Duration::from_secs(2),
    )
    .expect("connect client")
}
