//! Test helpers for the transport module.

use std::io::Write;
use std::net::TcpStream;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::ConnectionHandler;

pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
        });
        (count, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, _stream: TcpStream) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Replies `hello\n` and then panics, leaving the listener to carry on.
pub(crate) struct PanickingHandler;

impl ConnectionHandler for PanickingHandler {
    fn handle(&self, mut stream: TcpStream) {
        stream.write_all(b"hello\n").expect("write greeting");
        panic!("handler failure");
    }
}
