//! Connection handling abstraction for the listener.

use std::net::TcpStream;

/// Handles accepted socket connections.
///
/// The listener calls [`ConnectionHandler::handle`] on a dedicated thread
/// per connection, so an implementation may block for as long as the peer
/// stays connected.
pub trait ConnectionHandler: Send + Sync + 'static {
    /// Handles a single connection. Implementations should avoid panicking.
    fn handle(&self, stream: TcpStream);
}
