//! TCP connection setup for the client.

use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use wxrpc_config::Endpoint;

use crate::error::ClientError;

/// Resolves `endpoint` and connects to the first address it yields.
pub(crate) fn connect(endpoint: &Endpoint, timeout: Duration) -> Result<TcpStream, ClientError> {
    let address = resolve_tcp_address(endpoint.host(), endpoint.port())
        .map_err(|source| ClientError::resolve(endpoint, source))?;
    let stream = TcpStream::connect_timeout(&address, timeout)
        .map_err(|source| ClientError::connect(endpoint, source))?;
    stream
        .set_nodelay(true)
        .map_err(|source| ClientError::Setup { source })?;
    Ok(stream)
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    let mut addrs = (host, port).to_socket_addrs()?;
    addrs
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}
