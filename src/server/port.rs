// Port binder module
// Finds the first free port at or above the preferred one

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use tokio::net::TcpListener;

use super::listener::create_listener;
use crate::logger;

/// Bind `host` on `preferred`, moving upward while the port is taken.
///
/// At most `max_attempts` ports are tried. "Address in use" advances to the
/// next port; any other bind error is returned immediately. The listener is
/// returned still bound, so no other process can grab the port in between.
pub fn bind_available(host: &str, preferred: u16, max_attempts: u16) -> io::Result<TcpListener> {
    let mut port = preferred;
    for _ in 0..max_attempts.max(1) {
        let addr = resolve(host, port)?;
        match create_listener(addr) {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                logger::log_port_in_use(port);
                port = port.checked_add(1).ok_or_else(|| exhausted(host, preferred))?;
            }
            Err(e) => return Err(e),
        }
    }
    Err(exhausted(host, preferred))
}

fn resolve(host: &str, port: u16) -> io::Result<SocketAddr> {
    (host, port).to_socket_addrs()?.next().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("host {host} did not resolve to any address"),
        )
    })
}

fn exhausted(host: &str, preferred: u16) -> io::Error {
    io::Error::new(
        io::ErrorKind::AddrInUse,
        format!("no free port on {host} starting at {preferred}"),
    )
}
