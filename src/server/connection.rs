// Connection module
// Serves one accepted TCP connection on the local task set

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::error::Error;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Spawn a task serving HTTP/1.1 on `stream` until the peer hangs up.
///
/// Must be called from inside a `LocalSet`.
pub fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    logger::log_connection_accepted(&peer_addr);

    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder.keep_alive(true);

        let service = service_fn(move |req| {
            let state = Arc::clone(&state);
            async move { handler::handle_request(req, state, peer_addr).await }
        });

        if let Err(err) = builder.serve_connection(io, service).await {
            if is_disconnect(&err) {
                logger::log_connection_closed(&peer_addr, &err);
            } else {
                // Includes read failures while streaming a body
                logger::log_connection_error(&peer_addr, &err);
            }
        }
    });
}

/// Whether `err` only reports the peer hanging up
fn is_disconnect(err: &hyper::Error) -> bool {
    err.is_incomplete_message() || err.is_canceled() || caused_by_disconnect(err)
}

fn caused_by_disconnect(err: &(dyn Error + 'static)) -> bool {
    std::iter::successors(Some(err), |&e| e.source()).any(|e| {
        e.downcast_ref::<io::Error>().is_some_and(|io_err| {
            matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            )
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Wrapped(io::Error);

    impl std::fmt::Display for Wrapped {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "body stream failed")
        }
    }

    impl Error for Wrapped {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_peer_hangups_are_disconnects() {
        let reset = io::Error::from(io::ErrorKind::ConnectionReset);
        assert!(caused_by_disconnect(&reset));
        let pipe = Wrapped(io::Error::from(io::ErrorKind::BrokenPipe));
        assert!(caused_by_disconnect(&pipe));
    }

    #[test]
    fn test_read_faults_are_not_disconnects() {
        let denied = Wrapped(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(!caused_by_disconnect(&denied));
        let other = io::Error::other("disk read failed");
        assert!(!caused_by_disconnect(&other));
    }
}
