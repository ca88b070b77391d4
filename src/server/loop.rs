// Server loop module
// Accepts connections until shutdown is requested

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::handle_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections on `listener` and hand each one to its own task.
///
/// Returns once `shutdown` is notified. Connections already being served
/// keep running on the task set.
pub async fn start_server_loop(listener: TcpListener, state: Arc<AppState>, shutdown: Arc<Notify>) {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer_addr)) => {
                        handle_connection(stream, peer_addr, Arc::clone(&state));
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            () = shutdown.notified() => {
                logger::log_shutdown();
                break;
            }
        }
    }
}
