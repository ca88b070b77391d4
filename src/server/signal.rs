// Signal handling module
//
// SIGTERM and SIGINT (Ctrl+C) both request a graceful stop: the accept loop
// exits and the process returns once the runtime winds down.

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Shared shutdown state
pub struct SignalHandler {
    /// Notified once when a stop signal arrives
    pub shutdown: Arc<Notify>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Wake the accept loop
    pub fn request_shutdown(&self, signal: &str) {
        logger::log_info(&format!("[Signal] {signal} received, shutting down"));
        // notify_one stores a permit, so a loop not yet waiting still sees it
        self.shutdown.notify_one();
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Start listening for stop signals in a background task (Unix)
#[cfg(unix)]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    logger::log_error(&format!("Failed to register signal handlers: {e}"));
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => handler.request_shutdown("SIGTERM"),
            _ = sigint.recv() => handler.request_shutdown("SIGINT"),
        }
    });
}

/// Fallback for platforms without Unix signals: only Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            handler.request_shutdown("Ctrl+C");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_shutdown_wakes_waiter() {
        let handler = SignalHandler::new();
        handler.request_shutdown("test");
        // The stored permit completes a wait that starts afterwards
        handler.shutdown.notified().await;
    }
}
