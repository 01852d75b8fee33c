//! Process-wide shutdown coordination.
//!
//! Ctrl+C sets an atomic flag, unblocks the HTTP server so its request loop
//! can drain, and signals the watcher thread over a channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, OnceLock};

use crossbeam::channel::{Receiver, Sender, bounded};
use tiny_http::Server;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Broadcast channel used to wake the watcher thread on shutdown.
static SHUTDOWN_CHANNEL: LazyLock<(Sender<()>, Receiver<()>)> = LazyLock::new(|| bounded(1));

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

/// Receiver that fires once when shutdown is requested.
pub fn shutdown_signal() -> Receiver<()> {
    SHUTDOWN_CHANNEL.1.clone()
}

/// Register the HTTP server for graceful shutdown.
///
/// Call this after binding the server, before entering the request loop.
pub fn register_server(server: Arc<Server>) {
    let _ = SERVER.set(server);
}

/// Install the global Ctrl+C handler (before any blocking operations).
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);
        let _ = SHUTDOWN_CHANNEL.0.try_send(());

        // Unblock HTTP server, or exit immediately if not yet serving
        if let Some(server) = SERVER.get() {
            crate::log!("serve"; "shutting down...");
            server.unblock();
        } else {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}
