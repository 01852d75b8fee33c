//! Live-reload hub: a small WebSocket broadcast server.
//!
//! The preview server injects a client script into served HTML; the script
//! connects here and reloads the page whenever [`ReloadHub::reload`] fires.
//! The hub is an explicit handle, created by the dev workflow and passed to
//! whoever needs to signal - there is no global.

mod message;

pub use message::ReloadMessage;

use std::io;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tungstenite::{Message, WebSocket};

use crate::core;
use crate::{debug, log};

/// Default WebSocket port (the LiveReload convention).
pub const DEFAULT_WS_PORT: u16 = 35729;

/// How many consecutive ports to try when the default is taken.
const MAX_PORT_RETRIES: u16 = 10;

/// Poll interval for the non-blocking accept loop.
const ACCEPT_POLL_MS: u64 = 100;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// Handle to the reload broadcast server.
///
/// Cheap to clone; all clones share the same client list.
#[derive(Clone)]
pub struct ReloadHub {
    clients: Clients,
    port: u16,
}

impl ReloadHub {
    /// Bind a listener and start the accept thread.
    pub fn start(base_port: u16) -> Result<Self> {
        let (listener, port) = bind_port(base_port)?;
        listener
            .set_nonblocking(true)
            .context("failed to make reload listener non-blocking")?;

        let clients: Clients = Arc::new(Mutex::new(Vec::new()));
        let hub = Self {
            clients: Arc::clone(&clients),
            port,
        };

        thread::Builder::new()
            .name("reload-accept".into())
            .spawn(move || accept_loop(listener, clients))
            .context("failed to spawn reload accept thread")?;

        debug!("reload"; "websocket hub listening on port {port}");
        Ok(hub)
    }

    /// Port the hub actually bound (may differ from the requested one).
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Number of currently connected pages.
    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Broadcast a reload request to every connected page.
    ///
    /// Dead connections are dropped from the client list as a side effect.
    pub fn reload(&self, reason: &str) {
        let payload = ReloadMessage::reload(reason).to_json();
        let mut clients = self.clients.lock();
        let before = clients.len();
        clients.retain_mut(|socket| socket.send(Message::Text(payload.clone().into())).is_ok());
        debug!("reload"; "'{reason}' sent to {} client(s) ({} dropped)", clients.len(), before - clients.len());
    }
}

/// Bind the first free port in `base_port..base_port + MAX_PORT_RETRIES`.
fn bind_port(base_port: u16) -> Result<(TcpListener, u16)> {
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(("127.0.0.1", port)) {
            Ok(listener) => {
                if offset > 0 {
                    log!("reload"; "port {base_port} busy, using {port}");
                }
                return Ok((listener, port));
            }
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => continue,
            Err(e) => return Err(e).context("failed to bind reload listener"),
        }
    }
    anyhow::bail!(
        "no free reload port in {base_port}..{}",
        base_port.saturating_add(MAX_PORT_RETRIES)
    )
}

fn accept_loop(listener: TcpListener, clients: Clients) {
    while !core::is_shutdown() {
        match listener.accept() {
            Ok((stream, _addr)) => {
                // Handshake on a blocking stream; the send path copes with
                // slow clients by dropping them on error
                if stream.set_nonblocking(false).is_err() {
                    continue;
                }
                match tungstenite::accept(stream) {
                    Ok(mut socket) => {
                        let hello = ReloadMessage::connected().to_json();
                        if socket.send(Message::Text(hello.into())).is_ok() {
                            clients.lock().push(socket);
                        }
                    }
                    Err(e) => debug!("reload"; "handshake failed: {e}"),
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(ACCEPT_POLL_MS));
            }
            Err(e) => {
                debug!("reload"; "accept failed: {e}");
                break;
            }
        }
    }
}
