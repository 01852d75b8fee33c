//! Live-preview HTTP server for the development workflow.
//!
//! Serves the development output directory with the reload client script
//! injected into every HTML response. Binding and the request loop are
//! split so the caller can start the watcher between the two.

mod mime;
mod path;
mod response;

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tiny_http::{Request, Server};

use crate::core;
use crate::log;

/// URL of the in-memory reload client script.
pub const RELOAD_JS_PATH: &str = "/__sitekit/reload.js";

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bound server ready to accept requests.
pub struct PreviewServer {
    server: Arc<Server>,
    ws_port: Option<u16>,
}

/// Bind the HTTP server without starting the request loop.
///
/// `ws_port` is the reload hub's port, or `None` when live reload is off.
pub fn bind(port: u16, ws_port: Option<u16>) -> Result<PreviewServer> {
    let (server, addr) = bind_with_retry(port)?;
    let server = Arc::new(server);
    core::register_server(Arc::clone(&server));

    log!("serve"; "http://{addr}");

    Ok(PreviewServer { server, ws_port })
}

impl PreviewServer {
    /// Run the request loop until shutdown unblocks the server (blocking).
    pub fn run(self, serve_root: PathBuf) -> Result<()> {
        // Thread pool keeps one slow request from stalling the rest
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(4)
            .build()
            .context("failed to create server thread pool")?;

        let serve_root = Arc::new(serve_root);
        for request in self.server.incoming_requests() {
            let serve_root = Arc::clone(&serve_root);
            let ws_port = self.ws_port;
            pool.spawn(move || {
                if let Err(e) = handle_request(request, &serve_root, ws_port) {
                    log!("serve"; "request error: {e}");
                }
            });
        }
        Ok(())
    }
}

/// Bind to localhost with automatic port retry.
fn bind_with_retry(base_port: u16) -> Result<(Server, SocketAddr)> {
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < MAX_PORT_RETRIES => continue,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "failed to bind after {} attempts (ports {}-{}): {}",
                    MAX_PORT_RETRIES,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

/// Handle a single HTTP request.
fn handle_request(request: Request, serve_root: &Path, ws_port: Option<u16>) -> Result<()> {
    if core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    // Reload client script is served from memory
    if let Some(port) = ws_port {
        let url_path = request.url().split('?').next().unwrap_or_default();
        if url_path == RELOAD_JS_PATH {
            return response::respond_reload_js(request, port);
        }
    }

    if let Some(file) = path::resolve_path(request.url(), serve_root) {
        return response::respond_file(request, &file, ws_port);
    }

    response::respond_not_found(request, serve_root, ws_port)
}
