//! Server lifecycle: bind, serve, graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::routes;

/// Errors produced by the log server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("port {0} is already in use, is another instance running?")]
    PortInUse(u16),

    #[error("permission denied on port {0}: ports below 1024 require elevated privileges")]
    PortPermission(u16),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The log ingestion server.
///
/// Holds the immutable [`ServerConfig`]; per-request work shares nothing
/// else, so connections are handled fully independently.
pub struct LogServer {
    config: ServerConfig,
    cancel: CancellationToken,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl LogServer {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            cancel: CancellationToken::new(),
            local_addr: Mutex::new(None),
        })
    }

    /// Returns the bound address.
    ///
    /// Only available after [`run`](Self::run) binds the socket.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().await
    }

    /// Returns the listening port (0 if not yet bound).
    pub async fn port(&self) -> u16 {
        self.local_addr.lock().await.map(|a| a.port()).unwrap_or(0)
    }

    /// Requests a graceful shutdown: stop accepting, drain in-flight
    /// requests, then return from [`run`](Self::run).
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Binds the configured address and serves until shutdown.
    ///
    /// Bind failures are classified so the operator message names the
    /// actual cause; all of them are fatal, never retried.
    pub async fn run(self: &Arc<Self>) -> Result<(), ServerError> {
        if self.config.remote_enabled {
            tracing::warn!("remote access enabled, make sure your firewall is properly configured");
        }

        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| classify_bind_error(e, addr.port()))?;
        let local_addr = listener.local_addr()?;
        *self.local_addr.lock().await = Some(local_addr);

        tracing::info!("log server running on http://{local_addr}");
        tracing::info!(
            max_body_bytes = self.config.max_body_bytes,
            "request body limit applied"
        );
        tracing::info!("press Ctrl+C to stop the server gracefully");

        let app = routes::router(self.config.max_body_bytes);
        let cancel = self.cancel.clone();
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

        tracing::info!("server closed");
        Ok(())
    }
}

fn classify_bind_error(e: std::io::Error, port: u16) -> ServerError {
    match e.kind() {
        std::io::ErrorKind::AddrInUse => ServerError::PortInUse(port),
        std::io::ErrorKind::PermissionDenied => ServerError::PortPermission(port),
        _ => ServerError::Io(e),
    }
}
