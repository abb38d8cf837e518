//! HTTP server bootstrap.
//!
//! # Responsibilities
//! - Assemble the application router from the configuration and the
//!   caller's route registration
//! - Bind the listening socket, plain or TLS
//! - Install signal handling when graceful shutdown is enabled
//! - Drive the shutdown sequence: stop accepting, drain, force after deadline

use std::future::Future;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use axum::Router;
use axum_server::Handle;

use crate::config::{ConfigError, ServerConfig};
use crate::http::app::build_app;
use crate::lifecycle::{spawn_signal_listener, ShutdownController, ShutdownOutcome, ShutdownReason};
use crate::net::{tls, TlsError, Transport};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] TlsError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
}

/// HTTP(S) server wrapping the application router.
pub struct ApiServer {
    router: Router,
    config: ServerConfig,
    shutdown: Arc<ShutdownController>,
}

impl ApiServer {
    /// Build the application. `register` adds the caller's routes and is
    /// called once, here.
    pub fn new<F>(config: ServerConfig, register: F) -> Result<Self, ServerError>
    where
        F: FnOnce(Router, &ServerConfig) -> Router,
    {
        let router = build_app(&config, register)?;
        Ok(Self {
            router,
            config,
            shutdown: Arc::new(ShutdownController::new()),
        })
    }

    /// Use an externally owned shutdown controller.
    pub fn with_shutdown(mut self, shutdown: Arc<ShutdownController>) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        self.shutdown.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind the configured address and serve until shut down.
    pub async fn run(self) -> Result<ShutdownOutcome, ServerError> {
        let addr = self.config.bind_address();
        let listener = TcpListener::bind(&addr).map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
        self.run_on(listener).await
    }

    /// Serve on an already bound listener until shut down.
    pub async fn run_on(self, listener: TcpListener) -> Result<ShutdownOutcome, ServerError> {
        let local_addr = listener
            .set_nonblocking(true)
            .and_then(|()| listener.local_addr())
            .map_err(|source| ServerError::Bind {
                addr: self.config.bind_address(),
                source,
            })?;

        let transport = Transport::select(&self.config);
        let tls_config = match transport {
            Transport::Tls => Some(tls::from_config(&self.config.tls).await?),
            Transport::Plain => None,
        };

        if self.shutdown.is_triggered() {
            tracing::info!("Shutdown requested before start, not serving");
            return Ok(self.shutdown.terminate(true));
        }

        let signals = self
            .config
            .graceful_shutdown
            .then(|| spawn_signal_listener(self.shutdown.clone()));

        let handle = Handle::new();
        tokio::spawn(announce(handle.clone(), transport, local_addr));

        let header_cap = parser_header_cap(self.config.max_headers_count);
        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let outcome = match tls_config {
            Some(tls_config) => {
                let mut server =
                    axum_server::from_tcp_rustls(listener, tls_config).handle(handle.clone());
                server.http_builder().http1().max_headers(header_cap);
                drive(server.serve(app), handle, &self.shutdown).await
            }
            None => {
                let mut server = axum_server::from_tcp(listener).handle(handle.clone());
                server.http_builder().http1().max_headers(header_cap);
                drive(server.serve(app), handle, &self.shutdown).await
            }
        };

        if let Some(signals) = signals {
            signals.abort();
        }

        tracing::info!(
            reason = ?outcome.reason,
            drained = outcome.drained,
            exit_code = outcome.exit_code(),
            "HTTP server stopped"
        );
        Ok(outcome)
    }
}

/// Parser cap used when the header count is unlimited.
const UNLIMITED_HEADER_CAP: usize = 8192;

/// Header count at which hyper itself refuses a request with a bare 431.
///
/// Kept well above the configured limit so the limits middleware answers
/// first with a JSON 431. Never below hyper's default of 100.
fn parser_header_cap(max_headers: usize) -> usize {
    if max_headers == 0 {
        UNLIMITED_HEADER_CAP
    } else {
        max_headers.saturating_mul(2).max(100)
    }
}

async fn announce(handle: Handle, transport: Transport, fallback: SocketAddr) {
    let addr = handle.listening().await.unwrap_or(fallback);
    tracing::info!(
        "api server listening at {}://{}:{}",
        transport.scheme(),
        addr.ip(),
        addr.port()
    );
}

/// Run `serving` until it stops on its own or `controller` is triggered,
/// then drain within the controller's deadline.
async fn drive<F>(serving: F, handle: Handle, controller: &ShutdownController) -> ShutdownOutcome
where
    F: Future<Output = io::Result<()>>,
{
    tokio::pin!(serving);

    let reason = tokio::select! {
        result = &mut serving => {
            let reason = match result {
                Ok(()) => ShutdownReason::Requested,
                Err(e) => {
                    tracing::error!(error = %e, "Server failed");
                    ShutdownReason::Fatal(e.to_string())
                }
            };
            controller.trigger(reason);
            // Nothing left to drain: the accept loop is gone.
            return controller.terminate(true);
        }
        reason = controller.triggered() => reason,
    };

    tracing::info!(
        reason = ?reason,
        connections = handle.connection_count(),
        timeout_ms = controller.drain_timeout().as_millis() as u64,
        "Draining connections"
    );
    handle.graceful_shutdown(None);

    match tokio::time::timeout(controller.drain_timeout(), &mut serving).await {
        Ok(result) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Server error while draining");
            }
            controller.terminate(true)
        }
        Err(_) => {
            tracing::warn!(
                connections = handle.connection_count(),
                "Could not close connections in time, forcefully shutting down"
            );
            handle.shutdown();
            controller.terminate(false)
        }
    }
}
