//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! std TcpListener (bound by the server)
//!     → Transport::select (plain, or TLS when terminated locally)
//!     → tls.rs (PEM key/cert loading)
//!     → axum-server accept loop
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - TLS is only terminated here when no reverse proxy does it for us
//! - Unreadable TLS material is fatal, never a silent plain-HTTP fallback

pub mod tls;

pub use tls::{load_tls_config, TlsError};

use crate::config::ServerConfig;

/// How the listening socket talks to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Plain,
    Tls,
}

impl Transport {
    /// TLS only when enabled and not delegated to a fronting proxy.
    pub fn select(config: &ServerConfig) -> Self {
        if config.tls.enabled && !config.behind_proxy {
            Transport::Tls
        } else {
            Transport::Plain
        }
    }

    pub fn scheme(self) -> &'static str {
        match self {
            Transport::Plain => "http",
            Transport::Tls => "https",
        }
    }
}
