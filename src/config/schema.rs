//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL path prefix for caller routes (e.g. "/api"). Empty mounts at root.
    pub base_url_path: String,

    /// Bind host.
    pub host: String,

    /// Listening port. Ports 80/443 need elevated privileges.
    pub port: u16,

    /// Enable this when running behind a TLS-terminating reverse proxy.
    pub behind_proxy: bool,

    /// Wait for connections to close before stopping the server.
    pub graceful_shutdown: bool,

    /// Honour `X-HTTP-Method-Override` on POST requests.
    pub method_override: bool,

    /// Maximum incoming header count. 0 disables the limit.
    pub max_headers_count: usize,

    /// Milliseconds of inactivity before a request is timed out. 0 disables it.
    pub server_timeout_ms: u64,

    /// Response compression.
    pub compression: CompressionConfig,

    /// TLS listener settings.
    pub tls: TlsConfig,

    /// HTTP Strict Transport Security header settings.
    pub hsts: HstsConfig,

    /// Cross-origin policy. `None` disables CORS handling.
    pub cors: Option<CorsConfig>,

    /// Logging settings.
    pub logging: LoggingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url_path: String::new(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            behind_proxy: false,
            graceful_shutdown: false,
            method_override: false,
            max_headers_count: 1000,
            server_timeout_ms: 2 * 60 * 1000, // 2 minutes
            compression: CompressionConfig::default(),
            tls: TlsConfig::default(),
            hsts: HstsConfig::default(),
            cors: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl ServerConfig {
    /// `host:port` bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Inactivity timeout, `None` when disabled.
    pub fn server_timeout(&self) -> Option<Duration> {
        (self.server_timeout_ms > 0).then(|| Duration::from_millis(self.server_timeout_ms))
    }
}

/// Response compression settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Enable gzip/deflate compression of response bodies.
    pub enabled: bool,

    /// Minimum body size in bytes before a response is compressed.
    pub threshold: u16,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: 4000,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Serve HTTPS. Ignored for the socket when `behind_proxy` is set.
    pub enabled: bool,

    /// Path to private key file (PEM).
    pub key_file: Option<PathBuf>,

    /// Path to certificate file (PEM).
    pub cert_file: Option<PathBuf>,
}

/// HSTS header parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HstsConfig {
    /// `max-age` in seconds.
    pub max_age_secs: u64,

    pub include_subdomains: bool,

    pub preload: bool,
}

impl Default for HstsConfig {
    fn default() -> Self {
        Self {
            max_age_secs: 90 * 24 * 60 * 60, // ninety days
            include_subdomains: true,
            preload: true,
        }
    }
}

impl HstsConfig {
    /// Rendered `Strict-Transport-Security` header value.
    pub fn header_value(&self) -> String {
        let mut value = format!("max-age={}", self.max_age_secs);
        if self.include_subdomains {
            value.push_str("; includeSubDomains");
        }
        if self.preload {
            value.push_str("; preload");
        }
        value
    }
}

/// Cross-origin resource sharing policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. `"*"` allows any origin.
    pub allowed_origins: Vec<String>,

    /// Allowed methods. `"*"` allows any method.
    pub allowed_methods: Vec<String>,

    /// Allowed request headers. Empty mirrors the preflight request.
    pub allowed_headers: Vec<String>,

    /// Response headers exposed to the browser.
    pub exposed_headers: Vec<String>,

    /// Send `Access-Control-Allow-Credentials: true`.
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds. 0 omits the header.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: ["GET", "HEAD", "PUT", "PATCH", "POST", "DELETE"]
                .into_iter()
                .map(String::from)
                .collect(),
            allowed_headers: Vec::new(),
            exposed_headers: vec![
                crate::http::request::X_REQUEST_ID.to_string(),
                crate::http::request::X_CONVERSATION_ID.to_string(),
            ],
            allow_credentials: false,
            max_age_secs: 0,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging and request-tracking settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error).
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Header carrying the per-request correlation id.
    pub request_id_header: String,

    /// Header carrying the cross-request conversation id.
    pub conversation_id_header: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            request_id_header: crate::http::request::X_REQUEST_ID.to_string(),
            conversation_id_header: crate::http::request::X_CONVERSATION_ID.to_string(),
        }
    }
}
