//! Command-line and environment overrides.
//!
//! Every flag has an `API_*` environment counterpart. Only values that were
//! actually supplied replace the file/default value.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::Parser;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::{CorsConfig, LogFormat, ServerConfig};
use crate::config::validation::validate_config;

/// Server options from the command line or environment.
#[derive(Debug, Default, Parser)]
#[command(name = "api-server")]
#[command(about = "JSON API server with a fixed middleware chain", long_about = None)]
pub struct ServerArgs {
    /// TOML config file, applied before the overrides below.
    #[arg(short, long, env = "API_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL path prefix, i.e. "/api".
    #[arg(long, env = "API_BASE_URL")]
    pub base_url: Option<String>,

    #[arg(long, env = "API_HOST")]
    pub host: Option<String>,

    #[arg(short, long, env = "API_PORT")]
    pub port: Option<u16>,

    /// Platform-provided port, used when API_PORT is unset.
    #[arg(long, env = "PORT", hide = true)]
    pub platform_port: Option<u16>,

    #[arg(long, env = "API_COMPRESSION", value_parser = BoolishValueParser::new())]
    pub compression: Option<bool>,

    #[arg(long, env = "API_COMPRESSION_THRESHOLD")]
    pub compression_threshold: Option<u16>,

    #[arg(long, env = "API_GRACEFUL_SHUTDOWN", value_parser = BoolishValueParser::new())]
    pub graceful_shutdown: Option<bool>,

    /// Running behind a TLS-terminating reverse proxy.
    #[arg(long, env = "API_REV_PROXY", value_parser = BoolishValueParser::new())]
    pub behind_proxy: Option<bool>,

    #[arg(long, env = "API_SSL", value_parser = BoolishValueParser::new())]
    pub ssl: Option<bool>,

    #[arg(long, env = "API_SSL_KEY")]
    pub ssl_key: Option<PathBuf>,

    #[arg(long, env = "API_SSL_CERT")]
    pub ssl_cert: Option<PathBuf>,

    #[arg(long, env = "API_METHOD_OVERRIDE", value_parser = BoolishValueParser::new())]
    pub method_override: Option<bool>,

    /// Enable CORS with the default permissive policy.
    #[arg(long, env = "API_CORS", value_parser = BoolishValueParser::new())]
    pub cors: Option<bool>,

    #[arg(long, env = "API_MAX_HEADERS")]
    pub max_headers: Option<usize>,

    #[arg(long, env = "API_SERVER_TIMEOUT_MS")]
    pub server_timeout_ms: Option<u64>,

    #[arg(long, env = "API_LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,
}

impl ServerArgs {
    /// Apply the supplied overrides on top of `config`.
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(base) = &self.base_url {
            config.base_url_path = base.clone();
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port.or(self.platform_port) {
            config.port = port;
        }
        if let Some(enabled) = self.compression {
            config.compression.enabled = enabled;
        }
        if let Some(threshold) = self.compression_threshold {
            config.compression.threshold = threshold;
        }
        if let Some(enabled) = self.graceful_shutdown {
            config.graceful_shutdown = enabled;
        }
        if let Some(enabled) = self.behind_proxy {
            config.behind_proxy = enabled;
        }
        if let Some(enabled) = self.ssl {
            config.tls.enabled = enabled;
        }
        if let Some(key) = &self.ssl_key {
            config.tls.key_file = Some(key.clone());
        }
        if let Some(cert) = &self.ssl_cert {
            config.tls.cert_file = Some(cert.clone());
        }
        if let Some(enabled) = self.method_override {
            config.method_override = enabled;
        }
        match self.cors {
            Some(true) if config.cors.is_none() => config.cors = Some(CorsConfig::default()),
            Some(false) => config.cors = None,
            _ => {}
        }
        if let Some(max) = self.max_headers {
            config.max_headers_count = max;
        }
        if let Some(timeout) = self.server_timeout_ms {
            config.server_timeout_ms = timeout;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }

    /// Defaults, then the config file (if any), then the overrides; validated.
    pub fn resolve(&self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ServerConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> ServerArgs {
        let mut full = vec!["api-server"];
        full.extend_from_slice(argv);
        ServerArgs::try_parse_from(full).unwrap()
    }

    #[test]
    fn explicit_values_win() {
        let mut config = ServerConfig::default();
        args(&[
            "--port", "4443",
            "--base-url", "/api",
            "--compression", "1",
            "--ssl", "true",
            "--ssl-key", "k.pem",
            "--ssl-cert", "c.pem",
        ])
        .apply(&mut config);

        assert_eq!(config.port, 4443);
        assert_eq!(config.base_url_path, "/api");
        assert!(config.compression.enabled);
        assert!(config.tls.enabled);
        assert_eq!(config.tls.key_file, Some(PathBuf::from("k.pem")));
    }

    #[test]
    fn falsey_values_disable() {
        let mut config = ServerConfig::default();
        config.compression.enabled = true;
        args(&["--compression", "0", "--port", "1"]).apply(&mut config);
        assert!(!config.compression.enabled);
    }

    #[test]
    fn cors_flag_toggles_default_policy() {
        let mut config = ServerConfig::default();
        args(&["--cors", "yes", "--port", "1"]).apply(&mut config);
        assert_eq!(config.cors.as_ref().unwrap().allowed_origins, vec!["*"]);

        args(&["--cors", "off", "--port", "1"]).apply(&mut config);
        assert!(config.cors.is_none());
    }

    #[test]
    fn api_port_beats_platform_port() {
        let overrides = ServerArgs {
            port: Some(9000),
            platform_port: Some(5000),
            ..ServerArgs::default()
        };
        let mut config = ServerConfig::default();
        overrides.apply(&mut config);
        assert_eq!(config.port, 9000);

        let overrides = ServerArgs {
            platform_port: Some(5000),
            ..ServerArgs::default()
        };
        overrides.apply(&mut config);
        assert_eq!(config.port, 5000);
    }

    #[test]
    fn resolve_validates() {
        let overrides = ServerArgs {
            ssl: Some(true),
            port: Some(1),
            ..ServerArgs::default()
        };
        assert!(matches!(overrides.resolve(), Err(ConfigError::Validation(_))));
    }
}
