//! TLS configuration and certificate loading.

use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsConfig;

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("{what} path not configured")]
    NotConfigured { what: &'static str },

    #[error("{what} file not found: {path:?}")]
    NotFound { what: &'static str, path: PathBuf },

    #[error("failed to load TLS material: {0}")]
    Load(#[from] std::io::Error),
}

/// Load TLS configuration from certificate and key files.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, TlsError> {
    for (what, path) in [("certificate", cert_path), ("private key", key_path)] {
        if !path.exists() {
            return Err(TlsError::NotFound {
                what,
                path: path.to_path_buf(),
            });
        }
    }

    Ok(RustlsConfig::from_pem_file(cert_path, key_path).await?)
}

/// Load the PEM pair named by the TLS section.
pub async fn from_config(config: &TlsConfig) -> Result<RustlsConfig, TlsError> {
    let cert = config
        .cert_file
        .as_deref()
        .ok_or(TlsError::NotConfigured { what: "certificate" })?;
    let key = config
        .key_file
        .as_deref()
        .ok_or(TlsError::NotConfigured { what: "private key" })?;
    load_tls_config(cert, key).await
}
