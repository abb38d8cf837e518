//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - TLS material is configured whenever the socket will be encrypted
//! - Header names and the base path are well formed
//! - CORS combinations the browser would reject are caught at startup
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::HeaderName;

use crate::config::schema::ServerConfig;

/// One semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let base = &config.base_url_path;
    if !base.is_empty() && !base.starts_with('/') {
        errors.push(ValidationError::new(
            "base_url_path",
            format!("must start with '/', got {base:?}"),
        ));
    }

    if config.tls.enabled && !config.behind_proxy {
        if config.tls.key_file.is_none() {
            errors.push(ValidationError::new("tls.key_file", "required when TLS is enabled"));
        }
        if config.tls.cert_file.is_none() {
            errors.push(ValidationError::new("tls.cert_file", "required when TLS is enabled"));
        }
    }

    for (field, value) in [
        ("logging.request_id_header", &config.logging.request_id_header),
        ("logging.conversation_id_header", &config.logging.conversation_id_header),
    ] {
        if HeaderName::try_from(value.as_str()).is_err() {
            errors.push(ValidationError::new(field, format!("invalid header name {value:?}")));
        }
    }

    if let Some(cors) = &config.cors {
        let wildcard = cors.allowed_origins.iter().any(|o| o == "*");
        if wildcard && cors.allow_credentials {
            errors.push(ValidationError::new(
                "cors.allow_credentials",
                "cannot be combined with allowed_origins = [\"*\"]",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
