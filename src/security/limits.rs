//! Request limits.
//!
//! # Responsibilities
//! - Enforce maximum header count
//! - Enforce the per-request timeout
//!
//! # Design Decisions
//! - Header count is checked before the request reaches any handler
//! - Zero disables either limit
//! - Return 431 Request Header Fields Too Large or 408 Request Timeout

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::config::ServerConfig;
use crate::errors::HttpError;

/// Limits applied to every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLimits {
    /// Maximum number of request headers. 0 means unlimited.
    pub max_headers: usize,
    /// Time allowed for the inner chain to produce a response.
    pub timeout: Option<Duration>,
}

impl RequestLimits {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            max_headers: config.max_headers_count,
            timeout: config.server_timeout(),
        }
    }

    /// `true` when the middleware has nothing to enforce.
    pub fn is_unbounded(&self) -> bool {
        self.max_headers == 0 && self.timeout.is_none()
    }
}

pub async fn enforce_limits(
    State(limits): State<Arc<RequestLimits>>,
    request: Request,
    next: Next,
) -> Response {
    let count = request.headers().len();
    if limits.max_headers > 0 && count > limits.max_headers {
        tracing::warn!(count, max = limits.max_headers, "Too many request headers");
        return HttpError::request_header_fields_too_large().into_response();
    }

    match limits.timeout {
        Some(timeout) => match tokio::time::timeout(timeout, next.run(request)).await {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!(timeout_ms = timeout.as_millis() as u64, "Request timed out");
                HttpError::request_timeout().into_response()
            }
        },
        None => next.run(request).await,
    }
}
