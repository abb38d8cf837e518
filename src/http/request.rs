//! Request-scoped data attached by the middleware chain.
//!
//! # Responsibilities
//! - Correlation header names (`x-request-id`, `x-conversation-id`)
//! - `RequestContext` stored in request extensions by the request logger
//! - `RequestScheme` stored by the transport guard
//! - `FullBaseUrl` extractor for building absolute `Location` headers
//!
//! # Design Decisions
//! - Ids are opaque strings: an incoming id is echoed unchanged, a missing one
//!   is replaced by a time-ordered UUID v7

use std::time::{Duration, Instant};

use axum::extract::{FromRequestParts, NestedPath};
use axum::http::header::HOST;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::errors::HttpError;

/// Default correlation header for a single request.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Default correlation header spanning several requests of one conversation.
pub const X_CONVERSATION_ID: &str = "x-conversation-id";

/// Generate a fresh, time-ordered tracking id.
pub fn generate_tracking_id() -> String {
    Uuid::now_v7().to_string()
}

/// Tracking data for one in-flight request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub conversation_id: String,
    pub started_at: Instant,
}

impl RequestContext {
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| HttpError::internal_server_error().with_message("request context missing"))
    }
}

/// Scheme the client used to reach us, after proxy trust is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestScheme {
    #[default]
    Http,
    Https,
}

impl RequestScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestScheme::Http => "http",
            RequestScheme::Https => "https",
        }
    }

    pub fn is_secure(self) -> bool {
        self == RequestScheme::Https
    }
}

/// Response extension that suppresses the access-log line for one response.
#[derive(Debug, Clone, Copy)]
pub struct SkipRequestLog;

/// `scheme://host/base-path` of the router serving the request.
///
/// Inside a router mounted under `/api`, `GET /api/todos` yields
/// `http://localhost:8000/api`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullBaseUrl(pub String);

impl<S> FromRequestParts<S> for FullBaseUrl
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let scheme = parts
            .extensions
            .get::<RequestScheme>()
            .copied()
            .unwrap_or_default();

        let host = parts
            .headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .or_else(|| parts.uri.authority().map(|a| a.to_string()))
            .ok_or_else(|| HttpError::bad_request().with_message("Missing Host header"))?;

        let base = NestedPath::from_request_parts(parts, state)
            .await
            .map(|nested| nested.as_str().trim_end_matches('/').to_owned())
            .unwrap_or_default();

        Ok(FullBaseUrl(format!("{}://{}{}", scheme.as_str(), host, base)))
    }
}
