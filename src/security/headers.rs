//! Security response headers.
//!
//! # Responsibilities
//! - Strip headers that fingerprint the server (`X-Powered-By`, `Server`)
//! - Add the fixed set of protective headers to every response
//!
//! # Design Decisions
//! - The header set is built once at startup and shared behind an `Arc`
//! - Headers are applied after the inner chain runs, so error responses
//!   and 404s carry them too

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{SERVER, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

pub const X_POWERED_BY: HeaderName = HeaderName::from_static("x-powered-by");
pub const X_DOWNLOAD_OPTIONS: HeaderName = HeaderName::from_static("x-download-options");

/// Build the protective header set applied to every response.
#[must_use]
pub fn build_security_headers() -> Arc<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    // Legacy, still honoured by older browsers
    headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
    // IE: never open downloads in the site's context
    headers.insert(X_DOWNLOAD_OPTIONS, HeaderValue::from_static("noopen"));
    Arc::new(headers)
}

/// Remove fingerprinting headers and extend the response with `headers`.
pub async fn security_headers(
    State(headers): State<Arc<HeaderMap>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let response_headers = response.headers_mut();
    response_headers.remove(X_POWERED_BY);
    response_headers.remove(SERVER);
    for (k, v) in headers.iter() {
        response_headers.insert(k.clone(), v.clone());
    }
    response
}
