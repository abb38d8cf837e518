//! HTTPS enforcement.
//!
//! Records the [`RequestScheme`] of every request and, when enforcing,
//! keeps plain-HTTP clients off the API: safe reads are redirected, anything
//! that may carry data is refused before the body is read.

use std::sync::Arc;

use axum::extract::Request;
use axum::extract::State;
use axum::http::header::{HOST, LOCATION};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::errors::HttpError;
use crate::http::request::RequestScheme;

pub const INSECURE_SUBMISSION: &str = "Please use HTTPS when submitting data to this server.";

#[derive(Debug, Clone, Copy, Default)]
pub struct TransportGuard {
    /// Redirect or reject requests that did not arrive over HTTPS.
    pub enforce: bool,
    /// Believe `X-Forwarded-Proto` from the fronting proxy.
    pub trust_proxy: bool,
    /// The socket itself terminates TLS.
    pub tls_local: bool,
}

impl TransportGuard {
    pub fn scheme(&self, headers: &HeaderMap) -> RequestScheme {
        if self.tls_local {
            return RequestScheme::Https;
        }
        let forwarded_https = self.trust_proxy
            && headers
                .get("x-forwarded-proto")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("https"));
        if forwarded_https {
            RequestScheme::Https
        } else {
            RequestScheme::Http
        }
    }
}

pub async fn guard_transport(
    State(guard): State<Arc<TransportGuard>>,
    mut request: Request,
    next: Next,
) -> Response {
    let scheme = guard.scheme(request.headers());
    request.extensions_mut().insert(scheme);

    if !guard.enforce || scheme.is_secure() {
        return next.run(request).await;
    }

    if request.method() != Method::GET {
        return HttpError::forbidden()
            .with_message(INSECURE_SUBMISSION)
            .into_response();
    }

    let Some(host) = request.headers().get(HOST).and_then(|v| v.to_str().ok()) else {
        return HttpError::bad_request()
            .with_message("Missing Host header")
            .into_response();
    };
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    match HeaderValue::from_str(&format!("https://{host}{target}")) {
        Ok(location) => (StatusCode::MOVED_PERMANENTLY, [(LOCATION, location)]).into_response(),
        Err(_) => HttpError::bad_request()
            .with_message("Invalid Host header")
            .into_response(),
    }
}
