//! `X-HTTP-Method-Override` support for clients that can only POST.
//!
//! Must wrap the router itself: the method is rewritten before routing.

use axum::extract::Request;
use axum::http::{HeaderName, Method};
use axum::middleware::Next;
use axum::response::Response;

pub const X_HTTP_METHOD_OVERRIDE: HeaderName = HeaderName::from_static("x-http-method-override");

/// Replace the method of a POST request with the one named in the override header.
pub async fn method_override(mut request: Request, next: Next) -> Response {
    if request.method() == Method::POST {
        let overridden = request
            .headers()
            .get(&X_HTTP_METHOD_OVERRIDE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Method::from_bytes(v.trim().to_ascii_uppercase().as_bytes()).ok());

        if let Some(method) = overridden {
            tracing::debug!(method = %method, "Method overridden");
            *request.method_mut() = method;
        }
    }
    next.run(request).await
}
