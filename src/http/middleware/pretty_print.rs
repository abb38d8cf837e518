//! `?pretty=true` JSON indentation.

use std::collections::HashMap;

use axum::body::{to_bytes, Body};
use axum::extract::{Query, Request};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::errors::HttpError;

/// `true` when the query string asks for indented JSON.
fn wants_pretty(request: &Request) -> bool {
    Query::<HashMap<String, String>>::try_from_uri(request.uri())
        .map(|Query(params)| matches!(params.get("pretty").map(String::as_str), Some("true" | "1")))
        .unwrap_or(false)
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// Re-indent JSON response bodies with two spaces when requested.
pub async fn pretty_print(request: Request, next: Next) -> Response {
    let pretty = wants_pretty(&request);
    let response = next.run(request).await;
    if !pretty || !is_json(&response) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "Failed to buffer response for pretty printing");
            return HttpError::internal_server_error().into_response();
        }
    };

    let body = match serde_json::from_slice::<serde_json::Value>(&bytes)
        .and_then(|value| serde_json::to_vec_pretty(&value))
    {
        Ok(indented) => {
            parts.headers.remove(CONTENT_LENGTH);
            Body::from(indented)
        }
        Err(_) => Body::from(bytes),
    };
    Response::from_parts(parts, body)
}
