//! Terminal error responder.
//!
//! # Responsibilities
//! - Render every fault as `{"message", "code", "errors"?}` JSON
//! - Copy headers carried by the fault onto the response
//! - Log unexpected faults and caught panics before answering with a 500
//! - Answer unmatched routes with `NotFoundError`
//!
//! # Design Decisions
//! - `IntoResponse` consumes the fault, so a fault is written at most once
//! - Unexpected faults never leak their message to the client

use std::any::Any;

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::errors::{Fault, HttpError};

/// Wire shape of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    code: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [Value]>,
}

fn render(err: &HttpError) -> Response {
    let body = ErrorBody {
        message: err.message(),
        code: err.code(),
        errors: err.errors(),
    };
    (err.status(), err.headers().clone(), Json(body)).into_response()
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        render(&self)
    }
}

impl IntoResponse for Fault {
    fn into_response(self) -> Response {
        match self {
            Fault::Http(err) => render(&err),
            Fault::Unexpected(err) => {
                tracing::error!(error = %err, "Unexpected error");
                render(&HttpError::internal_server_error())
            }
        }
    }
}

/// Catch-all for requests no route matched.
pub async fn not_found() -> HttpError {
    HttpError::not_found()
}

/// Response for a panic caught by the fault-isolation layer.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "Unhandled exception in request handler");

    HttpError::internal_server_error()
        .with_message("Unhandled exception")
        .into_response()
}
