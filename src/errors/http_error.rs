//! The HTTP error record shared by every variant.

use axum::extract::rejection::JsonRejection;
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde_json::Value;

use crate::errors::ErrorKind;

/// Realm used by [`HttpError::auth_bearer`] when none is given.
pub const DEFAULT_REALM: &str = "Secure Area";

/// An error that maps onto one JSON error response.
///
/// Built once by route code, consumed once by the error responder. Every
/// variant shares this shape; a missing `kind` is the base error with status
/// 500.
///
/// ```rust
/// use api_server::errors::HttpError;
///
/// let err = HttpError::unprocessable_entity()
///     .with_message("Invalid todo resource body")
///     .with_field_error("title", "is required");
/// assert_eq!(err.status().as_u16(), 422);
/// ```
#[derive(Debug, Clone)]
pub struct HttpError {
    kind: Option<ErrorKind>,
    message: String,
    code: Option<i64>,
    errors: Option<Vec<Value>>,
    headers: HeaderMap,
}

impl HttpError {
    /// Base error with an explicit message and no variant (status 500).
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: None,
            message: message.into(),
            code: None,
            errors: None,
            headers: HeaderMap::new(),
        }
    }

    /// Variant error with the reason phrase as message.
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::new(kind.reason())
        }
    }

    /// Factory keyed by status code. `None` when the code has no variant.
    pub fn from_status(code: u16) -> Option<Self> {
        ErrorKind::from_status(code).map(Self::from_kind)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Application-specific code reported in the body instead of the status.
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_errors(mut self, errors: Vec<Value>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Append one `{"field", "message"}` entry to the sub-error list.
    pub fn with_field_error(mut self, field: &str, message: &str) -> Self {
        self.errors
            .get_or_insert_with(Vec::new)
            .push(serde_json::json!({ "field": field, "message": message }));
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Attach a `WWW-Authenticate` bearer challenge (RFC 6750 §3).
    pub fn auth_bearer(
        self,
        realm: Option<&str>,
        error: Option<&str>,
        description: Option<&str>,
    ) -> Self {
        let mut challenge = format!("Bearer realm=\"{}\"", realm.unwrap_or(DEFAULT_REALM));
        if let Some(error) = error {
            challenge.push_str(&format!(",error=\"{error}\""));
        }
        if let Some(description) = description {
            challenge.push_str(&format!(",error_description=\"{description}\""));
        }

        match HeaderValue::from_str(&challenge) {
            Ok(value) => self.with_header(WWW_AUTHENTICATE, value),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping invalid WWW-Authenticate challenge");
                self
            }
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.kind
    }

    /// Variant name, or `HttpError` for the base error.
    pub fn name(&self) -> &'static str {
        self.kind.map_or("HttpError", ErrorKind::name)
    }

    pub fn status(&self) -> StatusCode {
        self.kind
            .map_or(StatusCode::INTERNAL_SERVER_ERROR, ErrorKind::status)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Application code if one was set, else the numeric status.
    pub fn code(&self) -> i64 {
        self.code.unwrap_or_else(|| i64::from(self.status().as_u16()))
    }

    pub fn errors(&self) -> Option<&[Value]> {
        self.errors.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name(), self.message)
    }
}

impl std::error::Error for HttpError {}

impl From<ErrorKind> for HttpError {
    fn from(kind: ErrorKind) -> Self {
        Self::from_kind(kind)
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::from_status(rejection.status().as_u16())
            .unwrap_or_else(Self::bad_request)
            .with_message(rejection.body_text())
    }
}
