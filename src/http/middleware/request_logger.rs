//! Per-request tracking ids and access logging.
//!
//! The access-log event is emitted when the response body has been fully
//! written, or dropped early, so `duration_ms` covers streaming and
//! compression.

use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::{Body, Bytes, HttpBody};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::{CONTENT_LENGTH, REFERER, USER_AGENT};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Version};
use axum::middleware::Next;
use axum::response::Response;
use http_body::{Frame, SizeHint};
use tracing::Instrument;

use crate::http::request::{generate_tracking_id, RequestContext, SkipRequestLog};

/// Header names and trust settings for the request logger.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    pub request_id_header: HeaderName,
    pub conversation_id_header: HeaderName,
    /// Take the client address from `X-Forwarded-For`.
    pub trust_proxy: bool,
}

impl Default for RequestLogger {
    fn default() -> Self {
        Self {
            request_id_header: HeaderName::from_static(crate::http::request::X_REQUEST_ID),
            conversation_id_header: HeaderName::from_static(crate::http::request::X_CONVERSATION_ID),
            trust_proxy: false,
        }
    }
}

/// Assign tracking ids, run the rest of the chain inside a `request` span and
/// emit one access-log event once the response has been sent.
pub async fn request_logger(
    State(logger): State<Arc<RequestLogger>>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = RequestContext {
        request_id: tracking_id(request.headers(), &logger.request_id_header),
        conversation_id: tracking_id(request.headers(), &logger.conversation_id_header),
        started_at: Instant::now(),
    };

    let method = request.method().clone();
    let url = request.uri().to_string();
    let version = http_version(request.version());
    let referrer = header_str(request.headers(), &REFERER)
        .or_else(|| header_str(request.headers(), "referrer"))
        .map(str::to_owned);
    let user_agent = header_str(request.headers(), &USER_AGENT).map(str::to_owned);
    let remote_address = client_address(&request, logger.trust_proxy);

    let span = tracing::info_span!(
        "request",
        req_id = %context.request_id,
        conversation_id = %context.conversation_id,
    );

    request.extensions_mut().insert(context.clone());
    let mut response = next.run(request).instrument(span.clone()).await;

    for (name, id) in [
        (&logger.request_id_header, &context.request_id),
        (&logger.conversation_id_header, &context.conversation_id),
    ] {
        if let Ok(value) = HeaderValue::from_str(id) {
            response.headers_mut().insert(name.clone(), value);
        }
    }

    if response.extensions().get::<SkipRequestLog>().is_some() {
        return response;
    }

    let content_length = header_str(response.headers(), &CONTENT_LENGTH)
        .and_then(|v| v.parse::<u64>().ok())
        .or_else(|| response.body().size_hint().exact());

    let log = AccessLog {
        span,
        started_at: context.started_at,
        method,
        url,
        version,
        status: response.status().as_u16(),
        content_length,
        referrer,
        user_agent,
        remote_address,
    };
    response.map(|inner| Body::new(LoggedBody { inner, log: Some(log) }))
}

struct AccessLog {
    span: tracing::Span,
    started_at: Instant,
    method: Method,
    url: String,
    version: &'static str,
    status: u16,
    content_length: Option<u64>,
    referrer: Option<String>,
    user_agent: Option<String>,
    remote_address: Option<String>,
}

impl AccessLog {
    fn emit(self) {
        self.span.in_scope(|| {
            tracing::info!(
                method = %self.method,
                url = %self.url,
                http_version = self.version,
                status_code = self.status,
                content_length = ?self.content_length,
                referrer = ?self.referrer,
                user_agent = ?self.user_agent,
                remote_address = ?self.remote_address,
                duration_ms = self.started_at.elapsed().as_millis() as u64,
                "request"
            );
        });
    }
}

/// Response body that logs once its last frame is produced or it is dropped.
struct LoggedBody {
    inner: Body,
    log: Option<AccessLog>,
}

impl LoggedBody {
    fn finish(&mut self) {
        if let Some(log) = self.log.take() {
            log.emit();
        }
    }
}

impl HttpBody for LoggedBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let poll = Pin::new(&mut self.inner).poll_frame(cx);
        if matches!(poll, Poll::Ready(None) | Poll::Ready(Some(Err(_)))) {
            self.finish();
        }
        poll
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for LoggedBody {
    fn drop(&mut self) {
        self.finish();
    }
}

fn tracking_id(headers: &HeaderMap, name: &HeaderName) -> String {
    header_str(headers, name)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(generate_tracking_id)
}

fn header_str<K: axum::http::header::AsHeaderName>(headers: &HeaderMap, name: K) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn client_address(request: &Request, trust_proxy: bool) -> Option<String> {
    if trust_proxy {
        let forwarded = header_str(request.headers(), "x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(addr) = forwarded {
            return Some(addr.to_owned());
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

fn http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_11 => "1.1",
        Version::HTTP_2 => "2.0",
        Version::HTTP_3 => "3.0",
        _ => "unknown",
    }
}
