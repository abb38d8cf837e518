//! Middleware chain assembly.
//!
//! Order, outermost first:
//!
//! ```text
//! catch_panic → request_logger → cors? → security_headers → hsts?
//!     → limits → transport guard → compression → pretty_print
//!     → catch_panic → method_override? → caller routes → not_found
//! ```
//!
//! Handler panics are caught below the logger so the 500 still carries the
//! tracking ids and security headers. The outer catcher covers the
//! middleware itself.
//!
//! Every error produced anywhere in the chain is rendered by the
//! `IntoResponse` impl of [`HttpError`](crate::errors::HttpError).

use std::sync::Arc;

use axum::http::header::STRICT_TRANSPORT_SECURITY;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{validate_config, ConfigError, ServerConfig, ValidationError};
use crate::errors::HttpError;
use crate::http::error_handler::{not_found, panic_response};
use crate::http::middleware::{method_override, pretty_print, request_logger, RequestLogger};
use crate::http::response::CompressionPolicy;
use crate::security::{
    build_cors_layer, build_security_headers, enforce_limits, guard_transport, security_headers,
    RequestLimits, TransportGuard,
};

/// Build the application router: the fixed middleware chain around the
/// routes registered by `register`.
///
/// `register` is called exactly once with an empty router and the
/// validated configuration.
pub fn build_app<F>(config: &ServerConfig, register: F) -> Result<Router, ConfigError>
where
    F: FnOnce(Router, &ServerConfig) -> Router,
{
    validate_config(config)?;

    let logger = RequestLogger {
        request_id_header: header_name("logging.request_id_header", &config.logging.request_id_header)?,
        conversation_id_header: header_name(
            "logging.conversation_id_header",
            &config.logging.conversation_id_header,
        )?,
        trust_proxy: config.behind_proxy,
    };

    let limits = RequestLimits::from_config(config);

    let guard = TransportGuard {
        enforce: config.tls.enabled,
        trust_proxy: config.behind_proxy,
        tls_local: config.tls.enabled && !config.behind_proxy,
    };

    let hsts = if config.tls.enabled {
        let value = HeaderValue::from_str(&config.hsts.header_value()).map_err(|_| {
            ConfigError::Validation(vec![ValidationError {
                field: "hsts",
                message: "unrepresentable header value".to_string(),
            }])
        })?;
        Some(SetResponseHeaderLayer::overriding(STRICT_TRANSPORT_SECURITY, value))
    } else {
        None
    };

    let routes = register(Router::new(), config)
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found);

    // Method override has to run before the router picks a handler.
    let dispatch = ServiceBuilder::new()
        .option_layer(config.method_override.then(|| from_fn(method_override)))
        .service(routes);

    let middleware = ServiceBuilder::new()
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn_with_state(Arc::new(logger), request_logger))
        .option_layer(config.cors.as_ref().map(build_cors_layer))
        .layer(from_fn_with_state(build_security_headers(), security_headers))
        .option_layer(hsts)
        .option_layer(
            (!limits.is_unbounded()).then(|| from_fn_with_state(Arc::new(limits), enforce_limits)),
        )
        .layer(from_fn_with_state(Arc::new(guard), guard_transport))
        .layer(
            CompressionLayer::new().compress_when(CompressionPolicy::from_config(&config.compression)),
        )
        .layer(from_fn(pretty_print))
        .layer(CatchPanicLayer::custom(panic_response));

    tracing::debug!(
        base_url_path = %config.base_url_path,
        compression = config.compression.enabled,
        cors = config.cors.is_some(),
        method_override = config.method_override,
        enforce_https = guard.enforce,
        "Middleware chain assembled"
    );

    Ok(Router::new().fallback_service(dispatch).layer(middleware))
}

/// Attach `routes` under `base_path`, or at the root when the path is empty.
///
/// Unsupported methods on the mounted routes answer with a JSON 405.
pub fn mount(router: Router, base_path: &str, routes: Router) -> Router {
    let routes = routes.method_not_allowed_fallback(method_not_allowed);
    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        router.merge(routes)
    } else {
        router.nest(base, routes)
    }
}

async fn method_not_allowed() -> HttpError {
    HttpError::method_not_allowed()
}

fn header_name(field: &'static str, value: &str) -> Result<HeaderName, ConfigError> {
    HeaderName::try_from(value).map_err(|_| {
        ConfigError::Validation(vec![ValidationError {
            field,
            message: format!("invalid header name {value:?}"),
        }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::header::{CONTENT_ENCODING, LOCATION};
    use axum::http::{Method, Request, StatusCode};
    use axum::routing::get;
    use axum::Json;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::{CompressionConfig, CorsConfig, TlsConfig};
    use crate::http::request::FullBaseUrl;

    fn todos() -> Router {
        Router::new()
            .route("/todos", get(|| async { Json(json!([{"id": 1}])) }))
            .route(
                "/todos/{id}",
                get(|| async { Json(json!({"id": 1})) }).delete(|| async { StatusCode::NO_CONTENT }),
            )
            .route("/big", get(|| async { Json(json!({"blob": "a".repeat(10_000)})) }))
            .route("/boom", get(boom))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
                    "late"
                }),
            )
            .route("/base", get(|FullBaseUrl(base): FullBaseUrl| async move { base }))
    }

    async fn boom() -> &'static str {
        panic!("boom")
    }

    fn app(config: ServerConfig) -> Router {
        build_app(&config, |router, cfg| mount(router, &cfg.base_url_path, todos())).unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("host", "localhost:8000")
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unknown_route_is_json_404_with_security_headers() {
        let response = app(ServerConfig::default()).oneshot(get_req("/nope")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()["x-frame-options"], "SAMEORIGIN");
        assert!(response.headers().contains_key("x-request-id"));
        assert!(response.headers().get("strict-transport-security").is_none());
        assert_eq!(body_json(response).await, json!({"message": "Not Found", "code": 404}));
    }

    #[tokio::test]
    async fn wrong_method_is_json_405() {
        let request = Request::builder()
            .method(Method::PATCH)
            .uri("/todos/1")
            .body(Body::empty())
            .unwrap();
        let response = app(ServerConfig::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(response).await["code"], 405);
    }

    #[tokio::test]
    async fn panic_is_isolated() {
        let request = Request::builder()
            .uri("/boom")
            .header("x-request-id", "RID")
            .header("x-conversation-id", "CID")
            .body(Body::empty())
            .unwrap();
        let response = app(ServerConfig::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["x-request-id"], "RID");
        assert_eq!(response.headers()["x-conversation-id"], "CID");
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(
            body_json(response).await,
            json!({"message": "Unhandled exception", "code": 500})
        );
    }

    #[tokio::test]
    async fn routes_are_nested_under_base_path() {
        let config = ServerConfig {
            base_url_path: "/api".to_string(),
            ..ServerConfig::default()
        };
        let router = app(config);

        let found = router.clone().oneshot(get_req("/api/todos")).await.unwrap();
        assert_eq!(found.status(), StatusCode::OK);

        let base = router.clone().oneshot(get_req("/api/base")).await.unwrap();
        let bytes = to_bytes(base.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"http://localhost:8000/api");

        let missing = router.oneshot(get_req("/todos")).await.unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn compression_above_threshold() {
        let config = ServerConfig {
            compression: CompressionConfig {
                enabled: true,
                threshold: 1000,
            },
            ..ServerConfig::default()
        };
        let router = app(config);

        let request = |uri: &str| {
            Request::builder()
                .uri(uri)
                .header("accept-encoding", "gzip")
                .body(Body::empty())
                .unwrap()
        };

        let big = router.clone().oneshot(request("/big")).await.unwrap();
        assert_eq!(big.headers()[CONTENT_ENCODING], "gzip");

        let small = router.oneshot(request("/todos")).await.unwrap();
        assert!(small.headers().get(CONTENT_ENCODING).is_none());
    }

    #[tokio::test]
    async fn pretty_flag_indents_json() {
        let response = app(ServerConfig::default())
            .oneshot(get_req("/todos/1?pretty=true"))
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"{\n  \"id\": 1\n}");
    }

    #[tokio::test]
    async fn method_override_only_when_enabled() {
        let request = || {
            Request::builder()
                .method(Method::POST)
                .uri("/todos/1")
                .header("x-http-method-override", "DELETE")
                .body(Body::empty())
                .unwrap()
        };

        let disabled = app(ServerConfig::default()).oneshot(request()).await.unwrap();
        assert_eq!(disabled.status(), StatusCode::METHOD_NOT_ALLOWED);

        let config = ServerConfig {
            method_override: true,
            ..ServerConfig::default()
        };
        let enabled = app(config).oneshot(request()).await.unwrap();
        assert_eq!(enabled.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn tls_behind_proxy_enforces_https() {
        let config = ServerConfig {
            behind_proxy: true,
            tls: TlsConfig {
                enabled: true,
                ..TlsConfig::default()
            },
            ..ServerConfig::default()
        };
        let router = app(config);

        let redirected = router.clone().oneshot(get_req("/todos")).await.unwrap();
        assert_eq!(redirected.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(redirected.headers()[LOCATION], "https://localhost:8000/todos");
        assert_eq!(
            redirected.headers()["strict-transport-security"],
            "max-age=7776000; includeSubDomains; preload"
        );

        let forwarded = Request::builder()
            .uri("/base")
            .header("host", "api.example.com")
            .header("x-forwarded-proto", "https")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(forwarded).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"https://api.example.com");
    }

    #[tokio::test]
    async fn too_many_headers_rejected() {
        let config = ServerConfig {
            max_headers_count: 2,
            ..ServerConfig::default()
        };
        let request = Request::builder()
            .uri("/todos")
            .header("a", "1")
            .header("b", "2")
            .header("c", "3")
            .body(Body::empty())
            .unwrap();
        let response = app(config).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()["x-frame-options"], "SAMEORIGIN");
        assert_eq!(body_json(response).await["code"], 431);
    }

    #[tokio::test]
    async fn timed_out_request_carries_security_headers() {
        let config = ServerConfig {
            server_timeout_ms: 20,
            ..ServerConfig::default()
        };
        let response = app(config).oneshot(get_req("/slow")).await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()["x-download-options"], "noopen");
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn cors_when_configured() {
        let config = ServerConfig {
            cors: Some(CorsConfig::default()),
            ..ServerConfig::default()
        };
        let request = Request::builder()
            .uri("/todos")
            .header("origin", "https://app.example.com")
            .body(Body::empty())
            .unwrap();
        let response = app(config).oneshot(request).await.unwrap();
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[test]
    fn invalid_config_is_rejected_before_registration() {
        let config = ServerConfig {
            base_url_path: "api".to_string(),
            ..ServerConfig::default()
        };
        let mut called = false;
        let result = build_app(&config, |router, _| {
            called = true;
            router
        });
        assert!(matches!(result, Err(ConfigError::Validation(_))));
        assert!(!called);
    }

    #[test]
    fn mount_root_merges() {
        // nest("/") would panic; an empty or "/" base must merge instead
        let _ = mount(Router::new(), "", todos());
        let _ = mount(Router::new(), "/", todos());
    }
}
