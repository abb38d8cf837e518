//! End-to-end tests against a real listening server.

use std::time::Duration;

use api_server::config::TlsConfig;
use api_server::{mount, HttpError, ServerConfig, ShutdownController, ShutdownReason};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

mod common;

fn routes() -> Router {
    Router::new()
        .route("/todos", get(|| async { Json(json!([{"id": 1}])) }))
        .route(
            "/missing",
            get(|| async { Err::<Json<Value>, _>(HttpError::not_found().with_message("bad")) }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(400)).await;
                "done"
            }),
        )
        .route(
            "/stuck",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                "never"
            }),
        )
}

fn register(router: Router, config: &ServerConfig) -> Router {
    mount(router, &config.base_url_path, routes())
}

#[tokio::test]
async fn request_ids_are_generated_then_echoed() {
    let server = common::start_server(ServerConfig::default(), ShutdownController::new(), register).await;
    let client = common::client();

    let first = client.get(server.url("/todos")).send().await.unwrap();
    assert_eq!(first.status(), 200);
    let id = first.headers()["x-request-id"].to_str().unwrap().to_owned();
    assert!(uuid::Uuid::parse_str(&id).is_ok());

    let second = client
        .get(server.url("/todos"))
        .header("x-request-id", &id)
        .send()
        .await
        .unwrap();
    assert_eq!(second.headers()["x-request-id"], id.as_str());

    server.shutdown.trigger(ShutdownReason::Requested);
    let outcome = server.task.await.unwrap().unwrap();
    assert_eq!(outcome.exit_code(), 0);
}

#[tokio::test]
async fn handler_errors_are_json() {
    let config = ServerConfig {
        base_url_path: "/api".into(),
        ..ServerConfig::default()
    };
    let server = common::start_server(config, ShutdownController::new(), register).await;
    let client = common::client();

    let response = client.get(server.url("/api/missing")).send().await.unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"message": "bad", "code": 404}));

    let unrouted = client.get(server.url("/todos")).send().await.unwrap();
    assert_eq!(unrouted.status(), 404);
    let body: Value = unrouted.json().await.unwrap();
    assert_eq!(body, json!({"message": "Not Found", "code": 404}));

    server.shutdown.trigger(ShutdownReason::Requested);
    server.task.await.unwrap().unwrap();
}

fn many_headers(request: reqwest::RequestBuilder, n: usize) -> reqwest::RequestBuilder {
    (0..n).fold(request, |request, i| request.header(format!("x-extra-{i}"), "v"))
}

#[tokio::test]
async fn header_count_follows_configured_limit() {
    let server = common::start_server(ServerConfig::default(), ShutdownController::new(), register).await;
    let client = common::client();

    // Above hyper's built-in default of 100, below the configured 1000.
    let response = many_headers(client.get(server.url("/todos")), 150).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));

    server.shutdown.trigger(ShutdownReason::Requested);
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn excess_headers_get_json_431() {
    let config = ServerConfig {
        max_headers_count: 120,
        ..ServerConfig::default()
    };
    let server = common::start_server(config, ShutdownController::new(), register).await;
    let client = common::client();

    let response = many_headers(client.get(server.url("/todos")), 150).send().await.unwrap();
    assert_eq!(response.status(), 431);
    assert!(response.headers().contains_key("x-request-id"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], 431);

    server.shutdown.trigger(ShutdownReason::Requested);
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn tls_behind_proxy_serves_plain_http() {
    let config = ServerConfig {
        behind_proxy: true,
        tls: TlsConfig {
            enabled: true,
            ..TlsConfig::default()
        },
        ..ServerConfig::default()
    };
    let server = common::start_server(config, ShutdownController::new(), register).await;
    let client = common::client();

    // Plain HTTP reaches the app; the proxy is trusted for the scheme.
    let forwarded = client
        .get(server.url("/todos"))
        .header("x-forwarded-proto", "https")
        .send()
        .await
        .unwrap();
    assert_eq!(forwarded.status(), 200);
    assert!(forwarded.headers()["strict-transport-security"]
        .to_str()
        .unwrap()
        .starts_with("max-age="));

    let direct = client.get(server.url("/todos")).send().await.unwrap();
    assert_eq!(direct.status(), 301);
    assert_eq!(
        direct.headers()["location"],
        format!("https://{}/todos", server.addr).as_str()
    );

    let submit = client.post(server.url("/todos")).send().await.unwrap();
    assert_eq!(submit.status(), 403);

    server.shutdown.trigger(ShutdownReason::Requested);
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn in_flight_requests_finish_during_drain() {
    let server = common::start_server(ServerConfig::default(), ShutdownController::new(), register).await;
    let client = common::client();

    let url = server.url("/slow");
    let pending = tokio::spawn(async move { client.get(url).send().await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(server.shutdown.trigger(ShutdownReason::Signal("SIGTERM")));
    assert!(!server.shutdown.trigger(ShutdownReason::Signal("SIGINT")));

    let response = pending.await.unwrap().unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "done");

    let outcome = server.task.await.unwrap().unwrap();
    assert!(outcome.drained);
    assert_eq!(outcome.reason, ShutdownReason::Signal("SIGTERM"));
    assert_eq!(outcome.exit_code(), 0);
}

#[tokio::test]
async fn stuck_request_forces_exit_code_one() {
    let shutdown = ShutdownController::new().with_drain_timeout(Duration::from_millis(200));
    let server = common::start_server(ServerConfig::default(), shutdown, register).await;
    let client = common::client();

    let url = server.url("/stuck");
    let _pending = tokio::spawn(async move { client.get(url).send().await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    server.shutdown.trigger(ShutdownReason::Signal("SIGTERM"));
    let outcome = tokio::time::timeout(Duration::from_secs(5), server.task)
        .await
        .expect("drain deadline not enforced")
        .unwrap()
        .unwrap();

    assert!(!outcome.drained);
    assert_eq!(outcome.exit_code(), 1);
}

#[tokio::test]
async fn stopped_server_refuses_connections() {
    let server = common::start_server(ServerConfig::default(), ShutdownController::new(), register).await;
    let addr = server.addr;

    server.shutdown.trigger(ShutdownReason::Requested);
    server.task.await.unwrap().unwrap();

    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}
