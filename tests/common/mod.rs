//! Shared utilities for integration tests.

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

use api_server::http::server::ServerError;
use api_server::{ApiServer, ServerConfig, ShutdownController, ShutdownOutcome};
use axum::Router;
use tokio::task::JoinHandle;

pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Arc<ShutdownController>,
    pub task: JoinHandle<Result<ShutdownOutcome, ServerError>>,
}

impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a server on an ephemeral localhost port and wait until it accepts.
pub async fn start_server<F>(
    config: ServerConfig,
    shutdown: ShutdownController,
    register: F,
) -> RunningServer
where
    F: FnOnce(Router, &ServerConfig) -> Router,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Arc::new(shutdown);

    let server = ApiServer::new(config, register)
        .unwrap()
        .with_shutdown(shutdown.clone());
    let task = tokio::spawn(server.run_on(listener));

    wait_until_accepting(addr).await;
    RunningServer { addr, shutdown, task }
}

async fn wait_until_accepting(addr: SocketAddr) {
    for _ in 0..50 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server at {addr} never started accepting");
}

/// Client that neither pools connections nor follows redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
