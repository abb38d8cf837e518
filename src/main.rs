//! Demo API server.
//!
//! Serves the example `todos` resource under the configured base path with
//! the full middleware chain in front of it.
//!
//! ```text
//! API_BASE_URL=/api API_COMPRESSION=1 API_PORT=4443 api-server
//! ```

mod todos;

use std::process::ExitCode;

use clap::Parser;

use api_server::config::ServerArgs;
use api_server::http::{mount, ApiServer};
use api_server::observability::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let args = ServerArgs::parse();

    let config = match args.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("api-server: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("api-server: failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.bind_address(),
        base_url_path = %config.base_url_path,
        tls = config.tls.enabled,
        behind_proxy = config.behind_proxy,
        "Configuration loaded"
    );

    let server = match ApiServer::new(config, |router, cfg| {
        mount(router, &cfg.base_url_path, todos::router())
    }) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build server");
            return ExitCode::FAILURE;
        }
    };

    match server.run().await {
        Ok(outcome) => {
            tracing::info!("Shutdown complete");
            ExitCode::from(outcome.exit_code())
        }
        Err(e) => {
            tracing::error!(error = %e, "Server failed to start");
            ExitCode::FAILURE
        }
    }
}
