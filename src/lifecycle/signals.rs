//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for SIGINT and SIGTERM
//! - Translate them into a shutdown trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A repeated signal while draining is ignored; the drain deadline
//!   already bounds how long the process lives

use std::io;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::{ShutdownController, ShutdownReason};

/// Wait for the next termination signal and return its name.
#[cfg(unix)]
pub async fn wait_for_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|()| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
pub async fn wait_for_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|()| "SIGINT")
}

/// Forward termination signals to `controller` until the process exits.
pub fn spawn_signal_listener(controller: Arc<ShutdownController>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match wait_for_signal().await {
                Ok(name) => {
                    if !controller.trigger(ShutdownReason::Signal(name)) {
                        tracing::warn!(signal = name, "Already shutting down, signal ignored");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install signal handler");
                    return;
                }
            }
        }
    })
}
