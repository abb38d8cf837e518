//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → ShutdownController::trigger
//!
//! Shutdown (shutdown.rs):
//!     Running → Draining(reason) → Terminated(outcome)
//!
//! Server (http/server.rs):
//!     trigger observed → stop accepting → drain (bounded) → exit code
//! ```
//!
//! # Design Decisions
//! - The first trigger wins: signal, fatal serve error or explicit request
//! - Shutdown has timeout: forced exit after deadline, exit code 1

pub mod shutdown;
pub mod signals;

pub use shutdown::{
    ShutdownController, ShutdownOutcome, ShutdownReason, ShutdownState, DRAIN_TIMEOUT,
};
pub use signals::spawn_signal_listener;
