//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (header count, request timeout)
//!     → cors.rs (preflight, allow-origin)
//!     → headers.rs (strip fingerprints, add protective headers)
//!     → transport.rs (record scheme, enforce HTTPS)
//!     → Pass to routing
//! ```
//!
//! # Design Decisions
//! - Defense in depth: multiple layers of protection
//! - Fail closed: reject on any security check failure
//! - No trust in forwarded headers unless the proxy is trusted

pub mod cors;
pub mod headers;
pub mod limits;
pub mod transport;

pub use cors::build_cors_layer;
pub use headers::{build_security_headers, security_headers};
pub use limits::{enforce_limits, RequestLimits};
pub use transport::{guard_transport, TransportGuard};
