//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (bind, transport, shutdown sequence)
//!     → app.rs (fixed middleware chain)
//!     → middleware/ (request logger, pretty print, method override)
//!     → caller routes, request.rs extractors
//!     → error_handler.rs (every error rendered as JSON)
//!     → response.rs (compression policy)
//!     → Send to client
//! ```

pub mod app;
pub mod error_handler;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use app::{build_app, mount};
pub use request::{FullBaseUrl, RequestContext, RequestScheme, SkipRequestLog, X_CONVERSATION_ID, X_REQUEST_ID};
pub use server::{ApiServer, ServerError};
