//! JSON API server library.
//!
//! Bootstraps an HTTP(S) server around caller-supplied routes and puts a
//! fixed middleware chain in front of them: panic isolation, request
//! logging, request limits, CORS, security headers, HTTPS enforcement,
//! compression, pretty printing, method override and JSON error responses.

pub mod config;
pub mod errors;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;

pub use config::ServerConfig;
pub use errors::{ErrorKind, Fault, HttpError};
pub use http::{build_app, mount, ApiServer, FullBaseUrl, RequestContext};
pub use lifecycle::{ShutdownController, ShutdownOutcome, ShutdownReason};
