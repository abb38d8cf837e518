//! HTTP error taxonomy.
//!
//! # Data Flow
//! ```text
//! route code
//!     → HttpError::not_found() / HttpError::from_status(422) / Fault::unexpected(e)
//!     → returned as Err(..) from the handler
//!     → http::error_handler renders {message, code, errors?}
//! ```
//!
//! # Design Decisions
//! - Closed `ErrorKind` enum generated from one status table, no type hierarchy
//! - Every variant shares the `HttpError` record shape
//! - Unknown codes and codes below 400 have no variant

pub mod fault;
pub mod http_error;
pub mod kind;

pub use fault::{BoxError, Fault};
pub use http_error::{HttpError, DEFAULT_REALM};
pub use kind::ErrorKind;
