//! Request/response middleware written with `axum::middleware::from_fn`.

pub mod method_override;
pub mod pretty_print;
pub mod request_logger;

pub use method_override::method_override;
pub use pretty_print::pretty_print;
pub use request_logger::{request_logger, RequestLogger};
