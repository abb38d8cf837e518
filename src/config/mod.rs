//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! ServerConfig::default()
//!     → loader.rs (optional TOML file, fields merged over defaults)
//!     → env.rs (API_* env vars / CLI flags, explicit values win)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → handed to the route callback and the middleware chain
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the server starts
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::ServerArgs;
pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CompressionConfig, CorsConfig, HstsConfig, LogFormat, LoggingConfig, ServerConfig, TlsConfig,
};
pub use validation::{validate_config, ValidationError};
