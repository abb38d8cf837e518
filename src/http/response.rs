//! Response transformation.
//!
//! # Responsibilities
//! - Decide which responses are worth compressing
//!
//! # Design Decisions
//! - The compression layer is always installed; a disabled policy simply
//!   never matches, which keeps the middleware stack a single type
//! - Bodies of unknown length are compressed, as are bodies above the threshold

use axum::body::HttpBody;
use axum::http::Response;
use tower_http::compression::predicate::{DefaultPredicate, Predicate, SizeAbove};

use crate::config::CompressionConfig;

/// Compression predicate built from [`CompressionConfig`].
#[derive(Clone)]
pub struct CompressionPolicy {
    enabled: bool,
    size: SizeAbove,
    content: DefaultPredicate,
}

impl CompressionPolicy {
    pub fn from_config(config: &CompressionConfig) -> Self {
        Self {
            enabled: config.enabled,
            size: SizeAbove::new(config.threshold),
            content: DefaultPredicate::new(),
        }
    }
}

impl Predicate for CompressionPolicy {
    fn should_compress<B>(&self, response: &Response<B>) -> bool
    where
        B: HttpBody,
    {
        self.enabled && self.size.should_compress(response) && self.content.should_compress(response)
    }
}
