//! External lookup backends
//!
//! A lookup backend answers one question: given a source and a query string,
//! return zero or more candidate items or fail. Everything above this layer
//! (timeouts, fallbacks, filtering) is backend-agnostic.
//!
//! Two backends ship:
//! - [`script::ScriptLookup`] shells out to one helper executable per source
//! - [`http::HttpLookup`] talks to the public search APIs directly

pub mod http;
pub mod script;

pub use http::HttpLookup;
pub use script::ScriptLookup;

use thiserror::Error;

use crate::models::{CandidateItem, Source};

/// Lookup backend errors
#[derive(Debug, Error)]
pub enum LookupError {
    /// Helper executable missing for the requested source
    #[error("Lookup helper not found: {0}")]
    HelperNotFound(String),

    /// Failed to spawn or wait on the helper process
    #[error("Failed to execute lookup helper: {0}")]
    ExecutionError(String),

    /// Helper ran but exited non-zero
    #[error("Lookup helper failed: {0}")]
    HelperFailed(String),

    /// Network communication error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Search API returned an error response
    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    /// Backend output was not the expected JSON shape
    #[error("Failed to parse lookup output: {0}")]
    ParseError(String),

    /// Backend has no way to query this source
    #[error("No direct lookup support for {0}")]
    Unsupported(Source),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A pluggable search backend.
#[async_trait::async_trait]
pub trait SourceLookup: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Run one search against one source.
    ///
    /// Implementations must abandon their external resource (child process,
    /// in-flight request) when the returned future is dropped; callers
    /// enforce deadlines by dropping.
    async fn lookup(&self, source: Source, query: &str)
        -> Result<Vec<CandidateItem>, LookupError>;
}
