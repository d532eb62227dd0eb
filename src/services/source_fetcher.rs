//! Bounded-time lookups with a never-failing contract
//!
//! The fetcher is the single point where lookup failure modes (timeout,
//! process failure, transport error, malformed output, empty result sets)
//! collapse into one uniform shape: a non-empty item list. Everything above
//! it can treat fetching as infallible.

use std::sync::Arc;
use std::time::Duration;

use crate::lookup::SourceLookup;
use crate::models::{CandidateItem, Source};
use crate::services::fallback::fallback_item;

/// Hard deadline for one lookup call in the background pipeline.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Runs single (source, query) lookups under a hard deadline.
#[derive(Clone)]
pub struct SourceFetcher {
    lookup: Arc<dyn SourceLookup>,
    timeout: Duration,
}

impl SourceFetcher {
    pub fn new(lookup: Arc<dyn SourceLookup>) -> Self {
        Self::with_timeout(lookup, FETCH_TIMEOUT)
    }

    /// Same backend under a different deadline. The synchronous read path
    /// uses a tighter budget than the background orchestrator.
    pub fn with_timeout(lookup: Arc<dyn SourceLookup>, timeout: Duration) -> Self {
        Self { lookup, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// One lookup. Never fails outward.
    ///
    /// On deadline expiry the lookup future is dropped, which reclaims the
    /// underlying resource (helper process killed, HTTP request aborted).
    /// Every failure path, and a success with no valid items, yields the
    /// fallback item for this pair.
    pub async fn fetch(&self, source: Source, query: &str) -> Vec<CandidateItem> {
        match tokio::time::timeout(self.timeout, self.lookup.lookup(source, query)).await {
            Ok(Ok(items)) => {
                let valid: Vec<CandidateItem> =
                    items.into_iter().filter(|i| i.is_valid()).collect();
                if valid.is_empty() {
                    tracing::debug!(
                        source = %source,
                        query = %query,
                        "Lookup returned no valid items, using fallback"
                    );
                    vec![fallback_item(source, query)]
                } else {
                    tracing::debug!(
                        source = %source,
                        query = %query,
                        count = valid.len(),
                        "Lookup returned items"
                    );
                    valid
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    source = %source,
                    query = %query,
                    error = %e,
                    "Lookup failed, using fallback"
                );
                vec![fallback_item(source, query)]
            }
            Err(_) => {
                tracing::warn!(
                    source = %source,
                    query = %query,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Lookup timed out, using fallback"
                );
                vec![fallback_item(source, query)]
            }
        }
    }
}
