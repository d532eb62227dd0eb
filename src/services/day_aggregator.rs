//! Per-(day, source) aggregation unit
//!
//! One unit of aggregation work: synthesize queries for a day, specialize
//! them for a source, run every query through the fetcher, then curate what
//! came back. Persistence stays with the orchestrator.

use std::collections::HashSet;

use crate::models::{CandidateItem, PlanDay, Source};
use crate::services::query_optimizer::optimize_for_source;
use crate::services::query_synthesizer::synthesize_queries;
use crate::services::source_fetcher::SourceFetcher;

/// Maximum curated items kept per (day, source).
pub const RESULT_BUDGET: usize = 5;

/// Aggregate resources for one day against one source.
///
/// Queries run sequentially so one unit holds at most one lookup in flight;
/// concurrency lives a level up, across units.
pub async fn aggregate_day_source(
    fetcher: &SourceFetcher,
    topic: &str,
    day: &PlanDay,
    source: Source,
) -> Vec<CandidateItem> {
    let base = synthesize_queries(topic, day);
    let queries = optimize_for_source(source, &base, topic);

    let mut collected = Vec::new();
    for query in &queries {
        let items = fetcher.fetch(source, query).await;
        collected.extend(items);
    }

    let gathered = collected.len();
    let curated = curate(collected);

    tracing::debug!(
        day = day.day_number,
        source = %source,
        queries = queries.len(),
        gathered,
        curated = curated.len(),
        "Day aggregation unit finished"
    );

    curated
}

/// Drop placeholders and malformed items, dedup by url (first occurrence
/// wins), cap at [`RESULT_BUDGET`].
pub fn curate(items: Vec<CandidateItem>) -> Vec<CandidateItem> {
    let mut seen = HashSet::new();
    let mut curated = Vec::new();

    for item in items {
        if item.is_fallback() || !item.is_valid() {
            continue;
        }
        if seen.insert(item.url.clone()) {
            curated.push(item);
            if curated.len() == RESULT_BUDGET {
                break;
            }
        }
    }

    curated
}
