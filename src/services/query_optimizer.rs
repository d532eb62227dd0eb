//! Per-source query specialization
//!
//! Each source answers different phrasings well: YouTube favors "how to"
//! searches, Reddit favors community wording, Wikipedia favors encyclopedic
//! terms. The optimizer appends a fixed set of four such phrasings per
//! source to the synthesized base list.

use crate::models::Source;
use crate::services::query_synthesizer::dedup_queries;

/// Maximum queries issued against one source for one day.
pub const MAX_QUERIES_PER_SOURCE: usize = 8;

/// Specialize a base query list for one source.
///
/// The base list is truncated so the four source additions always fit under
/// the cap; a blank topic produces no additions and the base list passes
/// through capped. Output is deduplicated with first occurrence winning.
pub fn optimize_for_source(source: Source, base_queries: &[String], topic: &str) -> Vec<String> {
    let additions = source_additions(source, topic);
    let keep = MAX_QUERIES_PER_SOURCE.saturating_sub(additions.len());

    let mut queries: Vec<String> = base_queries.iter().take(keep).cloned().collect();
    queries.extend(additions);

    dedup_queries(queries, MAX_QUERIES_PER_SOURCE)
}

fn source_additions(source: Source, topic: &str) -> Vec<String> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Vec::new();
    }

    match source {
        Source::Youtube => vec![
            format!("{} tutorial step by step", topic),
            format!("how to learn {}", topic),
            format!("{} course", topic),
            format!("{} explained", topic),
        ],
        Source::Medium => vec![
            format!("{} deep dive", topic),
            format!("{} comprehensive guide", topic),
            format!("mastering {}", topic),
            format!("{} best practices", topic),
        ],
        Source::Reddit => vec![
            format!("learning {}", topic),
            format!("{} discussion", topic),
            format!("{} help", topic),
            format!("{} resources", topic),
        ],
        Source::Wikipedia => vec![
            format!("{} overview", topic),
            format!("{} introduction", topic),
            format!("{} theory", topic),
            format!("{} principles", topic),
        ],
    }
}
