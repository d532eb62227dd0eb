//! Per-day search query synthesis
//!
//! Turns one day of a plan (topic, title, phase, micro-topics) into a
//! bounded, deduplicated list of natural-language search queries. Queries
//! are transient; nothing here is persisted.

use std::collections::HashSet;

use crate::models::{Phase, PlanDay};

/// Maximum queries produced for one day.
pub const MAX_QUERIES_PER_DAY: usize = 12;

/// Build the query list for one day of a plan.
///
/// Ordering is deterministic: base phrasings, then phase-keyed variants,
/// then micro-topic variants in micro-topic order, then generic
/// documentation queries. Duplicates keep their first position; the list is
/// capped at [`MAX_QUERIES_PER_DAY`].
pub fn synthesize_queries(topic: &str, day: &PlanDay) -> Vec<String> {
    let mut queries = Vec::new();
    let title = day.title.as_str();

    push_query(&mut queries, &[topic, title]);
    push_query(&mut queries, &[topic, title, "tutorial"]);
    push_query(&mut queries, &[topic, title, "guide"]);

    match day.phase {
        Phase::Beginner => {
            push_query(&mut queries, &[topic, title, "fundamentals"]);
            push_query(&mut queries, &[topic, title, "basics"]);
            push_query(&mut queries, &["learn", topic, title]);
        }
        Phase::Intermediate => {
            push_query(&mut queries, &[topic, title, "practical"]);
            push_query(&mut queries, &[topic, title, "implementation"]);
            push_query(&mut queries, &[topic, title, "examples"]);
        }
        Phase::Advanced => {
            push_query(&mut queries, &["advanced", topic, title]);
            push_query(&mut queries, &[topic, title, "optimization"]);
            push_query(&mut queries, &[topic, title, "best practices"]);
        }
    }

    for micro in &day.micro_topics {
        push_query(&mut queries, &[topic, micro]);
        push_query(&mut queries, &[micro, "explained"]);
        push_query(&mut queries, &[micro, "tutorial"]);
        push_query(&mut queries, &[topic, micro, day.phase.as_str()]);
    }

    push_query(&mut queries, &[topic, "documentation"]);
    push_query(&mut queries, &[topic, "reference"]);
    push_query(&mut queries, &[topic, "technical guide"]);

    dedup_queries(queries, MAX_QUERIES_PER_DAY)
}

/// Join parts into one query. A blank part makes the query malformed and it
/// is skipped rather than emitted half-built.
fn push_query(queries: &mut Vec<String>, parts: &[&str]) {
    if parts.iter().any(|p| p.trim().is_empty()) {
        return;
    }
    let query = parts
        .iter()
        .map(|p| p.trim())
        .collect::<Vec<_>>()
        .join(" ");
    queries.push(query);
}

/// Deduplicate by exact string equality, first occurrence wins, capped.
pub(crate) fn dedup_queries(queries: Vec<String>, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for query in queries {
        if seen.insert(query.clone()) {
            out.push(query);
            if out.len() == cap {
                break;
            }
        }
    }
    out
}
