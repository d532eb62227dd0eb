//! Deterministic fallback search links
//!
//! When every real lookup for a (source, query) pair fails or comes back
//! empty, the user still gets one clickable link: the source's own search
//! page with the query URL-encoded into it. These items are placeholders,
//! marked in metadata and filtered out before persistence; only the
//! synchronous read path surfaces them.

use std::collections::HashMap;

use crate::models::{CandidateItem, Source};

/// Metadata `type` value marking minted search links.
pub const FALLBACK_TYPE: &str = "fallback_search";

/// Build the single placeholder item for a (source, query) pair.
///
/// Deterministic: the same inputs always produce the same title, url and
/// snippet.
pub fn fallback_item(source: Source, query: &str) -> CandidateItem {
    let encoded = urlencoding::encode(query);

    let (title, url, snippet) = match source {
        Source::Wikipedia => (
            format!("Search Wikipedia for \"{}\"", query),
            format!("https://en.wikipedia.org/wiki/Special:Search/{}", encoded),
            format!("Browse Wikipedia articles about {}", query),
        ),
        Source::Youtube => (
            format!("Search YouTube for \"{}\"", query),
            format!("https://www.youtube.com/results?search_query={}", encoded),
            format!("Watch video tutorials about {}", query),
        ),
        Source::Reddit => (
            format!("Search Reddit for \"{}\"", query),
            format!("https://www.reddit.com/search/?q={}", encoded),
            format!("Join community discussions about {}", query),
        ),
        Source::Medium => (
            format!("Search Medium for \"{}\"", query),
            format!("https://medium.com/search?q={}", encoded),
            format!("Read in-depth articles about {}", query),
        ),
    };

    let mut metadata = HashMap::new();
    metadata.insert(
        "type".to_string(),
        serde_json::Value::String(FALLBACK_TYPE.to_string()),
    );

    CandidateItem {
        title,
        url,
        snippet,
        source,
        metadata,
    }
}
