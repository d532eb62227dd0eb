//! Candidate resources and persisted records
//!
//! A `CandidateItem` is one search hit from an external source. Items flow
//! from the lookup backends through filtering into `ResourceRecord`s, the
//! persisted unit keyed by (plan, day, source).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title emitted by the lookup helpers when a search produced nothing real.
/// Items carrying it are placeholders and must never be persisted.
pub const NO_RESULTS_SENTINEL: &str = "Sorry peeps nothing to see here";

/// External knowledge source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Wikipedia,
    Youtube,
    Reddit,
    Medium,
}

impl Source {
    /// Every source the aggregator fans out to, in fan-out order.
    pub const ALL: [Source; 4] = [
        Source::Wikipedia,
        Source::Youtube,
        Source::Reddit,
        Source::Medium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Wikipedia => "wikipedia",
            Source::Youtube => "youtube",
            Source::Reddit => "reddit",
            Source::Medium => "medium",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = String;

    /// Case-insensitive: the lookup helpers tag items with "Wikipedia",
    /// "wikipedia", "YouTube" and so on interchangeably.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wikipedia" => Ok(Source::Wikipedia),
            "youtube" => Ok(Source::Youtube),
            "reddit" => Ok(Source::Reddit),
            "medium" => Ok(Source::Medium),
            other => Err(format!("unknown source: {}", other)),
        }
    }
}

/// One candidate learning resource.
///
/// Identity for deduplication is the `url`, compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: String,
    pub source: Source,
    /// Free-form tags from the lookup backend (subreddit, channel, word
    /// count, fallback markers, ...).
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl CandidateItem {
    /// True for placeholder items: fallback search links minted by this
    /// service (`type: fallback_search`) and "nothing found" markers from
    /// the lookup helpers (`fallback: true`).
    pub fn is_fallback(&self) -> bool {
        if matches!(self.metadata.get("fallback"), Some(serde_json::Value::Bool(true))) {
            return true;
        }
        matches!(
            self.metadata.get("type"),
            Some(serde_json::Value::String(s)) if s == "fallback_search"
        )
    }

    /// A real result: non-sentinel title and a usable url.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
            && self.title != NO_RESULTS_SENTINEL
            && !self.url.trim().is_empty()
    }
}

/// Persisted curated result set for one (plan, day, source).
///
/// Records are append-only: a new pass writes a new row, and readers take
/// the most recently written record per (day, source).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: i64,
    pub plan_id: Uuid,
    pub day_number: u32,
    pub source: Source,
    pub items: Vec<CandidateItem>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, url: &str) -> CandidateItem {
        CandidateItem {
            title: title.to_string(),
            url: url.to_string(),
            snippet: String::new(),
            source: Source::Wikipedia,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn source_round_trips_through_str() {
        for source in Source::ALL {
            assert_eq!(source.as_str().parse::<Source>().unwrap(), source);
        }
        assert_eq!("YouTube".parse::<Source>().unwrap(), Source::Youtube);
        assert_eq!("Wikipedia".parse::<Source>().unwrap(), Source::Wikipedia);
        assert!("geocities".parse::<Source>().is_err());
    }

    #[test]
    fn source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Source::Medium).unwrap(), "\"medium\"");
        let parsed: Source = serde_json::from_str("\"reddit\"").unwrap();
        assert_eq!(parsed, Source::Reddit);
    }

    #[test]
    fn fallback_detection_covers_both_markers() {
        let mut helper_style = item("Sorry peeps nothing to see here", "");
        helper_style
            .metadata
            .insert("fallback".to_string(), serde_json::Value::Bool(true));
        assert!(helper_style.is_fallback());

        let mut minted = item("Search Wikipedia", "https://en.wikipedia.org/wiki/Special:Search/x");
        minted.metadata.insert(
            "type".to_string(),
            serde_json::Value::String("fallback_search".to_string()),
        );
        assert!(minted.is_fallback());

        assert!(!item("Ownership", "https://example.org").is_fallback());
    }

    #[test]
    fn validity_requires_title_and_url() {
        assert!(item("Ownership", "https://example.org").is_valid());
        assert!(!item("", "https://example.org").is_valid());
        assert!(!item("   ", "https://example.org").is_valid());
        assert!(!item("Ownership", "  ").is_valid());
        assert!(!item(NO_RESULTS_SENTINEL, "https://example.org").is_valid());
    }
}
