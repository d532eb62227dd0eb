//! Helper-script lookup backend
//!
//! Each source has a helper executable under a configured directory
//! (`fetch_wikipedia`, `fetch_youtube`, `fetch_reddit`, `fetch_medium`).
//! A helper takes the query as its single argument and prints a JSON array
//! of result objects to stdout, exiting 0 on success.
//!
//! Children are spawned with `kill_on_drop` so a caller that drops the
//! lookup future (deadline expiry) also reclaims the process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Deserialize;

use super::{LookupError, SourceLookup};
use crate::models::{CandidateItem, Source};

/// One result row as printed by a helper script.
///
/// Helpers disagree on details: some call the summary `description` instead
/// of `snippet`, some tag the source at top level instead of inside
/// `metadata`, and extra fields (subreddit, channel, word counts) appear at
/// either level. Everything unknown is folded into the metadata map.
#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    metadata: Option<HashMap<String, serde_json::Value>>,
    #[serde(flatten)]
    extra: HashMap<String, serde_json::Value>,
}

impl RawItem {
    fn into_item(self, source: Source) -> CandidateItem {
        let snippet = self.snippet.or(self.description).unwrap_or_default();
        let mut metadata = self.metadata.unwrap_or_default();
        for (key, value) in self.extra {
            metadata.entry(key).or_insert(value);
        }
        CandidateItem {
            title: self.title,
            url: self.url,
            snippet,
            source,
            metadata,
        }
    }
}

/// Lookup backend that shells out to per-source helper executables.
pub struct ScriptLookup {
    script_dir: PathBuf,
}

impl ScriptLookup {
    pub fn new(script_dir: impl Into<PathBuf>) -> Self {
        Self {
            script_dir: script_dir.into(),
        }
    }

    fn helper_path(&self, source: Source) -> PathBuf {
        self.script_dir.join(format!("fetch_{}", source.as_str()))
    }

    /// Availability of each source's helper, for startup diagnostics.
    pub fn helper_status(&self) -> Vec<(Source, bool)> {
        Source::ALL
            .iter()
            .map(|&source| (source, self.helper_path(source).exists()))
            .collect()
    }

    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }
}

#[async_trait::async_trait]
impl SourceLookup for ScriptLookup {
    fn name(&self) -> &'static str {
        "script"
    }

    async fn lookup(
        &self,
        source: Source,
        query: &str,
    ) -> Result<Vec<CandidateItem>, LookupError> {
        let helper = self.helper_path(source);
        if !helper.exists() {
            return Err(LookupError::HelperNotFound(helper.display().to_string()));
        }

        tracing::debug!(
            source = %source,
            query = %query,
            helper = %helper.display(),
            "Running lookup helper"
        );

        let child = tokio::process::Command::new(&helper)
            .arg(query)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    LookupError::HelperNotFound(helper.display().to_string())
                }
                _ => LookupError::ExecutionError(e.to_string()),
            })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| LookupError::ExecutionError(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LookupError::HelperFailed(format!(
                "exit code {:?}, stderr: {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let raw: Vec<RawItem> = serde_json::from_str(stdout.trim())
            .map_err(|e| LookupError::ParseError(e.to_string()))?;

        Ok(raw.into_iter().map(|r| r.into_item(source)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_item_accepts_snippet_field() {
        let json = r#"{
            "title": "Ownership",
            "url": "https://en.wikipedia.org/wiki/Ownership",
            "snippet": "A Wikipedia article",
            "source": "wikipedia",
            "wordcount": 1200
        }"#;

        let raw: RawItem = serde_json::from_str(json).unwrap();
        let item = raw.into_item(Source::Wikipedia);

        assert_eq!(item.title, "Ownership");
        assert_eq!(item.snippet, "A Wikipedia article");
        assert_eq!(item.source, Source::Wikipedia);
        assert_eq!(
            item.metadata.get("wordcount"),
            Some(&serde_json::json!(1200))
        );
    }

    #[test]
    fn raw_item_accepts_description_alias() {
        let json = r#"{
            "title": "Learning Rust",
            "url": "https://reddit.com/r/rust/comments/abc",
            "description": "A discussion thread",
            "metadata": {
                "source": "Reddit",
                "subreddit": "rust",
                "score": 42
            }
        }"#;

        let raw: RawItem = serde_json::from_str(json).unwrap();
        let item = raw.into_item(Source::Reddit);

        assert_eq!(item.snippet, "A discussion thread");
        assert_eq!(item.metadata.get("subreddit"), Some(&serde_json::json!("rust")));
        assert_eq!(item.metadata.get("score"), Some(&serde_json::json!(42)));
    }

    #[test]
    fn raw_item_tolerates_missing_fields() {
        let raw: RawItem = serde_json::from_str("{}").unwrap();
        let item = raw.into_item(Source::Medium);

        assert!(item.title.is_empty());
        assert!(item.url.is_empty());
        assert!(item.snippet.is_empty());
        assert!(!item.is_valid());
    }

    #[test]
    fn fallback_marker_survives_conversion() {
        let json = r#"{
            "title": "Sorry peeps nothing to see here",
            "url": "",
            "description": "No results found",
            "metadata": { "source": "YouTube", "fallback": true }
        }"#;

        let raw: RawItem = serde_json::from_str(json).unwrap();
        let item = raw.into_item(Source::Youtube);

        assert!(item.is_fallback());
        assert!(!item.is_valid());
    }

    #[test]
    fn helper_path_uses_source_name() {
        let lookup = ScriptLookup::new("/opt/helpers");
        assert_eq!(
            lookup.helper_path(Source::Wikipedia),
            PathBuf::from("/opt/helpers/fetch_wikipedia")
        );
        assert_eq!(
            lookup.helper_path(Source::Youtube),
            PathBuf::from("/opt/helpers/fetch_youtube")
        );
    }

    #[tokio::test]
    async fn missing_helper_reports_not_found() {
        let lookup = ScriptLookup::new("/nonexistent/helpers");
        let err = lookup.lookup(Source::Reddit, "anything").await.unwrap_err();
        assert!(matches!(err, LookupError::HelperNotFound(_)));
    }
}
