//! Direct HTTP lookup backend
//!
//! For deployments without helper scripts. Wikipedia is queried through the
//! MediaWiki search API and Reddit through its public search JSON endpoint.
//! YouTube and Medium offer no keyless search API; lookups against them
//! report [`LookupError::Unsupported`] and the caller falls back to search
//! links like for any other failure.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;

use super::{LookupError, SourceLookup};
use crate::models::{CandidateItem, Source};

const WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";
const REDDIT_SEARCH_URL: &str = "https://www.reddit.com/search.json";
const USER_AGENT: &str = "studymap-ra/0.1.0 (learning resource aggregator)";
const RATE_LIMIT_MS: u64 = 500;
const RESULT_LIMIT: usize = 5;

/// Wikipedia search response (query/search subset)
#[derive(Debug, Deserialize)]
struct WikiSearchResponse {
    query: Option<WikiQuery>,
}

#[derive(Debug, Deserialize)]
struct WikiQuery {
    #[serde(default)]
    search: Vec<WikiSearchHit>,
}

#[derive(Debug, Deserialize)]
struct WikiSearchHit {
    title: String,
    /// HTML-highlighted excerpt
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    wordcount: Option<u64>,
}

/// Reddit listing response (data/children subset)
#[derive(Debug, Deserialize)]
struct RedditListing {
    data: Option<RedditListingData>,
}

#[derive(Debug, Deserialize)]
struct RedditListingData {
    #[serde(default)]
    children: Vec<RedditChild>,
}

#[derive(Debug, Deserialize)]
struct RedditChild {
    data: RedditPost,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    #[serde(default)]
    title: String,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    subreddit: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: i64,
}

/// Minimum spacing between outbound requests (shared across sources).
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Lookup rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Lookup backend that talks to public search APIs directly.
pub struct HttpLookup {
    http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
}

impl HttpLookup {
    pub fn new() -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LookupError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_MS)),
        })
    }

    async fn search_wikipedia(&self, query: &str) -> Result<Vec<CandidateItem>, LookupError> {
        self.rate_limiter.wait().await;

        tracing::debug!(query = %query, "Querying Wikipedia search API");

        let response = self
            .http_client
            .get(WIKIPEDIA_API_URL)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", "5"),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| LookupError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LookupError::ApiError(status.as_u16(), error_text));
        }

        let parsed: WikiSearchResponse = response
            .json()
            .await
            .map_err(|e| LookupError::ParseError(e.to_string()))?;

        let hits = parsed.query.map(|q| q.search).unwrap_or_default();

        Ok(hits
            .into_iter()
            .take(RESULT_LIMIT)
            .map(|hit| {
                let url = format!(
                    "https://en.wikipedia.org/wiki/{}",
                    urlencoding::encode(&hit.title.replace(' ', "_"))
                );
                let mut metadata = std::collections::HashMap::new();
                if let Some(wordcount) = hit.wordcount {
                    metadata.insert("wordcount".to_string(), serde_json::json!(wordcount));
                }
                CandidateItem {
                    title: hit.title,
                    url,
                    snippet: truncate_chars(&strip_tags(&hit.snippet), 300),
                    source: Source::Wikipedia,
                    metadata,
                }
            })
            .collect())
    }

    async fn search_reddit(&self, query: &str) -> Result<Vec<CandidateItem>, LookupError> {
        self.rate_limiter.wait().await;

        tracing::debug!(query = %query, "Querying Reddit search API");

        let response = self
            .http_client
            .get(REDDIT_SEARCH_URL)
            .query(&[
                ("q", query),
                ("limit", "5"),
                ("sort", "relevance"),
                ("t", "all"),
            ])
            .send()
            .await
            .map_err(|e| LookupError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LookupError::ApiError(status.as_u16(), error_text));
        }

        let parsed: RedditListing = response
            .json()
            .await
            .map_err(|e| LookupError::ParseError(e.to_string()))?;

        let children = parsed
            .data
            .map(|d| d.children)
            .unwrap_or_default();

        Ok(children
            .into_iter()
            .take(RESULT_LIMIT)
            .map(|child| {
                let post = child.data;
                let snippet = if post.selftext.trim().is_empty() {
                    format!("Discussion in r/{}", post.subreddit)
                } else {
                    truncate_chars(&post.selftext, 200)
                };
                let mut metadata = std::collections::HashMap::new();
                metadata.insert("subreddit".to_string(), serde_json::json!(post.subreddit));
                metadata.insert("score".to_string(), serde_json::json!(post.score));
                metadata.insert(
                    "num_comments".to_string(),
                    serde_json::json!(post.num_comments),
                );
                CandidateItem {
                    title: post.title,
                    url: format!("https://www.reddit.com{}", post.permalink),
                    snippet,
                    source: Source::Reddit,
                    metadata,
                }
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl SourceLookup for HttpLookup {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn lookup(
        &self,
        source: Source,
        query: &str,
    ) -> Result<Vec<CandidateItem>, LookupError> {
        match source {
            Source::Wikipedia => self.search_wikipedia(query).await,
            Source::Reddit => self.search_reddit(query).await,
            Source::Youtube | Source::Medium => Err(LookupError::Unsupported(source)),
        }
    }
}

/// Remove HTML tags from MediaWiki-highlighted snippets.
fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Truncate on a character boundary, appending an ellipsis when shortened.
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max).collect();
        out.push_str("...");
        out
    }
}
