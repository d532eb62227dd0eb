//! Synchronous first-look resources
//!
//! The background orchestrator takes a while; until it has persisted
//! something, the read path serves this narrower variant instead: the first
//! few days only, one query per (day, source), a tight fetch budget, and
//! fallback links passed through unfiltered so the caller always has
//! something clickable.
//!
//! Responses are cached briefly per (topic, duration) so impatient clients
//! polling the read path do not re-run the same lookup storm.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tokio::sync::RwLock;

use crate::lookup::SourceLookup;
use crate::models::{CandidateItem, Source};
use crate::services::resource_orchestrator::UNIT_PARALLELISM;
use crate::services::source_fetcher::SourceFetcher;

/// How many leading days the fast path covers.
pub const IMMEDIATE_DAY_LIMIT: u32 = 5;

/// Lookup budget for the synchronous path. Tighter than the background
/// pipeline's because a client is waiting on the response.
pub const IMMEDIATE_FETCH_TIMEOUT: Duration = Duration::from_secs(8);

/// How long one (topic, duration) response stays servable from cache.
pub const IMMEDIATE_CACHE_TTL: Duration = Duration::from_secs(60);

/// day -> source -> items, fallbacks included.
pub type ImmediateResources = BTreeMap<u32, BTreeMap<String, Vec<CandidateItem>>>;

struct CacheEntry {
    stored_at: Instant,
    resources: ImmediateResources,
}

/// Serves first-look resources for a (topic, duration) pair.
#[derive(Clone)]
pub struct ImmediateResourceService {
    fetcher: SourceFetcher,
    cache: Arc<RwLock<HashMap<(String, u32), CacheEntry>>>,
    ttl: Duration,
}

impl ImmediateResourceService {
    pub fn new(lookup: Arc<dyn SourceLookup>) -> Self {
        Self::with_settings(lookup, IMMEDIATE_FETCH_TIMEOUT, IMMEDIATE_CACHE_TTL)
    }

    pub fn with_settings(
        lookup: Arc<dyn SourceLookup>,
        fetch_timeout: Duration,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            fetcher: SourceFetcher::with_timeout(lookup, fetch_timeout),
            cache: Arc::new(RwLock::new(HashMap::new())),
            ttl: cache_ttl,
        }
    }

    /// Resources for the first `min(duration, 5)` days of a topic.
    ///
    /// One query per (day, source): `"{topic} day {n} fundamentals"`. Real
    /// and fallback items are returned alike; nothing is persisted.
    pub async fn get(&self, topic: &str, duration_days: u32) -> ImmediateResources {
        let key = (topic.to_string(), duration_days);

        if let Some(entry) = self.cache.read().await.get(&key) {
            if entry.stored_at.elapsed() < self.ttl {
                tracing::debug!(topic = %topic, duration_days, "Serving immediate resources from cache");
                return entry.resources.clone();
            }
        }

        let resources = self.fetch_all(topic, duration_days).await;

        let mut cache = self.cache.write().await;
        cache.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        cache.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                resources: resources.clone(),
            },
        );

        resources
    }

    async fn fetch_all(&self, topic: &str, duration_days: u32) -> ImmediateResources {
        let day_limit = duration_days.min(IMMEDIATE_DAY_LIMIT);
        let start_time = Instant::now();

        tracing::info!(
            topic = %topic,
            duration_days,
            day_limit,
            "Fetching immediate resources"
        );

        let units: Vec<(u32, Source)> = (1..=day_limit)
            .flat_map(|day| Source::ALL.iter().copied().map(move |source| (day, source)))
            .collect();

        let fetched: Vec<(u32, Source, Vec<CandidateItem>)> = stream::iter(units)
            .map(|(day, source)| {
                let fetcher = self.fetcher.clone();
                let query = format!("{} day {} fundamentals", topic, day);

                async move {
                    let items = fetcher.fetch(source, &query).await;
                    (day, source, items)
                }
            })
            .buffer_unordered(UNIT_PARALLELISM)
            .collect()
            .await;

        let mut resources = ImmediateResources::new();
        for (day, source, items) in fetched {
            resources
                .entry(day)
                .or_default()
                .insert(source.as_str().to_string(), items);
        }

        tracing::info!(
            topic = %topic,
            days = resources.len(),
            duration_seconds = start_time.elapsed().as_secs(),
            "Immediate resources ready"
        );

        resources
    }
}
