//! Full-plan aggregation driver
//!
//! Crosses every day of a plan with every source, runs the per-unit
//! aggregation with bounded parallelism, and persists non-empty curated
//! results through the injected store. A pass is detached from whoever
//! triggered it; failures are logged and never surfaced.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::ResourceStore;
use crate::models::{Plan, PlanDay, Source};
use crate::services::day_aggregator::aggregate_day_source;
use crate::services::source_fetcher::SourceFetcher;

/// How many (day, source) units run concurrently within one pass.
pub const UNIT_PARALLELISM: usize = 4;

/// Outcome of a single aggregation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    /// (day, source) units attempted
    pub units: usize,
    /// Units whose curated results were persisted
    pub records_written: usize,
    /// Units that curated fine but failed to persist
    pub store_failures: usize,
}

enum UnitOutcome {
    Written,
    Empty,
    StoreFailed,
}

/// Drives aggregation passes over whole plans.
#[derive(Clone)]
pub struct ResourceOrchestrator {
    fetcher: SourceFetcher,
    store: ResourceStore,
    parallelism: usize,
    active_plans: Arc<RwLock<HashSet<Uuid>>>,
}

impl ResourceOrchestrator {
    pub fn new(fetcher: SourceFetcher, store: ResourceStore) -> Self {
        Self::with_parallelism(fetcher, store, UNIT_PARALLELISM)
    }

    pub fn with_parallelism(
        fetcher: SourceFetcher,
        store: ResourceStore,
        parallelism: usize,
    ) -> Self {
        Self {
            fetcher,
            store,
            parallelism: parallelism.max(1),
            active_plans: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Whether a pass for this plan is currently in flight.
    pub async fn is_active(&self, plan_id: Uuid) -> bool {
        self.active_plans.read().await.contains(&plan_id)
    }

    /// Number of passes currently in flight, for health reporting.
    pub async fn active_count(&self) -> usize {
        self.active_plans.read().await.len()
    }

    /// Spawn a detached pass and return immediately.
    ///
    /// The spawned task owns its error handling; nothing propagates back to
    /// the caller, who has typically already answered its HTTP request.
    pub fn trigger(&self, plan_id: Uuid, plan: Plan) {
        let orchestrator = self.clone();
        tokio::spawn(async move {
            orchestrator.run_pass(plan_id, &plan).await;
        });
    }

    /// Run one full aggregation pass.
    ///
    /// At most one pass per plan runs at a time; a concurrent trigger for
    /// the same plan returns an empty summary without fetching anything.
    pub async fn run_pass(&self, plan_id: Uuid, plan: &Plan) -> PassSummary {
        {
            let mut active = self.active_plans.write().await;
            if !active.insert(plan_id) {
                tracing::info!(plan_id = %plan_id, "Aggregation pass already in flight, skipping");
                return PassSummary {
                    units: 0,
                    records_written: 0,
                    store_failures: 0,
                };
            }
        }

        let start_time = Instant::now();
        let unit_count = plan.days.len() * Source::ALL.len();

        tracing::info!(
            plan_id = %plan_id,
            topic = %plan.topic,
            days = plan.days.len(),
            units = unit_count,
            "Starting resource aggregation pass"
        );

        // Owned (day, source) pairs; the unit stream must not borrow `plan`.
        let units: Vec<(PlanDay, Source)> = plan
            .days
            .iter()
            .flat_map(|day| {
                Source::ALL
                    .iter()
                    .copied()
                    .map(move |source| (day.clone(), source))
            })
            .collect();

        let outcomes: Vec<UnitOutcome> = stream::iter(units)
            .map(|(day, source)| {
                let fetcher = self.fetcher.clone();
                let store = self.store.clone();
                let topic = plan.topic.clone();

                async move {
                    let curated = aggregate_day_source(&fetcher, &topic, &day, source).await;

                    if curated.is_empty() {
                        tracing::debug!(
                            plan_id = %plan_id,
                            day = day.day_number,
                            source = %source,
                            "No real results for unit, nothing persisted"
                        );
                        return UnitOutcome::Empty;
                    }

                    match store.put(plan_id, day.day_number, source, &curated).await {
                        Ok(_) => {
                            tracing::debug!(
                                plan_id = %plan_id,
                                day = day.day_number,
                                source = %source,
                                items = curated.len(),
                                "Persisted resource record"
                            );
                            UnitOutcome::Written
                        }
                        Err(e) => {
                            tracing::error!(
                                plan_id = %plan_id,
                                day = day.day_number,
                                source = %source,
                                error = %e,
                                "Failed to persist resource record"
                            );
                            UnitOutcome::StoreFailed
                        }
                    }
                }
            })
            .buffer_unordered(self.parallelism)
            .collect()
            .await;

        self.active_plans.write().await.remove(&plan_id);

        let records_written = outcomes
            .iter()
            .filter(|o| matches!(o, UnitOutcome::Written))
            .count();
        let store_failures = outcomes
            .iter()
            .filter(|o| matches!(o, UnitOutcome::StoreFailed))
            .count();

        tracing::info!(
            plan_id = %plan_id,
            units = unit_count,
            records_written,
            store_failures,
            duration_seconds = start_time.elapsed().as_secs(),
            "Resource aggregation pass completed"
        );

        PassSummary {
            units: unit_count,
            records_written,
            store_failures,
        }
    }
}
