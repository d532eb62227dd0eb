//! Service modules for the resource aggregation pipeline
//!
//! One module per pipeline stage, in data-flow order: query synthesis,
//! per-source optimization, bounded-time fetching, curation, and the two
//! drivers (background orchestrator, synchronous fast path).

pub mod day_aggregator;
pub mod fallback;
pub mod immediate;
pub mod query_optimizer;
pub mod query_synthesizer;
pub mod resource_orchestrator;
pub mod source_fetcher;

pub use day_aggregator::{aggregate_day_source, curate, RESULT_BUDGET};
pub use fallback::{fallback_item, FALLBACK_TYPE};
pub use immediate::{
    ImmediateResourceService, ImmediateResources, IMMEDIATE_CACHE_TTL, IMMEDIATE_DAY_LIMIT,
    IMMEDIATE_FETCH_TIMEOUT,
};
pub use query_optimizer::{optimize_for_source, MAX_QUERIES_PER_SOURCE};
pub use query_synthesizer::{synthesize_queries, MAX_QUERIES_PER_DAY};
pub use resource_orchestrator::{PassSummary, ResourceOrchestrator, UNIT_PARALLELISM};
pub use source_fetcher::{SourceFetcher, FETCH_TIMEOUT};
