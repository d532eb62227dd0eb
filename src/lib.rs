//! studymap-ra library interface
//!
//! Exposes public APIs for integration testing

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod lookup;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};

use crate::db::resources::ResourceStore;
use crate::services::{ImmediateResourceService, ResourceOrchestrator};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Persisted resource records
    pub store: ResourceStore,
    /// Background aggregation passes
    pub orchestrator: ResourceOrchestrator,
    /// Synchronous fast path for fresh plans
    pub immediate: ImmediateResourceService,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        store: ResourceStore,
        orchestrator: ResourceOrchestrator,
        immediate: ImmediateResourceService,
    ) -> Self {
        Self {
            store,
            orchestrator,
            immediate,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::resource_routes())
        .with_state(state)
}
