//! Resource aggregation API handlers
//!
//! POST /plans/:plan_id/resources/aggregate, GET /plans/:plan_id/resources

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::resources::GroupedResources,
    error::{ApiError, ApiResult},
    models::{Plan, Source},
    AppState,
};

/// POST /plans/:plan_id/resources/aggregate response
#[derive(Debug, Serialize)]
pub struct AggregateResponse {
    pub plan_id: Uuid,
    pub status: String,
    /// (day, source) units the pass will work through
    pub units: usize,
}

/// Query parameters for GET /plans/:plan_id/resources
#[derive(Debug, Deserialize, Default)]
pub struct ResourceQuery {
    /// Plan topic, used for the immediate fast path when nothing is stored
    pub topic: Option<String>,
    /// Plan duration in days, same purpose
    pub duration: Option<u32>,
}

/// GET /plans/:plan_id/resources response
#[derive(Debug, Serialize)]
pub struct ResourcesResponse {
    pub plan_id: Uuid,
    /// Where the items came from: "stored", "immediate", or "none"
    pub origin: String,
    /// day number -> source name -> items
    pub days: GroupedResources,
}

/// POST /plans/:plan_id/resources/aggregate
///
/// Validate the submitted plan and start a background aggregation pass.
/// Returns 202 Accepted; 409 Conflict if a pass for this plan is running.
pub async fn trigger_aggregation(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Json(plan): Json<Plan>,
) -> ApiResult<(StatusCode, Json<AggregateResponse>)> {
    plan.validate().map_err(ApiError::BadRequest)?;

    if state.orchestrator.is_active(plan_id).await {
        return Err(ApiError::Conflict(format!(
            "Aggregation already running for plan {}",
            plan_id
        )));
    }

    let units = plan.days.len() * Source::ALL.len();

    tracing::info!(
        plan_id = %plan_id,
        topic = %plan.topic,
        units = units,
        "Aggregation requested"
    );

    state.orchestrator.trigger(plan_id, plan);

    Ok((
        StatusCode::ACCEPTED,
        Json(AggregateResponse {
            plan_id,
            status: "started".to_string(),
            units,
        }),
    ))
}

/// GET /plans/:plan_id/resources
///
/// Return persisted resources grouped day -> source -> items. When nothing
/// is stored yet and `topic` + `duration` are supplied, serve the immediate
/// fast path and re-trigger a background pass for the full plan.
pub async fn get_resources(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Query(query): Query<ResourceQuery>,
) -> ApiResult<Json<ResourcesResponse>> {
    let stored = state.store.grouped(plan_id).await?;
    if !stored.is_empty() {
        return Ok(Json(ResourcesResponse {
            plan_id,
            origin: "stored".to_string(),
            days: stored,
        }));
    }

    let topic = query.topic.as_deref().unwrap_or("").trim().to_string();
    let duration = query.duration.unwrap_or(0);
    if topic.is_empty() || duration == 0 {
        return Ok(Json(ResourcesResponse {
            plan_id,
            origin: "none".to_string(),
            days: BTreeMap::new(),
        }));
    }

    let days = state.immediate.get(&topic, duration).await;

    // Kick the full pass off in the background so later reads hit storage.
    state
        .orchestrator
        .trigger(plan_id, Plan::skeleton(&topic, duration));

    Ok(Json(ResourcesResponse {
        plan_id,
        origin: "immediate".to_string(),
        days,
    }))
}

/// Build resource routes
pub fn resource_routes() -> Router<AppState> {
    Router::new()
        .route("/plans/:plan_id/resources/aggregate", post(trigger_aggregation))
        .route("/plans/:plan_id/resources", get(get_resources))
}
