//! Resource record persistence
//!
//! Records are append-only: every write inserts a new row and readers
//! resolve duplicates per (day, source) by taking the most recently written
//! one. Deletion belongs to the plan owner, not this service.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{CandidateItem, ResourceRecord, Source};

/// Grouped view of a plan's resources: day -> source -> items.
pub type GroupedResources = BTreeMap<u32, BTreeMap<String, Vec<CandidateItem>>>;

/// Storage for curated resource records, injected into the orchestrator.
#[derive(Clone)]
pub struct ResourceStore {
    pool: SqlitePool,
}

impl ResourceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert one curated record. Returns the new row id.
    pub async fn put(
        &self,
        plan_id: Uuid,
        day_number: u32,
        source: Source,
        items: &[CandidateItem],
    ) -> Result<i64> {
        let items_json =
            serde_json::to_string(items).context("Failed to serialize resource items")?;
        let created_at = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO resource_records (plan_id, day_number, source, items, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(plan_id.to_string())
        .bind(day_number as i64)
        .bind(source.as_str())
        .bind(&items_json)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// All records for a plan, oldest first.
    pub async fn list(&self, plan_id: Uuid) -> Result<Vec<ResourceRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, plan_id, day_number, source, items, created_at
            FROM resource_records
            WHERE plan_id = ?
            ORDER BY id
            "#,
        )
        .bind(plan_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(record_from_row).collect()
    }

    /// Latest record per (day, source), grouped for presentation.
    pub async fn grouped(&self, plan_id: Uuid) -> Result<GroupedResources> {
        let records = self.list(plan_id).await?;

        let mut grouped = GroupedResources::new();
        for record in records {
            // Records arrive oldest first, so a later insert for the same
            // (day, source) replaces the earlier one.
            grouped
                .entry(record.day_number)
                .or_default()
                .insert(record.source.as_str().to_string(), record.items);
        }

        Ok(grouped)
    }

    /// Whether any record exists for this plan.
    pub async fn has_any(&self, plan_id: Uuid) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM resource_records WHERE plan_id = ?")
                .bind(plan_id.to_string())
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }
}

fn record_from_row(row: sqlx::sqlite::SqliteRow) -> Result<ResourceRecord> {
    let plan_id_str: String = row.get("plan_id");
    let plan_id = Uuid::parse_str(&plan_id_str).context("Failed to parse plan_id")?;

    let source_str: String = row.get("source");
    let source: Source = source_str
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let items_json: String = row.get("items");
    let items: Vec<CandidateItem> =
        serde_json::from_str(&items_json).context("Failed to deserialize resource items")?;

    let created_at_str: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .context("Failed to parse created_at")?
        .with_timezone(&Utc);

    Ok(ResourceRecord {
        id: row.get("id"),
        plan_id,
        day_number: row.get::<i64, _>("day_number") as u32,
        source,
        items,
        created_at,
    })
}
