//! Snapshot cache adapter
//!
//! Materialized dashboard snapshots are stored one row per calendar date
//! with the full payload as `jsonb`. Replacement is a single upsert, so a
//! concurrent reader observes either the previous complete snapshot or the
//! new one, never a partial date. The row-level lock taken by the upsert is
//! what serializes two warmers racing on the same date; warmers for
//! different dates touch different rows and do not contend.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use domain_metrics::model::CacheSnapshot;
use domain_metrics::ports::{CacheStore, StoreError};

use crate::error::DatabaseError;

/// PostgreSQL-backed implementation of the engine's cache store port
#[derive(Debug, Clone)]
pub struct PgCacheStore {
    pool: PgPool,
}

impl PgCacheStore {
    /// Creates a new cache store over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheStore for PgCacheStore {
    async fn get(&self, date: NaiveDate) -> Result<Option<CacheSnapshot>, StoreError> {
        let payload: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT snapshot FROM dashboard_snapshots WHERE as_of_date = $1")
                .bind(date)
                .fetch_optional(&self.pool)
                .await
                .map_err(DatabaseError::from)?;

        match payload {
            Some(value) => {
                let snapshot = serde_json::from_value(value)
                    .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    async fn replace(&self, snapshot: &CacheSnapshot) -> Result<(), StoreError> {
        let payload = serde_json::to_value(snapshot)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        sqlx::query(
            "INSERT INTO dashboard_snapshots (as_of_date, materialized_at, snapshot) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (as_of_date) DO UPDATE \
             SET materialized_at = EXCLUDED.materialized_at, snapshot = EXCLUDED.snapshot",
        )
        .bind(snapshot.as_of_date)
        .bind(snapshot.materialized_at)
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }
}
