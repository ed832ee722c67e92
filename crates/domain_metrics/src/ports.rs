//! Ports consumed by the metrics engine
//!
//! The engine is written against these traits; `infra_db` provides the
//! PostgreSQL adapters and `test_utils` provides in-memory fakes. Both must
//! be read-only from the engine's perspective and deterministic for a fixed
//! store state.

use async_trait::async_trait;
use chrono::NaiveDate;
use core_kernel::DateRange;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::criteria::Dimension;
use crate::model::{CacheSnapshot, FactRow, HistoryPoint};
use crate::predicate::Predicate;

/// Error type for port operations
///
/// The engine never retries store failures; they propagate to the boundary
/// as a generic failure. Cache failures are swallowed by the gateway.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying store could not be reached
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// A query failed to execute
    #[error("query failed: {message}")]
    QueryFailed { message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        StoreError::QueryFailed {
            message: message.into(),
        }
    }
}

/// One grouped balance returned by the fact store: the entity key for the
/// requested dimension, its display label where the dimension has one
/// (client name, fund ticker), and the summed balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityBalance {
    pub key: String,
    pub label: Option<String>,
    pub balance: Decimal,
}

/// Distinct-entity counts and the balance total for a snapshot date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KpiCounts {
    pub clients: u64,
    pub funds: u64,
    pub accounts: u64,
    pub total_balance: Decimal,
}

/// Read-only access to balance facts, the account-to-client mapping, and the
/// fund directory
#[async_trait]
pub trait FactStore: Send + Sync {
    /// The newest balance date in the store, if any facts exist
    async fn latest_fact_date(&self) -> Result<Option<NaiveDate>, StoreError>;

    /// The latest balance date at or before `on_or_before`, if any
    async fn resolve_snapshot(&self, on_or_before: NaiveDate)
        -> Result<Option<NaiveDate>, StoreError>;

    /// Balances at `date` matching `predicate`, summed per entity of
    /// `dimension`. Client and account groupings carry the client name as
    /// label; fund groupings carry the directory ticker.
    async fn balances_at(
        &self,
        dimension: Dimension,
        predicate: &Predicate,
        date: NaiveDate,
    ) -> Result<Vec<EntityBalance>, StoreError>;

    /// Distinct entity counts and total balance at `date` under `predicate`
    async fn kpi_counts(
        &self,
        predicate: &Predicate,
        date: NaiveDate,
    ) -> Result<KpiCounts, StoreError>;

    /// Per-date balance sums for every date in `range` that has at least one
    /// matching fact, ascending by date
    async fn history(
        &self,
        predicate: &Predicate,
        range: DateRange,
    ) -> Result<Vec<HistoryPoint>, StoreError>;

    /// The joined fact rows at `date` matching `predicate` (export path),
    /// ordered by account id then fund name
    async fn fact_rows(
        &self,
        predicate: &Predicate,
        date: NaiveDate,
    ) -> Result<Vec<FactRow>, StoreError>;

    /// The number of rows `fact_rows` would return, without materializing them
    async fn fact_row_count(
        &self,
        predicate: &Predicate,
        date: NaiveDate,
    ) -> Result<u64, StoreError>;
}

/// Read access to materialized dashboard snapshots
///
/// `replace` exists for the offline warming job only; the request engine
/// never writes. Replacement is atomic per date, so a concurrent reader sees
/// either the previous complete snapshot or the new one, never a partial.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, date: NaiveDate) -> Result<Option<CacheSnapshot>, StoreError>;

    async fn replace(&self, snapshot: &CacheSnapshot) -> Result<(), StoreError>;
}
