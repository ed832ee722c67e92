//! Fact store adapter
//!
//! Read-only access to balance facts, the account-to-client mapping, and the
//! fund directory. All queries are rendered from the request's typed
//! predicate; see [`crate::sql`].

use async_trait::async_trait;
use chrono::NaiveDate;
use core_kernel::{AccountId, ClientId, DateRange, FundName};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};

use domain_metrics::model::{FactRow, HistoryPoint};
use domain_metrics::ports::{EntityBalance, FactStore, KpiCounts, StoreError};
use domain_metrics::predicate::Predicate;
use domain_metrics::Dimension;

use crate::error::DatabaseError;
use crate::sql;

/// PostgreSQL-backed implementation of the engine's fact store port
#[derive(Debug, Clone)]
pub struct PgFactStore {
    pool: PgPool,
}

impl PgFactStore {
    /// Creates a new fact store over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FactStore for PgFactStore {
    async fn latest_fact_date(&self) -> Result<Option<NaiveDate>, StoreError> {
        let mut query = sql::snapshot_query(None);
        let date: Option<NaiveDate> = query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(date)
    }

    async fn resolve_snapshot(
        &self,
        on_or_before: NaiveDate,
    ) -> Result<Option<NaiveDate>, StoreError> {
        let mut query = sql::snapshot_query(Some(on_or_before));
        let date: Option<NaiveDate> = query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(date)
    }

    async fn balances_at(
        &self,
        dimension: Dimension,
        predicate: &Predicate,
        date: NaiveDate,
    ) -> Result<Vec<EntityBalance>, StoreError> {
        let mut query = sql::balances_query(dimension, predicate, date);
        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        let mut balances = Vec::with_capacity(rows.len());
        for row in rows {
            balances.push(EntityBalance {
                key: row.try_get("entity_key").map_err(DatabaseError::from)?,
                label: row.try_get("label").map_err(DatabaseError::from)?,
                balance: row.try_get("total").map_err(DatabaseError::from)?,
            });
        }
        Ok(balances)
    }

    async fn kpi_counts(
        &self,
        predicate: &Predicate,
        date: NaiveDate,
    ) -> Result<KpiCounts, StoreError> {
        let mut query = sql::kpi_query(predicate, date);
        let row = query
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        let clients: i64 = row.try_get("clients").map_err(DatabaseError::from)?;
        let funds: i64 = row.try_get("funds").map_err(DatabaseError::from)?;
        let accounts: i64 = row.try_get("accounts").map_err(DatabaseError::from)?;
        let total_balance: Decimal = row.try_get("total").map_err(DatabaseError::from)?;

        Ok(KpiCounts {
            clients: clients as u64,
            funds: funds as u64,
            accounts: accounts as u64,
            total_balance,
        })
    }

    async fn history(
        &self,
        predicate: &Predicate,
        range: DateRange,
    ) -> Result<Vec<HistoryPoint>, StoreError> {
        let mut query = sql::history_query(predicate, range);
        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        let mut points = Vec::with_capacity(rows.len());
        for row in rows {
            points.push(HistoryPoint {
                date: row.try_get("balance_date").map_err(DatabaseError::from)?,
                balance: row.try_get("total").map_err(DatabaseError::from)?,
            });
        }
        Ok(points)
    }

    async fn fact_rows(
        &self,
        predicate: &Predicate,
        date: NaiveDate,
    ) -> Result<Vec<FactRow>, StoreError> {
        let mut query = sql::fact_rows_query(predicate, date, false);
        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        let mut facts = Vec::with_capacity(rows.len());
        for row in rows {
            let account_id: String = row.try_get("account_id").map_err(DatabaseError::from)?;
            let client_id: String = row.try_get("client_id").map_err(DatabaseError::from)?;
            let fund_name: String = row.try_get("fund_name").map_err(DatabaseError::from)?;
            facts.push(FactRow {
                account_id: AccountId::new(account_id)
                    .map_err(|e| DatabaseError::corrupt("account_id", e))?,
                client_id: ClientId::new(client_id)
                    .map_err(|e| DatabaseError::corrupt("client_id", e))?,
                client_name: row.try_get("client_name").map_err(DatabaseError::from)?,
                fund_name: FundName::new(fund_name)
                    .map_err(|e| DatabaseError::corrupt("fund_name", e))?,
                fund_ticker: row.try_get("ticker").map_err(DatabaseError::from)?,
                balance_date: row.try_get("balance_date").map_err(DatabaseError::from)?,
                balance: row.try_get("balance").map_err(DatabaseError::from)?,
            });
        }
        Ok(facts)
    }

    async fn fact_row_count(
        &self,
        predicate: &Predicate,
        date: NaiveDate,
    ) -> Result<u64, StoreError> {
        let mut query = sql::fact_rows_query(predicate, date, true);
        let count: i64 = query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(count as u64)
    }
}
