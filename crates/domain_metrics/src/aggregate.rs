//! Snapshot aggregation: the one canonical metrics path
//!
//! Every endpoint variant (overview, per-client, per-fund, per-account,
//! filtered) goes through [`SnapshotAggregator`] with different criteria and
//! dimensions rather than re-deriving its own aggregation.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use core_kernel::DateRange;
use rust_decimal::Decimal;

use crate::criteria::Dimension;
use crate::dates::ResolvedDates;
use crate::model::{ChartData, EntityMetric, KpiMetrics};
use crate::paginate::sort_key;
use crate::ports::{FactStore, KpiCounts, StoreError};
use crate::predicate::Predicate;

/// Days covered by the recent history chart
pub const RECENT_WINDOW_DAYS: i64 = 90;

/// Days covered by the long-term history chart (three years)
pub const LONG_TERM_WINDOW_DAYS: i64 = 1095;

/// Days back for the KPI comparison balance
pub const KPI_COMPARISON_DAYS: i64 = 30;

/// Percentage change of `current` against an optional baseline.
///
/// `None` baseline means no comparison is possible and yields `None`; a
/// baseline of exactly zero yields `Some(0)` by convention. The two cases
/// stay distinguishable in every response.
pub fn change_pct(current: Decimal, baseline: Option<Decimal>) -> Option<Decimal> {
    match baseline {
        None => None,
        Some(baseline) if baseline.is_zero() => Some(Decimal::ZERO),
        Some(baseline) => Some((current - baseline) / baseline * Decimal::ONE_HUNDRED),
    }
}

/// Computes per-entity metrics, KPIs, and history series against a fact store
pub struct SnapshotAggregator<'a> {
    facts: &'a dyn FactStore,
}

impl<'a> SnapshotAggregator<'a> {
    pub fn new(facts: &'a dyn FactStore) -> Self {
        Self { facts }
    }

    /// Entity metrics for one dimension.
    ///
    /// Current balances and both baselines are read under the same effective
    /// predicate; baselines are joined to current by entity key, so an entity
    /// with a current balance but no baseline reports `None` changes. The
    /// account dimension drops entities whose current total is exactly zero
    /// (a zero-balance account is not held as of the reference date); client
    /// and fund dimensions keep them.
    pub async fn dimension_metrics(
        &self,
        dimension: Dimension,
        predicate: &Predicate,
        dates: &ResolvedDates,
    ) -> Result<Vec<EntityMetric>, StoreError> {
        let current = match dates.current {
            Some(date) => self.facts.balances_at(dimension, predicate, date).await?,
            None => Vec::new(),
        };
        let qtd = self
            .baseline_totals(dimension, predicate, dates.qtd_baseline)
            .await?;
        let ytd = self
            .baseline_totals(dimension, predicate, dates.ytd_baseline)
            .await?;

        let mut metrics: Vec<EntityMetric> = current
            .into_iter()
            .filter(|row| dimension != Dimension::Account || !row.balance.is_zero())
            .map(|row| {
                let qtd_change_pct = change_pct(row.balance, qtd.get(&row.key).copied());
                let ytd_change_pct = change_pct(row.balance, ytd.get(&row.key).copied());
                EntityMetric {
                    entity_id: row.key,
                    label: row.label,
                    total_balance: row.balance,
                    qtd_change_pct,
                    ytd_change_pct,
                }
            })
            .collect();

        metrics.sort_by(|a, b| sort_key(dimension, a).cmp(&sort_key(dimension, b)));
        Ok(metrics)
    }

    async fn baseline_totals(
        &self,
        dimension: Dimension,
        predicate: &Predicate,
        date: Option<NaiveDate>,
    ) -> Result<HashMap<String, Decimal>, StoreError> {
        let Some(date) = date else {
            return Ok(HashMap::new());
        };
        let balances = self.facts.balances_at(dimension, predicate, date).await?;
        Ok(balances
            .into_iter()
            .map(|row| (row.key, row.balance))
            .collect())
    }

    /// System-wide KPIs under the full intersection predicate.
    ///
    /// The 30-day comparison date is itself resolved latest-available; when
    /// nothing resolves there the change is `None`, not zero.
    pub async fn kpis(
        &self,
        predicate: &Predicate,
        dates: &ResolvedDates,
    ) -> Result<KpiMetrics, StoreError> {
        let current = match dates.current {
            Some(date) => self.facts.kpi_counts(predicate, date).await?,
            None => KpiCounts::default(),
        };

        let comparison_date = self
            .facts
            .resolve_snapshot(dates.reference - Duration::days(KPI_COMPARISON_DAYS))
            .await?;
        let total_aum_30d_ago = match comparison_date {
            Some(date) => Some(self.facts.kpi_counts(predicate, date).await?.total_balance),
            None => None,
        };

        Ok(KpiMetrics {
            active_clients: current.clients,
            active_funds: current.funds,
            active_accounts: current.accounts,
            total_aum: current.total_balance,
            total_aum_30d_ago,
            change_30d_pct: change_pct(current.total_balance, total_aum_30d_ago),
        })
    }

    /// The 90-day and 3-year history series ending at the reference date
    pub async fn charts(
        &self,
        predicate: &Predicate,
        dates: &ResolvedDates,
    ) -> Result<ChartData, StoreError> {
        let recent_history = self
            .facts
            .history(
                predicate,
                DateRange::trailing_days(dates.reference, RECENT_WINDOW_DAYS),
            )
            .await?;
        let long_term_history = self
            .facts
            .history(
                predicate,
                DateRange::trailing_days(dates.reference, LONG_TERM_WINDOW_DAYS),
            )
            .await?;
        Ok(ChartData {
            recent_history,
            long_term_history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_change_pct_missing_baseline_is_none() {
        assert_eq!(change_pct(dec!(150), None), None);
    }

    #[test]
    fn test_change_pct_zero_baseline_is_zero() {
        assert_eq!(change_pct(dec!(150), Some(dec!(0))), Some(Decimal::ZERO));
    }

    #[test]
    fn test_change_pct_regular() {
        assert_eq!(change_pct(dec!(150), Some(dec!(100))), Some(dec!(50)));
        assert_eq!(change_pct(dec!(75), Some(dec!(100))), Some(dec!(-25)));
    }

    #[test]
    fn test_change_pct_equal_is_zero_not_none() {
        // A baseline equal to current is a degenerate but valid comparison
        assert_eq!(change_pct(dec!(150), Some(dec!(150))), Some(Decimal::ZERO));
    }
}
