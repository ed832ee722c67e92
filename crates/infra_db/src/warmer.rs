//! Offline cache warming job
//!
//! Runs after nightly data loads: computes the unfiltered whole-dataset
//! snapshot through the same aggregation path requests use, then replaces
//! that date's cache wholesale. The request engine never writes the cache;
//! this job is the only writer.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use domain_metrics::ports::CacheStore;
use domain_metrics::{DashboardService, MetricsError};

/// Counts reported after a completed warm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmSummary {
    pub as_of_date: NaiveDate,
    pub clients: usize,
    pub funds: usize,
    pub accounts: usize,
    pub chart_points: usize,
}

/// Materializes dashboard snapshots into the cache store
pub struct CacheWarmer {
    service: DashboardService,
    cache: Arc<dyn CacheStore>,
}

impl CacheWarmer {
    pub fn new(service: DashboardService, cache: Arc<dyn CacheStore>) -> Self {
        Self { service, cache }
    }

    /// Warms the snapshot for `date` (default: the latest fact date).
    ///
    /// Returns `Ok(None)` when no snapshot is resolvable for the date, e.g.
    /// an empty fact store. Concurrent warms for different dates are safe;
    /// the per-date replace itself is atomic.
    pub async fn warm(&self, date: Option<NaiveDate>) -> Result<Option<WarmSummary>, MetricsError> {
        let Some(snapshot) = self.service.build_cache_snapshot(date).await? else {
            info!("no facts to materialize, skipping cache warm");
            return Ok(None);
        };

        self.cache.replace(&snapshot).await?;

        let summary = WarmSummary {
            as_of_date: snapshot.as_of_date,
            clients: snapshot.client_balances.len(),
            funds: snapshot.fund_balances.len(),
            accounts: snapshot.account_details.len(),
            chart_points: snapshot.charts.recent_history.len()
                + snapshot.charts.long_term_history.len(),
        };
        info!(
            as_of_date = %summary.as_of_date,
            clients = summary.clients,
            funds = summary.funds,
            accounts = summary.accounts,
            chart_points = summary.chart_points,
            "cache warm complete"
        );
        Ok(Some(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures::{date, sample_market};
    use test_utils::{MemoryCacheStore, MemoryFactStore};

    fn warmer(
        store: MemoryFactStore,
        cache: Arc<MemoryCacheStore>,
    ) -> (CacheWarmer, DashboardService) {
        let service = DashboardService::new(Arc::new(store), cache.clone());
        (CacheWarmer::new(service.clone(), cache), service)
    }

    #[tokio::test]
    async fn test_warm_materializes_latest_date() {
        let cache = Arc::new(MemoryCacheStore::new());
        let (warmer, _service) = warmer(sample_market().build(), cache.clone());

        let summary = warmer.warm(None).await.unwrap().unwrap();
        assert_eq!(summary.as_of_date, date(2024, 4, 10));
        assert_eq!(summary.clients, 2);
        assert_eq!(summary.funds, 3);
        // ACC4 is zero-balance at the reference date and excluded
        assert_eq!(summary.accounts, 3);
        assert!(cache.contains(summary.as_of_date));
    }

    #[tokio::test]
    async fn test_warm_is_idempotent_per_date() {
        let cache = Arc::new(MemoryCacheStore::new());
        let (warmer, _service) = warmer(sample_market().build(), cache.clone());

        let first = warmer.warm(None).await.unwrap().unwrap();
        let second = warmer.warm(None).await.unwrap().unwrap();
        assert_eq!(first.as_of_date, second.as_of_date);
        assert_eq!(first.clients, second.clients);
    }

    #[tokio::test]
    async fn test_warm_empty_store_skips() {
        let cache = Arc::new(MemoryCacheStore::new());
        let (warmer, _service) = warmer(MemoryFactStore::empty(), cache);
        assert!(warmer.warm(None).await.unwrap().is_none());
    }
}
