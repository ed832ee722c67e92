//! Dashboard service: request-scoped orchestration
//!
//! One service instance is shared across requests behind `Arc`ed ports; it
//! holds no mutable state, so concurrent requests need no coordination. Each
//! request flows gateway → composer → resolver → aggregator → paginator and
//! either fully succeeds or fails as a whole.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::aggregate::SnapshotAggregator;
use crate::cache::CacheGateway;
use crate::criteria::{Dimension, FilterCriteria};
use crate::dates::{DateResolver, ResolvedDates};
use crate::error::MetricsError;
use crate::export;
use crate::model::{
    CacheSnapshot, Dashboard, DashboardMeta, DownloadRow, PaginationInfo, Provenance,
};
use crate::paginate::{paginate, DimensionCursors};
use crate::ports::{CacheStore, FactStore};
use crate::predicate::{full_predicate, predicate_for, Predicate};

/// A fully-typed dashboard request
#[derive(Debug, Clone, Default)]
pub struct DashboardRequest {
    pub criteria: FilterCriteria,
    /// Explicit reference date; defaults to the latest fact date
    pub date: Option<NaiveDate>,
    /// When present, every dimension list is paginated to this size
    pub page_size: Option<usize>,
    pub cursors: DimensionCursors,
}

/// The metrics engine facade used by every endpoint variant
#[derive(Clone)]
pub struct DashboardService {
    facts: Arc<dyn FactStore>,
    cache: Arc<dyn CacheStore>,
    export_row_ceiling: u64,
}

impl DashboardService {
    pub fn new(facts: Arc<dyn FactStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            facts,
            cache,
            export_row_ceiling: export::DEFAULT_ROW_CEILING,
        }
    }

    /// Overrides the export row ceiling (default 1,000,000)
    pub fn with_export_row_ceiling(mut self, ceiling: u64) -> Self {
        self.export_row_ceiling = ceiling;
        self
    }

    pub fn export_row_ceiling(&self) -> u64 {
        self.export_row_ceiling
    }

    /// Verifies the fact store is reachable (readiness probes)
    pub async fn ping(&self) -> Result<(), MetricsError> {
        self.facts.latest_fact_date().await?;
        Ok(())
    }

    /// Computes the dashboard for a request, serving the materialized
    /// snapshot when the criteria qualify and one exists for the resolved
    /// date, and falling back to live aggregation otherwise.
    pub async fn dashboard(&self, request: &DashboardRequest) -> Result<Dashboard, MetricsError> {
        if let Some(page_size) = request.page_size {
            if page_size == 0 {
                return Err(MetricsError::invalid_parameter("page_size", "0"));
            }
        }

        let resolver = DateResolver::new(self.facts.as_ref());
        let Some(dates) = resolver.resolve_request(request.date).await? else {
            tracing::debug!("no facts loaded, returning empty dashboard");
            return Ok(Dashboard::empty());
        };

        if CacheGateway::should_use_cache(&request.criteria, &request.cursors) {
            if let Some(as_of) = dates.current {
                let gateway = CacheGateway::new(self.cache.as_ref());
                if let Some(snapshot) = gateway.lookup(as_of).await {
                    tracing::debug!(%as_of, "serving dashboard from materialized snapshot");
                    return Ok(Self::from_snapshot(snapshot, &dates, request.page_size));
                }
            }
        }

        self.live_dashboard(request, &dates).await
    }

    fn from_snapshot(
        snapshot: CacheSnapshot,
        dates: &ResolvedDates,
        page_size: Option<usize>,
    ) -> Dashboard {
        let mut dashboard = Dashboard {
            metadata: DashboardMeta {
                reference_date: Some(dates.reference),
                as_of_date: Some(snapshot.as_of_date),
                provenance: Provenance::Cached {
                    materialized_at: snapshot.materialized_at,
                },
            },
            client_balances: snapshot.client_balances,
            fund_balances: snapshot.fund_balances,
            account_details: snapshot.account_details,
            charts: snapshot.charts,
            kpi_metrics: snapshot.kpi_metrics,
            pagination: None,
        };
        if let Some(page_size) = page_size {
            Self::apply_pagination(&mut dashboard, page_size, &DimensionCursors::default());
        }
        dashboard
    }

    async fn live_dashboard(
        &self,
        request: &DashboardRequest,
        dates: &ResolvedDates,
    ) -> Result<Dashboard, MetricsError> {
        let aggregator = SnapshotAggregator::new(self.facts.as_ref());
        let criteria = &request.criteria;

        let client_balances = aggregator
            .dimension_metrics(
                Dimension::Client,
                &predicate_for(criteria, Dimension::Client),
                dates,
            )
            .await?;
        let fund_balances = aggregator
            .dimension_metrics(
                Dimension::Fund,
                &predicate_for(criteria, Dimension::Fund),
                dates,
            )
            .await?;
        let account_details = aggregator
            .dimension_metrics(
                Dimension::Account,
                &predicate_for(criteria, Dimension::Account),
                dates,
            )
            .await?;

        let full = full_predicate(criteria);
        let kpi_metrics = aggregator.kpis(&full, dates).await?;
        let charts = aggregator.charts(&full, dates).await?;

        let mut dashboard = Dashboard {
            metadata: DashboardMeta {
                reference_date: Some(dates.reference),
                as_of_date: dates.current,
                provenance: Provenance::Live,
            },
            client_balances,
            fund_balances,
            account_details,
            charts,
            kpi_metrics,
            pagination: None,
        };

        if let Some(page_size) = request.page_size {
            Self::apply_pagination(&mut dashboard, page_size, &request.cursors);
        }
        Ok(dashboard)
    }

    fn apply_pagination(dashboard: &mut Dashboard, page_size: usize, cursors: &DimensionCursors) {
        let client = paginate(
            Dimension::Client,
            std::mem::take(&mut dashboard.client_balances),
            page_size,
            cursors.for_dimension(Dimension::Client),
        );
        let fund = paginate(
            Dimension::Fund,
            std::mem::take(&mut dashboard.fund_balances),
            page_size,
            cursors.for_dimension(Dimension::Fund),
        );
        let account = paginate(
            Dimension::Account,
            std::mem::take(&mut dashboard.account_details),
            page_size,
            cursors.for_dimension(Dimension::Account),
        );

        dashboard.client_balances = client.items;
        dashboard.fund_balances = fund.items;
        dashboard.account_details = account.items;
        dashboard.pagination = Some(PaginationInfo {
            page_size,
            client: client.info,
            fund: fund.info,
            account: account.info,
        });
    }

    /// Builds the unfiltered whole-dataset snapshot the warming job
    /// materializes for a date (default: the latest fact date).
    ///
    /// This is the same aggregation the live path runs with empty criteria;
    /// the request engine never writes the result anywhere. `Ok(None)` means
    /// no snapshot is resolvable for the date.
    pub async fn build_cache_snapshot(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<Option<CacheSnapshot>, MetricsError> {
        let resolver = DateResolver::new(self.facts.as_ref());
        let Some(dates) = resolver.resolve_request(date).await? else {
            return Ok(None);
        };
        let Some(as_of) = dates.current else {
            return Ok(None);
        };

        let aggregator = SnapshotAggregator::new(self.facts.as_ref());
        let universal = Predicate::universal();

        let client_balances = aggregator
            .dimension_metrics(Dimension::Client, &universal, &dates)
            .await?;
        let fund_balances = aggregator
            .dimension_metrics(Dimension::Fund, &universal, &dates)
            .await?;
        let account_details = aggregator
            .dimension_metrics(Dimension::Account, &universal, &dates)
            .await?;
        let kpi_metrics = aggregator.kpis(&universal, &dates).await?;
        let charts = aggregator.charts(&universal, &dates).await?;

        Ok(Some(CacheSnapshot {
            as_of_date: as_of,
            materialized_at: Utc::now(),
            client_balances,
            fund_balances,
            account_details,
            kpi_metrics,
            charts,
        }))
    }

    /// Projected export size for the criteria at the resolved date.
    ///
    /// Requires at least one non-empty filter; an unfiltered count would
    /// always be the whole store.
    pub async fn export_row_count(
        &self,
        criteria: &FilterCriteria,
        date: Option<NaiveDate>,
    ) -> Result<u64, MetricsError> {
        if criteria.is_unfiltered() {
            return Err(MetricsError::NoFilterSupplied);
        }
        self.count_rows(criteria, date).await
    }

    async fn count_rows(
        &self,
        criteria: &FilterCriteria,
        date: Option<NaiveDate>,
    ) -> Result<u64, MetricsError> {
        let resolver = DateResolver::new(self.facts.as_ref());
        let Some(dates) = resolver.resolve_request(date).await? else {
            return Ok(0);
        };
        let Some(as_of) = dates.current else {
            return Ok(0);
        };
        let predicate = full_predicate(criteria);
        Ok(self.facts.fact_row_count(&predicate, as_of).await?)
    }

    /// Generates export rows at the resolved as-of date.
    ///
    /// The projected row count is checked against the ceiling before any row
    /// is materialized.
    pub async fn export_rows(
        &self,
        criteria: &FilterCriteria,
        date: Option<NaiveDate>,
    ) -> Result<Vec<DownloadRow>, MetricsError> {
        let resolver = DateResolver::new(self.facts.as_ref());
        let Some(dates) = resolver.resolve_request(date).await? else {
            return Ok(Vec::new());
        };
        let Some(as_of) = dates.current else {
            return Ok(Vec::new());
        };

        let predicate = full_predicate(criteria);
        let projected = self.facts.fact_row_count(&predicate, as_of).await?;
        if projected > self.export_row_ceiling {
            return Err(MetricsError::DownloadTooLarge {
                rows: projected,
                ceiling: self.export_row_ceiling,
            });
        }

        let current = self.facts.fact_rows(&predicate, as_of).await?;
        let qtd = match dates.qtd_baseline {
            Some(date) => self.facts.fact_rows(&predicate, date).await?,
            None => Vec::new(),
        };
        let ytd = match dates.ytd_baseline {
            Some(date) => self.facts.fact_rows(&predicate, date).await?,
            None => Vec::new(),
        };

        Ok(export::build_rows(current, qtd, ytd))
    }
}
