//! Dashboard request/response DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use domain_metrics::model::{ChartData, KpiMetrics, PaginationInfo};
use domain_metrics::paginate::DimensionCursors;
use domain_metrics::{
    Dashboard, DashboardRequest, EntityMetric, FilterCriteria, MetricsError, Provenance,
};

use super::{
    parse_date_param, parse_id_set, parse_page_size, parse_selection_source, pattern,
};

/// Raw dashboard query parameters
///
/// List parameters are comma-separated; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub client_ids: Option<String>,
    pub fund_names: Option<String>,
    pub account_ids: Option<String>,
    /// Substring filter on client names
    pub client_name: Option<String>,
    /// Substring filter on fund names or tickers
    pub fund_text: Option<String>,
    /// Substring filter on account identifiers
    pub account_number: Option<String>,
    pub selection_source: Option<String>,
    pub date: Option<String>,
    pub page_size: Option<String>,
    pub client_cursor: Option<String>,
    pub fund_cursor: Option<String>,
    pub account_cursor: Option<String>,
}

impl DashboardQuery {
    /// Validates and converts into a typed engine request
    pub fn into_request(self) -> Result<DashboardRequest, MetricsError> {
        let criteria = FilterCriteria {
            client_ids: parse_id_set(&self.client_ids, "client_ids")?,
            fund_names: parse_id_set(&self.fund_names, "fund_names")?,
            account_ids: parse_id_set(&self.account_ids, "account_ids")?,
            client_name_pattern: pattern(self.client_name),
            fund_text_pattern: pattern(self.fund_text),
            account_id_pattern: pattern(self.account_number),
            selection_source: parse_selection_source(&self.selection_source)?,
        };

        Ok(DashboardRequest {
            criteria,
            date: parse_date_param(&self.date, "date")?,
            page_size: parse_page_size(&self.page_size)?,
            cursors: DimensionCursors {
                client: self.client_cursor,
                fund: self.fund_cursor,
                account: self.account_cursor,
            },
        })
    }
}

/// Response metadata
#[derive(Debug, Serialize)]
pub struct MetadataDto {
    pub reference_date: Option<NaiveDate>,
    pub as_of_date: Option<NaiveDate>,
    pub source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materialized_at: Option<DateTime<Utc>>,
}

/// One client row
#[derive(Debug, Serialize)]
pub struct ClientBalanceDto {
    pub client_id: String,
    pub client_name: String,
    pub total_balance: Decimal,
    pub qtd_change_pct: Option<Decimal>,
    pub ytd_change_pct: Option<Decimal>,
}

/// One fund row
#[derive(Debug, Serialize)]
pub struct FundBalanceDto {
    pub fund_name: String,
    pub fund_ticker: Option<String>,
    pub total_balance: Decimal,
    pub qtd_change_pct: Option<Decimal>,
    pub ytd_change_pct: Option<Decimal>,
}

/// One account row
#[derive(Debug, Serialize)]
pub struct AccountDetailDto {
    pub account_id: String,
    pub client_name: String,
    pub balance: Decimal,
    pub qtd_change_pct: Option<Decimal>,
    pub ytd_change_pct: Option<Decimal>,
}

/// The assembled dashboard response
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub metadata: MetadataDto,
    pub client_balances: Vec<ClientBalanceDto>,
    pub fund_balances: Vec<FundBalanceDto>,
    pub account_details: Vec<AccountDetailDto>,
    pub charts: ChartData,
    pub kpi_metrics: KpiMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInfo>,
}

fn client_dto(metric: EntityMetric) -> ClientBalanceDto {
    ClientBalanceDto {
        client_id: metric.entity_id,
        client_name: metric.label.unwrap_or_default(),
        total_balance: metric.total_balance,
        qtd_change_pct: metric.qtd_change_pct,
        ytd_change_pct: metric.ytd_change_pct,
    }
}

fn fund_dto(metric: EntityMetric) -> FundBalanceDto {
    FundBalanceDto {
        fund_name: metric.entity_id,
        fund_ticker: metric.label,
        total_balance: metric.total_balance,
        qtd_change_pct: metric.qtd_change_pct,
        ytd_change_pct: metric.ytd_change_pct,
    }
}

fn account_dto(metric: EntityMetric) -> AccountDetailDto {
    AccountDetailDto {
        account_id: metric.entity_id,
        client_name: metric.label.unwrap_or_default(),
        balance: metric.total_balance,
        qtd_change_pct: metric.qtd_change_pct,
        ytd_change_pct: metric.ytd_change_pct,
    }
}

impl From<Dashboard> for DashboardResponse {
    fn from(dashboard: Dashboard) -> Self {
        let (source, materialized_at) = match dashboard.metadata.provenance {
            Provenance::Live => ("live", None),
            Provenance::Cached { materialized_at } => ("cached", Some(materialized_at)),
        };
        Self {
            metadata: MetadataDto {
                reference_date: dashboard.metadata.reference_date,
                as_of_date: dashboard.metadata.as_of_date,
                source,
                materialized_at,
            },
            client_balances: dashboard.client_balances.into_iter().map(client_dto).collect(),
            fund_balances: dashboard.fund_balances.into_iter().map(fund_dto).collect(),
            account_details: dashboard.account_details.into_iter().map(account_dto).collect(),
            charts: dashboard.charts,
            kpi_metrics: dashboard.kpi_metrics,
            pagination: dashboard.pagination,
        }
    }
}
