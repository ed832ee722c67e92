//! Domain model for dashboard responses and cache snapshots

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{AccountId, ClientId, FundName};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A balance fact joined to its account's client link and fund directory
/// entry. This is the shape predicates are evaluated against and the unit of
/// the export path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactRow {
    pub account_id: AccountId,
    pub client_id: ClientId,
    pub client_name: String,
    pub fund_name: FundName,
    /// Directory ticker; funds without a directory entry still appear
    pub fund_ticker: Option<String>,
    pub balance_date: NaiveDate,
    pub balance: Decimal,
}

/// Per-entity aggregate for one rendered dimension
///
/// `qtd_change_pct`/`ytd_change_pct` distinguish two cases explicitly: `None`
/// means the baseline was unavailable (no resolvable snapshot at the boundary
/// date, or the entity had no matching facts then); `Some(0)` means the
/// baseline resolved to exactly zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetric {
    pub entity_id: String,
    /// Display label: client name for client/account rows, ticker for funds
    pub label: Option<String>,
    pub total_balance: Decimal,
    pub qtd_change_pct: Option<Decimal>,
    pub ytd_change_pct: Option<Decimal>,
}

/// System-wide key performance indicators for the resolved snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiMetrics {
    pub active_clients: u64,
    pub active_funds: u64,
    pub active_accounts: u64,
    pub total_aum: Decimal,
    pub total_aum_30d_ago: Option<Decimal>,
    pub change_30d_pct: Option<Decimal>,
}

/// One point of a balance history series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub balance: Decimal,
}

/// The two history series backing the dashboard charts
///
/// Dates with no matching facts are omitted, not zero-filled; both series are
/// sorted ascending by date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartData {
    pub recent_history: Vec<HistoryPoint>,
    pub long_term_history: Vec<HistoryPoint>,
}

/// A complete materialized result set for one calendar date
///
/// Written wholesale by the offline warming job and replaced atomically per
/// date; the request engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub as_of_date: NaiveDate,
    pub materialized_at: DateTime<Utc>,
    pub client_balances: Vec<EntityMetric>,
    pub fund_balances: Vec<EntityMetric>,
    pub account_details: Vec<EntityMetric>,
    pub kpi_metrics: KpiMetrics,
    pub charts: ChartData,
}

/// Where a response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Provenance {
    Live,
    Cached { materialized_at: DateTime<Utc> },
}

/// Response metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardMeta {
    /// The reference date the request was evaluated against
    pub reference_date: Option<NaiveDate>,
    /// The resolved snapshot date (latest fact date at or before reference)
    pub as_of_date: Option<NaiveDate>,
    pub provenance: Provenance,
}

/// Pagination state for one dimension's list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Pagination state across all three dimensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub page_size: usize,
    pub client: PageInfo,
    pub fund: PageInfo,
    pub account: PageInfo,
}

/// The assembled dashboard response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub metadata: DashboardMeta,
    pub client_balances: Vec<EntityMetric>,
    pub fund_balances: Vec<EntityMetric>,
    pub account_details: Vec<EntityMetric>,
    pub charts: ChartData,
    pub kpi_metrics: KpiMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInfo>,
}

impl Dashboard {
    /// A fully-formed empty response: zero KPIs, empty lists, no error
    pub fn empty() -> Self {
        Self {
            metadata: DashboardMeta {
                reference_date: None,
                as_of_date: None,
                provenance: Provenance::Live,
            },
            client_balances: Vec::new(),
            fund_balances: Vec::new(),
            account_details: Vec::new(),
            charts: ChartData::default(),
            kpi_metrics: KpiMetrics::default(),
            pagination: None,
        }
    }
}

/// One export row: an account/fund fact at the as-of date plus its dollar and
/// percent deltas versus the resolved quarter/year baselines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRow {
    pub account_id: AccountId,
    pub client_id: ClientId,
    pub client_name: String,
    pub fund_name: FundName,
    pub fund_ticker: Option<String>,
    pub as_of_date: NaiveDate,
    pub balance: Decimal,
    pub qtd_change_amount: Option<Decimal>,
    pub qtd_change_pct: Option<Decimal>,
    pub ytd_change_amount: Option<Decimal>,
    pub ytd_change_pct: Option<Decimal>,
}
