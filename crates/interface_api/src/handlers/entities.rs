//! Entity drill-down handlers
//!
//! Thin variants of the dashboard endpoint scoped to one client, fund, or
//! account. Each builds criteria on top of whatever query filters were
//! supplied and calls the same aggregation path; none re-derives metrics.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use core_kernel::{AccountId, ClientId, FundName};
use domain_metrics::MetricsError;

use crate::dto::dashboard::{DashboardQuery, DashboardResponse};
use crate::{error::ApiError, AppState};

/// Dashboard scoped to a single client
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let client_id = ClientId::new(id.as_str())
        .map_err(|_| MetricsError::invalid_parameter("client_id", id.as_str()))?;
    let mut request = query.into_request()?;
    request.criteria.client_ids.insert(client_id);
    let dashboard = state.service.dashboard(&request).await?;
    Ok(Json(DashboardResponse::from(dashboard)))
}

/// Dashboard scoped to a single fund
pub async fn get_fund(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let fund_name = FundName::new(name.as_str())
        .map_err(|_| MetricsError::invalid_parameter("fund_name", name.as_str()))?;
    let mut request = query.into_request()?;
    request.criteria.fund_names.insert(fund_name);
    let dashboard = state.service.dashboard(&request).await?;
    Ok(Json(DashboardResponse::from(dashboard)))
}

/// Dashboard scoped to a single account
pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let account_id = AccountId::new(id.as_str())
        .map_err(|_| MetricsError::invalid_parameter("account_id", id.as_str()))?;
    let mut request = query.into_request()?;
    request.criteria.account_ids.insert(account_id);
    let dashboard = state.service.dashboard(&request).await?;
    Ok(Json(DashboardResponse::from(dashboard)))
}
