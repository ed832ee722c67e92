//! Dashboard handler

use axum::{
    extract::{Query, State},
    Json,
};

use crate::dto::dashboard::{DashboardQuery, DashboardResponse};
use crate::{error::ApiError, AppState};

/// The filtered dashboard: entity lists with QTD/YTD metrics, KPIs, charts,
/// and optional keyset pagination
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let request = query.into_request()?;
    let dashboard = state.service.dashboard(&request).await?;
    Ok(Json(DashboardResponse::from(dashboard)))
}
