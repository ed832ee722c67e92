//! Export handlers
//!
//! The row-count endpoint requires at least one non-empty filter; the rows
//! endpoint enforces the configured row ceiling before producing anything.
//! Output formatting (CSV, streaming) belongs to downstream consumers; rows
//! are served as structured JSON.

use axum::{
    extract::{Query, State},
    Json,
};

use domain_metrics::DownloadRow;

use crate::dto::export::{ExportQuery, RowCountResponse};
use crate::{error::ApiError, AppState};

/// Projected export size for the supplied filters
pub async fn row_count(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Json<RowCountResponse>, ApiError> {
    let (criteria, date) = query.into_criteria()?;
    let row_count = state.service.export_row_count(&criteria, date).await?;
    Ok(Json(RowCountResponse {
        row_count,
        ceiling: state.service.export_row_ceiling(),
    }))
}

/// Export rows at the resolved as-of date
pub async fn rows(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Json<Vec<DownloadRow>>, ApiError> {
    let (criteria, date) = query.into_criteria()?;
    let rows = state.service.export_rows(&criteria, date).await?;
    Ok(Json(rows))
}
