//! API error handling
//!
//! Every error response is an RFC 7807 problem document: `{type, title,
//! detail, status, instance}`. Validation problems echo the offending field
//! and value in `detail`; store failures surface as a generic problem
//! without internal detail.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use domain_metrics::MetricsError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// RFC 7807 problem document body
#[derive(Debug, Serialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub detail: String,
    pub status: u16,
    /// Unique per occurrence, for correlating reports with logs
    pub instance: String,
}

impl ApiError {
    fn problem_parts(&self) -> (StatusCode, &'static str, &'static str, String) {
        let ApiError::Metrics(error) = self;
        match error {
            MetricsError::InvalidParameter { .. } => (
                StatusCode::BAD_REQUEST,
                "invalid-parameter",
                "Invalid request parameter",
                error.to_string(),
            ),
            MetricsError::NoFilterSupplied => (
                StatusCode::BAD_REQUEST,
                "no-filter-supplied",
                "No filter supplied",
                error.to_string(),
            ),
            MetricsError::DownloadTooLarge { .. } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "download-too-large",
                "Download too large",
                error.to_string(),
            ),
            MetricsError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "store-failure",
                "Upstream store failure",
                "the fact store could not be queried".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, problem_type, title, detail) = self.problem_parts();

        if status.is_server_error() {
            let ApiError::Metrics(error) = &self;
            tracing::error!(%error, "request failed");
        }

        let body = Problem {
            problem_type: format!("/problems/{problem_type}"),
            title: title.to_string(),
            detail,
            status: status.as_u16(),
            instance: format!("urn:uuid:{}", Uuid::new_v4()),
        };

        (
            status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            Json(body),
        )
            .into_response()
    }
}
