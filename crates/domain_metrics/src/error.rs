//! Domain error taxonomy for the metrics engine
//!
//! Validation failures are detected at the boundary, before any store access.
//! Empty results are never errors: a request that matches nothing produces a
//! fully-formed response with empty lists and `None` changes.

use crate::ports::StoreError;
use thiserror::Error;

/// Errors the metrics engine can return to the boundary layer
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A malformed date or entity identifier was supplied.
    ///
    /// Carries the offending field and the literal value so the boundary can
    /// echo both back to the caller.
    #[error("invalid {field}: '{value}'")]
    InvalidParameter { field: &'static str, value: String },

    /// The export row-count path requires at least one non-empty filter.
    #[error("export row count requires at least one filter")]
    NoFilterSupplied,

    /// The projected export exceeds the configured row ceiling.
    #[error("export of {rows} rows exceeds the ceiling of {ceiling}")]
    DownloadTooLarge { rows: u64, ceiling: u64 },

    /// A fact-store access failed. Not retried here; propagated as-is.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MetricsError {
    /// Creates an `InvalidParameter` error for a named field
    pub fn invalid_parameter(field: &'static str, value: impl Into<String>) -> Self {
        MetricsError::InvalidParameter {
            field,
            value: value.into(),
        }
    }

    /// True for errors caused by the request rather than the system
    pub fn is_client_error(&self) -> bool {
        !matches!(self, MetricsError::Store(_))
    }
}
