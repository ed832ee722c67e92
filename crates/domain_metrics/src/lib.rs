//! Filtered Balance Metrics Domain
//!
//! This crate implements the aggregation engine behind the balance dashboard:
//! point-in-time balance snapshots for clients, funds, and accounts, with
//! quarter-to-date and year-to-date change metrics under arbitrary
//! combinations of cross-entity filters.
//!
//! # Key Concepts
//!
//! - **Fact**: an immutable `(account, fund, date, balance)` tuple loaded by
//!   an external process; the engine only reads.
//! - **Snapshot**: the facts resolvable as "current" for a calendar date via
//!   latest-available-at-or-before resolution.
//! - **Selection source**: the dimension whose own inclusion filter is
//!   suppressed from its own rendered list, so selecting rows in one table
//!   narrows the related tables without hiding its own universe.
//! - **Keyset cursor**: an opaque resume token carrying the last row's sort
//!   key, keeping pages stable without numeric offsets.
//!
//! The engine is request-scoped and stateless: all state lives behind the
//! read-only [`ports::FactStore`] and [`ports::CacheStore`] ports.

pub mod aggregate;
pub mod cache;
pub mod criteria;
pub mod dates;
pub mod error;
pub mod export;
pub mod model;
pub mod paginate;
pub mod ports;
pub mod predicate;
pub mod service;

pub use criteria::{Dimension, FilterCriteria};
pub use error::MetricsError;
pub use model::{
    CacheSnapshot, ChartData, Dashboard, DashboardMeta, DownloadRow, EntityMetric, FactRow,
    HistoryPoint, KpiMetrics, Provenance,
};
pub use paginate::DimensionCursors;
pub use ports::{CacheStore, EntityBalance, FactStore, KpiCounts, StoreError};
pub use predicate::{full_predicate, predicate_for, Clause, JoinSet, Predicate};
pub use service::{DashboardRequest, DashboardService};
