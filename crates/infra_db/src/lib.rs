//! Database Infrastructure Layer
//!
//! PostgreSQL adapters for the metrics engine's store ports, built on SQLx.
//! Queries are assembled at runtime with `sqlx::QueryBuilder` because the
//! filter predicate shape is dynamic per request; the predicate's join set
//! decides which tables each query actually touches.
//!
//! # Schema
//!
//! The adapters read three externally loaded tables and one cache table:
//!
//! ```text
//! balance_facts       (account_id text, fund_name text, balance_date date,
//!                      balance numeric,
//!                      primary key (account_id, fund_name, balance_date))
//! account_clients     (account_id text primary key, client_id text,
//!                      client_name text)
//! fund_directory      (fund_name text primary key, ticker text)
//! dashboard_snapshots (as_of_date date primary key,
//!                      materialized_at timestamptz, snapshot jsonb)
//! ```
//!
//! Facts are append-only and written by an external load process; this crate
//! never writes them. `dashboard_snapshots` is written only by the
//! [`warmer::CacheWarmer`].

pub mod error;
pub mod pool;
pub mod repositories;
pub mod sql;
pub mod warmer;

pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use repositories::cache::PgCacheStore;
pub use repositories::facts::PgFactStore;
pub use warmer::{CacheWarmer, WarmSummary};
