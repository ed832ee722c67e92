//! Store adapters backed by PostgreSQL

pub mod cache;
pub mod facts;
