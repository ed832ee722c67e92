//! Core Kernel - Foundational types and utilities for the balance dashboard
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Strongly-typed entity identifiers with format validation
//! - Calendar math for quarter/year reporting boundaries
//! - Common error types

pub mod error;
pub mod identifiers;
pub mod temporal;

pub use error::CoreError;
pub use identifiers::{AccountId, ClientId, FundName, IdentifierError};
pub use temporal::{parse_date, quarter_start, year_start, DateRange, TemporalError};
