//! Canned datasets shared across engine tests

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use crate::memory::{MemoryFactStore, MemoryFactStoreBuilder};

/// Shorthand for building calendar dates in tests
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Two clients, three funds, four accounts, with facts on the year start
/// (2024-01-01), the second-quarter start (2024-04-01), and a mid-quarter
/// reference date (2024-04-10).
///
/// Layout:
/// - `CLT1` "Alpha Capital": accounts `ACC1` (Growth Fund) and `ACC2`
///   (Income Fund)
/// - `CLT2` "Beta Partners": accounts `ACC3` (Growth Fund) and `ACC4`
///   (Treasury Fund, zero balance at the reference date)
pub fn sample_market() -> MemoryFactStoreBuilder {
    MemoryFactStore::builder()
        .link("ACC1", "CLT1", "Alpha Capital")
        .link("ACC2", "CLT1", "Alpha Capital")
        .link("ACC3", "CLT2", "Beta Partners")
        .link("ACC4", "CLT2", "Beta Partners")
        .ticker("Growth Fund", "GRW")
        .ticker("Income Fund", "INC")
        // Year start
        .fact("ACC1", "Growth Fund", "2024-01-01", dec!(1000))
        .fact("ACC2", "Income Fund", "2024-01-01", dec!(500))
        .fact("ACC3", "Growth Fund", "2024-01-01", dec!(2000))
        .fact("ACC4", "Treasury Fund", "2024-01-01", dec!(300))
        // Quarter start
        .fact("ACC1", "Growth Fund", "2024-04-01", dec!(1100))
        .fact("ACC2", "Income Fund", "2024-04-01", dec!(400))
        .fact("ACC3", "Growth Fund", "2024-04-01", dec!(2200))
        .fact("ACC4", "Treasury Fund", "2024-04-01", dec!(100))
        // Reference date
        .fact("ACC1", "Growth Fund", "2024-04-10", dec!(1210))
        .fact("ACC2", "Income Fund", "2024-04-10", dec!(440))
        .fact("ACC3", "Growth Fund", "2024-04-10", dec!(1980))
        .fact("ACC4", "Treasury Fund", "2024-04-10", dec!(0))
}

/// The reference date `sample_market` facts end on
pub fn sample_reference_date() -> NaiveDate {
    date(2024, 4, 10)
}
