//! Proptest strategies for engine property tests

use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for account identifiers
pub fn account_id_strategy() -> impl Strategy<Value = String> {
    "ACC[0-9]{3}"
}

/// Strategy for client identifiers
pub fn client_id_strategy() -> impl Strategy<Value = String> {
    "CLT[0-9]{2}"
}

/// Strategy for balances in a realistic range, two decimal places
pub fn balance_strategy() -> impl Strategy<Value = Decimal> {
    (-1_000_000_00i64..1_000_000_00i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for page sizes worth paginating with
pub fn page_size_strategy() -> impl Strategy<Value = usize> {
    1usize..=20
}
