//! Export path: row counts, the ceiling, and row generation

use std::collections::BTreeSet;
use std::sync::Arc;

use core_kernel::FundName;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_metrics::{DashboardService, FilterCriteria, MetricsError};
use test_utils::fixtures::sample_market;
use test_utils::{MemoryCacheStore, MemoryFactStore};

fn service() -> DashboardService {
    DashboardService::new(
        Arc::new(sample_market().build()),
        Arc::new(MemoryCacheStore::new()),
    )
}

fn growth_fund_only() -> FilterCriteria {
    FilterCriteria {
        fund_names: BTreeSet::from([FundName::new("Growth Fund").unwrap()]),
        ..FilterCriteria::default()
    }
}

#[tokio::test]
async fn row_count_requires_a_filter() {
    let err = service()
        .export_row_count(&FilterCriteria::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, MetricsError::NoFilterSupplied));
}

#[tokio::test]
async fn row_count_reflects_the_filtered_snapshot() {
    // Growth Fund is held by ACC1 and ACC3 at the reference date
    let count = service()
        .export_row_count(&growth_fund_only(), None)
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn ceiling_is_enforced_before_rows_are_produced() {
    let service = service().with_export_row_ceiling(2);
    let err = service
        .export_rows(&FilterCriteria::default(), None)
        .await
        .unwrap_err();
    match err {
        MetricsError::DownloadTooLarge { rows, ceiling } => {
            assert_eq!(rows, 4);
            assert_eq!(ceiling, 2);
        }
        other => panic!("expected DownloadTooLarge, got {other:?}"),
    }
}

#[tokio::test]
async fn rows_carry_quarter_and_year_deltas() {
    let rows = service().export_rows(&growth_fund_only(), None).await.unwrap();
    assert_eq!(rows.len(), 2);

    let acc1 = &rows[0];
    assert_eq!(acc1.account_id.as_str(), "ACC1");
    assert_eq!(acc1.fund_name.as_str(), "Growth Fund");
    assert_eq!(acc1.fund_ticker.as_deref(), Some("GRW"));
    assert_eq!(acc1.client_name, "Alpha Capital");
    assert_eq!(acc1.balance, dec!(1210));
    // Versus the 2024-04-01 quarter baseline of 1100
    assert_eq!(acc1.qtd_change_amount, Some(dec!(110)));
    assert_eq!(acc1.qtd_change_pct, Some(dec!(10)));
    // Versus the 2024-01-01 year baseline of 1000
    assert_eq!(acc1.ytd_change_amount, Some(dec!(210)));
    assert_eq!(acc1.ytd_change_pct, Some(dec!(21)));
}

#[tokio::test]
async fn empty_store_exports_nothing_without_error() {
    let service = DashboardService::new(
        Arc::new(MemoryFactStore::empty()),
        Arc::new(MemoryCacheStore::new()),
    );
    let rows = service
        .export_rows(&growth_fund_only(), None)
        .await
        .unwrap();
    assert!(rows.is_empty());
    let count = service
        .export_row_count(&growth_fund_only(), None)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn zero_balance_rows_are_included_in_exports() {
    // The export is a fact dump: the zero-balance Treasury position appears
    // even though the account dimension's dashboard list excludes it
    let rows = service()
        .export_rows(&FilterCriteria::default(), None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 4);
    let treasury = rows
        .iter()
        .find(|r| r.fund_name.as_str() == "Treasury Fund")
        .unwrap();
    assert_eq!(treasury.balance, Decimal::ZERO);
    assert_eq!(treasury.qtd_change_pct, Some(dec!(-100)));
}
