//! Aggregation behavior against the in-memory fact store

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_metrics::{DashboardRequest, DashboardService, FilterCriteria, Provenance};
use test_utils::fixtures::{date, sample_market, sample_reference_date};
use test_utils::{MemoryCacheStore, MemoryFactStore};

fn service(store: MemoryFactStore) -> DashboardService {
    DashboardService::new(Arc::new(store), Arc::new(MemoryCacheStore::new()))
}

fn unfiltered() -> DashboardRequest {
    DashboardRequest::default()
}

#[tokio::test]
async fn quarter_start_coinciding_with_reference_yields_zero_not_null() {
    // Facts on the year start and on the quarter start itself: the QTD
    // baseline resolves to the reference date, a degenerate but valid
    // comparison that reports 0%, while YTD compares against January 1.
    let store = MemoryFactStore::builder()
        .link("A1", "C1", "Client One")
        .fact("A1", "F1", "2024-01-01", dec!(100))
        .fact("A1", "F1", "2024-04-01", dec!(150))
        .build();
    let service = service(store);

    let request = DashboardRequest {
        date: Some(date(2024, 4, 1)),
        ..unfiltered()
    };
    let dashboard = service.dashboard(&request).await.unwrap();

    assert_eq!(dashboard.account_details.len(), 1);
    let account = &dashboard.account_details[0];
    assert_eq!(account.total_balance, dec!(150));
    assert_eq!(account.qtd_change_pct, Some(Decimal::ZERO));
    assert_eq!(account.ytd_change_pct, Some(dec!(50)));
}

#[tokio::test]
async fn missing_baseline_reports_null_changes() {
    // Only one fact date exists, inside Q2: quarter/year starts resolve to
    // nothing, so both changes are null rather than zero.
    let store = MemoryFactStore::builder()
        .link("A1", "C1", "Client One")
        .fact("A1", "F1", "2024-05-15", dec!(100))
        .build();
    let dashboard = service(store).dashboard(&unfiltered()).await.unwrap();

    let account = &dashboard.account_details[0];
    assert_eq!(account.qtd_change_pct, None);
    assert_eq!(account.ytd_change_pct, None);
}

#[tokio::test]
async fn empty_store_returns_fully_formed_empty_response() {
    let dashboard = service(MemoryFactStore::empty())
        .dashboard(&unfiltered())
        .await
        .unwrap();

    assert!(dashboard.client_balances.is_empty());
    assert!(dashboard.fund_balances.is_empty());
    assert!(dashboard.account_details.is_empty());
    assert_eq!(dashboard.kpi_metrics.total_aum, Decimal::ZERO);
    assert_eq!(dashboard.kpi_metrics.change_30d_pct, None);
    assert!(dashboard.charts.recent_history.is_empty());
    assert!(dashboard.charts.long_term_history.is_empty());
    assert_eq!(dashboard.metadata.as_of_date, None);
    assert_eq!(dashboard.metadata.provenance, Provenance::Live);
}

#[tokio::test]
async fn sample_market_client_metrics() {
    let dashboard = service(sample_market().build())
        .dashboard(&unfiltered())
        .await
        .unwrap();

    assert_eq!(
        dashboard.metadata.as_of_date,
        Some(sample_reference_date())
    );

    // Sorted by (client name, client id), ascending
    let names: Vec<_> = dashboard
        .client_balances
        .iter()
        .map(|c| c.label.clone().unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha Capital", "Beta Partners"]);

    let alpha = &dashboard.client_balances[0];
    assert_eq!(alpha.entity_id, "CLT1");
    assert_eq!(alpha.total_balance, dec!(1650));
    assert_eq!(alpha.qtd_change_pct.unwrap(), dec!(10));
    assert_eq!(alpha.ytd_change_pct.unwrap(), dec!(10));

    let beta = &dashboard.client_balances[1];
    assert_eq!(beta.total_balance, dec!(1980));
    assert_eq!(beta.qtd_change_pct.unwrap().round_dp(4), dec!(-13.9130));
}

#[tokio::test]
async fn zero_balance_accounts_are_excluded_but_zero_balance_funds_are_not() {
    let dashboard = service(sample_market().build())
        .dashboard(&unfiltered())
        .await
        .unwrap();

    // ACC4 holds exactly zero at the reference date
    let account_ids: Vec<_> = dashboard
        .account_details
        .iter()
        .map(|a| a.entity_id.clone())
        .collect();
    assert_eq!(account_ids, vec!["ACC1", "ACC2", "ACC3"]);

    // The fund dimension applies no such exclusion
    let treasury = dashboard
        .fund_balances
        .iter()
        .find(|f| f.entity_id == "Treasury Fund")
        .expect("zero-balance fund still listed");
    assert_eq!(treasury.total_balance, Decimal::ZERO);
    assert_eq!(treasury.qtd_change_pct, Some(dec!(-100)));
}

#[tokio::test]
async fn fund_labels_carry_directory_tickers() {
    let dashboard = service(sample_market().build())
        .dashboard(&unfiltered())
        .await
        .unwrap();

    let fund_rows: Vec<_> = dashboard
        .fund_balances
        .iter()
        .map(|f| (f.entity_id.as_str(), f.label.as_deref()))
        .collect();
    assert_eq!(
        fund_rows,
        vec![
            ("Growth Fund", Some("GRW")),
            ("Income Fund", Some("INC")),
            // No directory entry: the fund still appears, ticker-less
            ("Treasury Fund", None),
        ]
    );
}

#[tokio::test]
async fn kpis_use_full_dataset_and_thirty_day_comparison() {
    let dashboard = service(sample_market().build())
        .dashboard(&unfiltered())
        .await
        .unwrap();

    let kpi = &dashboard.kpi_metrics;
    assert_eq!(kpi.active_clients, 2);
    assert_eq!(kpi.active_funds, 3);
    assert_eq!(kpi.active_accounts, 4);
    assert_eq!(kpi.total_aum, dec!(3630));
    // 2024-03-11 resolves back to the year-start snapshot
    assert_eq!(kpi.total_aum_30d_ago, Some(dec!(3800)));
    assert_eq!(kpi.change_30d_pct.unwrap().round_dp(4), dec!(-4.4737));
}

#[tokio::test]
async fn history_series_omit_dates_without_facts() {
    let dashboard = service(sample_market().build())
        .dashboard(&unfiltered())
        .await
        .unwrap();

    let recent: Vec<_> = dashboard
        .charts
        .recent_history
        .iter()
        .map(|p| (p.date, p.balance))
        .collect();
    assert_eq!(
        recent,
        vec![
            (date(2024, 4, 1), dec!(3800)),
            (date(2024, 4, 10), dec!(3630)),
        ]
    );
    // The 3-year window additionally reaches the year-start facts
    assert_eq!(dashboard.charts.long_term_history.len(), 3);
    assert_eq!(dashboard.charts.long_term_history[0].date, date(2024, 1, 1));
}

#[tokio::test]
async fn explicit_date_resolves_latest_available_snapshot() {
    // 2024-04-05 has no facts; it resolves to the April 1 snapshot
    let request = DashboardRequest {
        date: Some(date(2024, 4, 5)),
        ..unfiltered()
    };
    let dashboard = service(sample_market().build())
        .dashboard(&request)
        .await
        .unwrap();

    assert_eq!(dashboard.metadata.reference_date, Some(date(2024, 4, 5)));
    assert_eq!(dashboard.metadata.as_of_date, Some(date(2024, 4, 1)));
    let alpha = &dashboard.client_balances[0];
    assert_eq!(alpha.total_balance, dec!(1500));
}

#[tokio::test]
async fn date_before_all_facts_degrades_to_empty() {
    let request = DashboardRequest {
        date: Some(date(2020, 1, 1)),
        ..unfiltered()
    };
    let dashboard = service(sample_market().build())
        .dashboard(&request)
        .await
        .unwrap();

    assert_eq!(dashboard.metadata.as_of_date, None);
    assert!(dashboard.client_balances.is_empty());
    assert_eq!(dashboard.kpi_metrics.total_aum, Decimal::ZERO);
    assert_eq!(dashboard.kpi_metrics.change_30d_pct, None);
}

#[tokio::test]
async fn identical_requests_return_identical_results() {
    let service = service(sample_market().build());
    let request = DashboardRequest {
        criteria: FilterCriteria {
            fund_text_pattern: Some("fund".to_string()),
            ..FilterCriteria::default()
        },
        ..unfiltered()
    };

    let first = service.dashboard(&request).await.unwrap();
    let second = service.dashboard(&request).await.unwrap();
    assert_eq!(first.client_balances, second.client_balances);
    assert_eq!(first.fund_balances, second.fund_balances);
    assert_eq!(first.account_details, second.account_details);
    assert_eq!(first.kpi_metrics, second.kpi_metrics);
}

#[tokio::test]
async fn zero_page_size_is_rejected_before_any_aggregation() {
    let request = DashboardRequest {
        page_size: Some(0),
        ..unfiltered()
    };
    let err = service(sample_market().build())
        .dashboard(&request)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        domain_metrics::MetricsError::InvalidParameter { field: "page_size", .. }
    ));
}
