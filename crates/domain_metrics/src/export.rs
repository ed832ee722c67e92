//! Export row generation
//!
//! Each export row is one account/fund fact at the as-of date, annotated
//! with dollar and percent deltas versus the resolved quarter and year
//! baselines. Formatting and streaming mechanics live at the boundary; this
//! module only produces the rows.

use std::collections::HashMap;

use core_kernel::{AccountId, FundName};
use rust_decimal::Decimal;

use crate::aggregate::change_pct;
use crate::model::{DownloadRow, FactRow};

/// Default hard ceiling on export size, enforced before any row is produced
pub const DEFAULT_ROW_CEILING: u64 = 1_000_000;

fn baseline_map(rows: Vec<FactRow>) -> HashMap<(AccountId, FundName), Decimal> {
    rows.into_iter()
        .map(|row| ((row.account_id, row.fund_name), row.balance))
        .collect()
}

/// Joins current fact rows with their per-(account, fund) baselines.
///
/// Rows are ordered by account id then fund name. A missing baseline yields
/// `None` deltas; a zero baseline yields a zero percent change.
pub fn build_rows(current: Vec<FactRow>, qtd: Vec<FactRow>, ytd: Vec<FactRow>) -> Vec<DownloadRow> {
    let qtd = baseline_map(qtd);
    let ytd = baseline_map(ytd);

    let mut rows: Vec<DownloadRow> = current
        .into_iter()
        .map(|row| {
            let key = (row.account_id.clone(), row.fund_name.clone());
            let qtd_baseline = qtd.get(&key).copied();
            let ytd_baseline = ytd.get(&key).copied();
            DownloadRow {
                qtd_change_amount: qtd_baseline.map(|baseline| row.balance - baseline),
                qtd_change_pct: change_pct(row.balance, qtd_baseline),
                ytd_change_amount: ytd_baseline.map(|baseline| row.balance - baseline),
                ytd_change_pct: change_pct(row.balance, ytd_baseline),
                account_id: row.account_id,
                client_id: row.client_id,
                client_name: row.client_name,
                fund_name: row.fund_name,
                fund_ticker: row.fund_ticker,
                as_of_date: row.balance_date,
                balance: row.balance,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        (a.account_id.as_str(), a.fund_name.as_str())
            .cmp(&(b.account_id.as_str(), b.fund_name.as_str()))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::ClientId;
    use rust_decimal_macros::dec;

    fn row(account: &str, fund: &str, date: (i32, u32, u32), balance: Decimal) -> FactRow {
        FactRow {
            account_id: AccountId::new(account).unwrap(),
            client_id: ClientId::new("CLT1").unwrap(),
            client_name: "Alpha Capital".to_string(),
            fund_name: FundName::new(fund).unwrap(),
            fund_ticker: None,
            balance_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            balance,
        }
    }

    #[test]
    fn test_rows_join_baselines_per_account_fund() {
        let current = vec![
            row("A1", "Growth Fund", (2024, 4, 1), dec!(150)),
            row("A1", "Income Fund", (2024, 4, 1), dec!(80)),
        ];
        let qtd = vec![row("A1", "Growth Fund", (2024, 1, 1), dec!(100))];

        let rows = build_rows(current, qtd, Vec::new());
        assert_eq!(rows.len(), 2);

        let growth = &rows[0];
        assert_eq!(growth.fund_name.as_str(), "Growth Fund");
        assert_eq!(growth.qtd_change_amount, Some(dec!(50)));
        assert_eq!(growth.qtd_change_pct, Some(dec!(50)));
        assert_eq!(growth.ytd_change_amount, None);
        assert_eq!(growth.ytd_change_pct, None);

        let income = &rows[1];
        assert_eq!(income.qtd_change_amount, None);
        assert_eq!(income.qtd_change_pct, None);
    }

    #[test]
    fn test_rows_sorted_by_account_then_fund() {
        let current = vec![
            row("A2", "Growth Fund", (2024, 4, 1), dec!(1)),
            row("A1", "Income Fund", (2024, 4, 1), dec!(1)),
            row("A1", "Growth Fund", (2024, 4, 1), dec!(1)),
        ];
        let rows = build_rows(current, Vec::new(), Vec::new());
        let order: Vec<(String, String)> = rows
            .iter()
            .map(|r| (r.account_id.to_string(), r.fund_name.to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("A1".to_string(), "Growth Fund".to_string()),
                ("A1".to_string(), "Income Fund".to_string()),
                ("A2".to_string(), "Growth Fund".to_string()),
            ]
        );
    }

    #[test]
    fn test_zero_baseline_reports_zero_pct_with_amount() {
        let current = vec![row("A1", "Growth Fund", (2024, 4, 1), dec!(150))];
        let qtd = vec![row("A1", "Growth Fund", (2024, 1, 1), dec!(0))];
        let rows = build_rows(current, qtd, Vec::new());
        assert_eq!(rows[0].qtd_change_amount, Some(dec!(150)));
        assert_eq!(rows[0].qtd_change_pct, Some(Decimal::ZERO));
    }
}
