//! Predicate-to-SQL rendering
//!
//! Filter predicates arrive as typed expression trees; this module renders
//! them into parameterized queries with `sqlx::QueryBuilder`. The
//! predicate's join set drives which tables are joined, so a request that
//! never touches client fields never joins the account-to-client mapping.
//! All values are bound parameters; clause text is assembled only from
//! fixed fragments.

use chrono::NaiveDate;
use core_kernel::DateRange;
use sqlx::{Postgres, QueryBuilder};

use domain_metrics::predicate::{Clause, JoinSet, Predicate};
use domain_metrics::Dimension;

/// Joins a dimension's grouping itself requires, before any predicate:
/// client and account groupings read the client link for keys/labels, fund
/// groupings read the directory for tickers.
pub(crate) fn dimension_joins(dimension: Dimension) -> JoinSet {
    match dimension {
        Dimension::Client | Dimension::Account => JoinSet {
            client_link: true,
            fund_directory: false,
        },
        Dimension::Fund => JoinSet {
            client_link: false,
            fund_directory: true,
        },
    }
}

/// Escapes LIKE metacharacters and wraps the pattern for substring matching
pub(crate) fn like_pattern(pattern: &str) -> String {
    let escaped = pattern
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_from(qb: &mut QueryBuilder<'static, Postgres>, joins: JoinSet) {
    qb.push(" FROM balance_facts ab");
    if joins.client_link {
        qb.push(" JOIN account_clients cl ON cl.account_id = ab.account_id");
    }
    if joins.fund_directory {
        qb.push(" LEFT JOIN fund_directory fd ON fd.fund_name = ab.fund_name");
    }
}

fn push_predicate(qb: &mut QueryBuilder<'static, Postgres>, predicate: &Predicate) {
    for clause in predicate.clauses() {
        match clause {
            Clause::ClientIn(ids) => {
                qb.push(" AND cl.client_id IN (");
                let mut separated = qb.separated(", ");
                for id in ids {
                    separated.push_bind(id.to_string());
                }
                qb.push(")");
            }
            Clause::FundIn(names) => {
                qb.push(" AND ab.fund_name IN (");
                let mut separated = qb.separated(", ");
                for name in names {
                    separated.push_bind(name.to_string());
                }
                qb.push(")");
            }
            Clause::AccountIn(ids) => {
                qb.push(" AND ab.account_id IN (");
                let mut separated = qb.separated(", ");
                for id in ids {
                    separated.push_bind(id.to_string());
                }
                qb.push(")");
            }
            Clause::ClientNameContains(pattern) => {
                qb.push(" AND cl.client_name ILIKE ");
                qb.push_bind(like_pattern(pattern));
            }
            Clause::FundTextContains(pattern) => {
                qb.push(" AND (ab.fund_name ILIKE ");
                qb.push_bind(like_pattern(pattern));
                qb.push(" OR fd.ticker ILIKE ");
                qb.push_bind(like_pattern(pattern));
                qb.push(")");
            }
            Clause::AccountIdContains(pattern) => {
                qb.push(" AND ab.account_id ILIKE ");
                qb.push_bind(like_pattern(pattern));
            }
        }
    }
}

/// `MAX(balance_date)` over all facts, optionally bounded at a date
pub(crate) fn snapshot_query(on_or_before: Option<NaiveDate>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT MAX(balance_date) FROM balance_facts");
    if let Some(bound) = on_or_before {
        qb.push(" WHERE balance_date <= ");
        qb.push_bind(bound);
    }
    qb
}

/// Per-entity balance sums for one dimension at one date
pub(crate) fn balances_query(
    dimension: Dimension,
    predicate: &Predicate,
    date: NaiveDate,
) -> QueryBuilder<'static, Postgres> {
    let (key_expr, label_expr, group_by) = match dimension {
        Dimension::Client => (
            "cl.client_id",
            "cl.client_name",
            "cl.client_id, cl.client_name",
        ),
        Dimension::Fund => ("ab.fund_name", "fd.ticker", "ab.fund_name, fd.ticker"),
        Dimension::Account => (
            "ab.account_id",
            "cl.client_name",
            "ab.account_id, cl.client_name",
        ),
    };

    let mut qb = QueryBuilder::new(format!(
        "SELECT {key_expr} AS entity_key, {label_expr} AS label, SUM(ab.balance) AS total"
    ));
    push_from(
        &mut qb,
        dimension_joins(dimension).union(predicate.required_joins()),
    );
    qb.push(" WHERE ab.balance_date = ");
    qb.push_bind(date);
    push_predicate(&mut qb, predicate);
    qb.push(format!(" GROUP BY {group_by} ORDER BY entity_key"));
    qb
}

/// Distinct entity counts and the balance total at one date.
///
/// Always joins the client link: the distinct client count needs it even
/// when the predicate does not.
pub(crate) fn kpi_query(predicate: &Predicate, date: NaiveDate) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT COUNT(DISTINCT cl.client_id) AS clients, \
         COUNT(DISTINCT ab.fund_name) AS funds, \
         COUNT(DISTINCT ab.account_id) AS accounts, \
         COALESCE(SUM(ab.balance), 0) AS total",
    );
    push_from(
        &mut qb,
        JoinSet {
            client_link: true,
            fund_directory: false,
        }
        .union(predicate.required_joins()),
    );
    qb.push(" WHERE ab.balance_date = ");
    qb.push_bind(date);
    push_predicate(&mut qb, predicate);
    qb
}

/// Per-date balance sums over an inclusive date range
pub(crate) fn history_query(
    predicate: &Predicate,
    range: DateRange,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ab.balance_date, SUM(ab.balance) AS total");
    push_from(&mut qb, predicate.required_joins());
    qb.push(" WHERE ab.balance_date BETWEEN ");
    qb.push_bind(range.start);
    qb.push(" AND ");
    qb.push_bind(range.end);
    push_predicate(&mut qb, predicate);
    qb.push(" GROUP BY ab.balance_date ORDER BY ab.balance_date");
    qb
}

/// Joined fact rows (or their count) at one date, for the export path
pub(crate) fn fact_rows_query(
    predicate: &Predicate,
    date: NaiveDate,
    count_only: bool,
) -> QueryBuilder<'static, Postgres> {
    let mut qb;
    let joins;
    if count_only {
        qb = QueryBuilder::new("SELECT COUNT(*)");
        joins = predicate.required_joins();
    } else {
        qb = QueryBuilder::new(
            "SELECT ab.account_id, cl.client_id, cl.client_name, ab.fund_name, \
             fd.ticker, ab.balance_date, ab.balance",
        );
        // Export rows always carry the client and ticker columns
        joins = JoinSet {
            client_link: true,
            fund_directory: true,
        }
        .union(predicate.required_joins());
    }
    push_from(&mut qb, joins);
    qb.push(" WHERE ab.balance_date = ");
    qb.push_bind(date);
    push_predicate(&mut qb, predicate);
    if !count_only {
        qb.push(" ORDER BY ab.account_id, ab.fund_name");
    }
    qb
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{ClientId, FundName};
    use domain_metrics::predicate::full_predicate;
    use domain_metrics::{FilterCriteria, Predicate};
    use std::collections::BTreeSet;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 10).unwrap()
    }

    fn client_criteria() -> FilterCriteria {
        FilterCriteria {
            client_ids: BTreeSet::from([
                ClientId::new("CLT1").unwrap(),
                ClientId::new("CLT2").unwrap(),
            ]),
            ..FilterCriteria::default()
        }
    }

    #[test]
    fn test_unfiltered_fund_query_joins_directory_but_not_clients() {
        let sql = balances_query(Dimension::Fund, &Predicate::universal(), date()).into_sql();
        assert!(sql.contains("LEFT JOIN fund_directory fd"));
        assert!(!sql.contains("JOIN account_clients"));
        assert!(sql.contains("GROUP BY ab.fund_name, fd.ticker"));
    }

    #[test]
    fn test_client_predicate_adds_client_join_to_fund_query() {
        let predicate = full_predicate(&client_criteria());
        let sql = balances_query(Dimension::Fund, &predicate, date()).into_sql();
        assert!(sql.contains("JOIN account_clients cl"));
        assert!(sql.contains("cl.client_id IN ($2, $3)"));
    }

    #[test]
    fn test_client_query_always_joins_the_link() {
        let sql = balances_query(Dimension::Client, &Predicate::universal(), date()).into_sql();
        assert!(sql.contains("JOIN account_clients cl"));
        assert!(sql.contains("cl.client_id AS entity_key"));
    }

    #[test]
    fn test_history_query_joins_nothing_when_unfiltered() {
        let range = DateRange::trailing_days(date(), 90);
        let sql = history_query(&Predicate::universal(), range).into_sql();
        assert!(!sql.contains("JOIN"));
        assert!(sql.contains("BETWEEN $1 AND $2"));
        assert!(sql.contains("GROUP BY ab.balance_date"));
    }

    #[test]
    fn test_fund_text_pattern_matches_name_or_ticker() {
        let criteria = FilterCriteria {
            fund_text_pattern: Some("grw".to_string()),
            ..FilterCriteria::default()
        };
        let sql = history_query(
            &full_predicate(&criteria),
            DateRange::trailing_days(date(), 90),
        )
        .into_sql();
        assert!(sql.contains("ab.fund_name ILIKE"));
        assert!(sql.contains("fd.ticker ILIKE"));
        assert!(sql.contains("LEFT JOIN fund_directory fd"));
    }

    #[test]
    fn test_count_query_skips_label_joins() {
        let criteria = FilterCriteria {
            fund_names: BTreeSet::from([FundName::new("Growth Fund").unwrap()]),
            ..FilterCriteria::default()
        };
        let sql = fact_rows_query(&full_predicate(&criteria), date(), true).into_sql();
        assert!(sql.starts_with("SELECT COUNT(*)"));
        assert!(!sql.contains("JOIN"));
    }

    #[test]
    fn test_export_rows_query_joins_everything() {
        let sql = fact_rows_query(&Predicate::universal(), date(), false).into_sql();
        assert!(sql.contains("JOIN account_clients cl"));
        assert!(sql.contains("LEFT JOIN fund_directory fd"));
        assert!(sql.contains("ORDER BY ab.account_id, ab.fund_name"));
    }

    #[test]
    fn test_kpi_query_always_counts_through_the_client_link() {
        let sql = kpi_query(&Predicate::universal(), date()).into_sql();
        assert!(sql.contains("JOIN account_clients cl"));
        assert!(sql.contains("COUNT(DISTINCT cl.client_id)"));
        assert!(sql.contains("COALESCE(SUM(ab.balance), 0)"));
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("50%_a\\b"), "%50\\%\\_a\\\\b%");
    }

    #[test]
    fn test_snapshot_query_bounds() {
        assert!(!snapshot_query(None).into_sql().contains("WHERE"));
        assert!(snapshot_query(Some(date()))
            .into_sql()
            .contains("WHERE balance_date <= $1"));
    }
}
