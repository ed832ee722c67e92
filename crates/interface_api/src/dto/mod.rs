//! Request/Response data transfer objects
//!
//! Query parameters arrive as plain strings and are converted into the
//! engine's typed criteria here; every conversion failure becomes an
//! `InvalidParameter` carrying the offending field and literal value, before
//! any aggregation runs.

pub mod dashboard;
pub mod export;

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::NaiveDate;
use core_kernel::{parse_date, IdentifierError};
use domain_metrics::{Dimension, MetricsError};

/// Splits a comma-separated list parameter, dropping empty segments
fn split_list(raw: &Option<String>) -> Vec<&str> {
    raw.as_deref()
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Parses a comma-separated identifier list into a typed set
fn parse_id_set<T>(raw: &Option<String>, field: &'static str) -> Result<BTreeSet<T>, MetricsError>
where
    T: FromStr<Err = IdentifierError> + Ord,
{
    split_list(raw)
        .into_iter()
        .map(|segment| {
            segment
                .parse::<T>()
                .map_err(|_| MetricsError::invalid_parameter(field, segment))
        })
        .collect()
}

/// Parses an optional `YYYY-MM-DD` date parameter
fn parse_date_param(
    raw: &Option<String>,
    field: &'static str,
) -> Result<Option<NaiveDate>, MetricsError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value)
            .map(Some)
            .map_err(|_| MetricsError::invalid_parameter(field, value)),
    }
}

/// Parses the selection-source parameter
fn parse_selection_source(raw: &Option<String>) -> Result<Option<Dimension>, MetricsError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") | Some("none") => Ok(None),
        Some("client") => Ok(Some(Dimension::Client)),
        Some("fund") => Ok(Some(Dimension::Fund)),
        Some("account") => Ok(Some(Dimension::Account)),
        Some(other) => Err(MetricsError::invalid_parameter("selection_source", other)),
    }
}

/// Parses an optional positive page size
fn parse_page_size(raw: &Option<String>) -> Result<Option<usize>, MetricsError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => match value.parse::<usize>() {
            Ok(size) if size > 0 => Ok(Some(size)),
            _ => Err(MetricsError::invalid_parameter("page_size", value)),
        },
    }
}

/// Normalizes a text pattern: trimmed, empty becomes absent
fn pattern(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::ClientId;

    #[test]
    fn test_split_list_trims_and_drops_empties() {
        let raw = Some("CLT1, CLT2,,  ".to_string());
        assert_eq!(split_list(&raw), vec!["CLT1", "CLT2"]);
        assert!(split_list(&None).is_empty());
    }

    #[test]
    fn test_parse_id_set_echoes_bad_segment() {
        let raw = Some("CLT1,bad id".to_string());
        let err = parse_id_set::<ClientId>(&raw, "client_ids").unwrap_err();
        match err {
            MetricsError::InvalidParameter { field, value } => {
                assert_eq!(field, "client_ids");
                assert_eq!(value, "bad id");
            }
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_date_param_echoes_literal() {
        let err = parse_date_param(&Some("not-a-date".to_string()), "date").unwrap_err();
        assert!(err.to_string().contains("not-a-date"));
    }

    #[test]
    fn test_selection_source_values() {
        assert_eq!(parse_selection_source(&None).unwrap(), None);
        assert_eq!(
            parse_selection_source(&Some("client".to_string())).unwrap(),
            Some(Dimension::Client)
        );
        assert!(parse_selection_source(&Some("portfolio".to_string())).is_err());
    }

    #[test]
    fn test_page_size_zero_is_invalid() {
        assert!(parse_page_size(&Some("0".to_string())).is_err());
        assert_eq!(parse_page_size(&Some("25".to_string())).unwrap(), Some(25));
    }

    #[test]
    fn test_pattern_normalization() {
        assert_eq!(pattern(Some("  growth ".to_string())), Some("growth".to_string()));
        assert_eq!(pattern(Some("   ".to_string())), None);
    }
}
