//! Export request/response DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use domain_metrics::{FilterCriteria, MetricsError};

use super::{parse_date_param, parse_id_set, parse_selection_source, pattern};

/// Raw export query parameters: the same filter surface as the dashboard,
/// plus an optional as-of date
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    pub client_ids: Option<String>,
    pub fund_names: Option<String>,
    pub account_ids: Option<String>,
    pub client_name: Option<String>,
    pub fund_text: Option<String>,
    pub account_number: Option<String>,
    pub selection_source: Option<String>,
    pub date: Option<String>,
}

impl ExportQuery {
    /// Validates and converts into criteria and an optional as-of date
    pub fn into_criteria(self) -> Result<(FilterCriteria, Option<NaiveDate>), MetricsError> {
        let criteria = FilterCriteria {
            client_ids: parse_id_set(&self.client_ids, "client_ids")?,
            fund_names: parse_id_set(&self.fund_names, "fund_names")?,
            account_ids: parse_id_set(&self.account_ids, "account_ids")?,
            client_name_pattern: pattern(self.client_name),
            fund_text_pattern: pattern(self.fund_text),
            account_id_pattern: pattern(self.account_number),
            selection_source: parse_selection_source(&self.selection_source)?,
        };
        let date = parse_date_param(&self.date, "date")?;
        Ok((criteria, date))
    }
}

/// Projected export size
#[derive(Debug, Serialize)]
pub struct RowCountResponse {
    pub row_count: u64,
    pub ceiling: u64,
}
