//! Filter criteria for dashboard requests
//!
//! `FilterCriteria` is the typed value object every request carries: explicit
//! inclusion sets per dimension, optional text patterns, and the optional
//! selection source driving cross-filter semantics. It is constructed fresh
//! per request from external input and never persisted.

use core_kernel::{AccountId, ClientId, FundName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The three rendered entity dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Client,
    Fund,
    Account,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Client, Dimension::Fund, Dimension::Account];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Client => "client",
            Dimension::Fund => "fund",
            Dimension::Account => "account",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request filter state across the three linked dimensions
///
/// Inclusion sets are `BTreeSet`s so iteration order (and therefore rendered
/// queries) is deterministic for identical requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Explicitly selected clients
    pub client_ids: BTreeSet<ClientId>,
    /// Explicitly selected funds
    pub fund_names: BTreeSet<FundName>,
    /// Explicitly selected accounts
    pub account_ids: BTreeSet<AccountId>,
    /// Substring match on client display names
    pub client_name_pattern: Option<String>,
    /// Substring match on fund names or tickers
    pub fund_text_pattern: Option<String>,
    /// Substring match on account identifiers
    pub account_id_pattern: Option<String>,
    /// The dimension whose own inclusion set is suppressed from its own list
    pub selection_source: Option<Dimension>,
}

impl FilterCriteria {
    /// True when no inclusion set and no text pattern is present.
    ///
    /// This is the cacheable default view; `selection_source` alone does not
    /// make a request filtered.
    pub fn is_unfiltered(&self) -> bool {
        self.client_ids.is_empty()
            && self.fund_names.is_empty()
            && self.account_ids.is_empty()
            && self.client_name_pattern.is_none()
            && self.fund_text_pattern.is_none()
            && self.account_id_pattern.is_none()
    }

    /// True when at least one inclusion set or text pattern is present
    pub fn has_any_filter(&self) -> bool {
        !self.is_unfiltered()
    }

    /// Criteria scoped to a single client
    pub fn for_client(id: ClientId) -> Self {
        Self {
            client_ids: BTreeSet::from([id]),
            ..Self::default()
        }
    }

    /// Criteria scoped to a single fund
    pub fn for_fund(name: FundName) -> Self {
        Self {
            fund_names: BTreeSet::from([name]),
            ..Self::default()
        }
    }

    /// Criteria scoped to a single account
    pub fn for_account(id: AccountId) -> Self {
        Self {
            account_ids: BTreeSet::from([id]),
            ..Self::default()
        }
    }
}
