//! Typed filter predicates and the selection-source composition rule
//!
//! A [`Predicate`] is a small expression tree over joined balance facts. Each
//! clause knows which relational joins it needs (the account-to-client link,
//! the fund directory), so an adapter renders exactly the joins a request
//! requires. The same tree is evaluated in memory by the test fakes, keeping
//! one filter semantics across adapters.

use std::collections::BTreeSet;

use core_kernel::{AccountId, ClientId, FundName};

use crate::criteria::{Dimension, FilterCriteria};
use crate::model::FactRow;

/// The relational joins a predicate requires when rendered as a query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinSet {
    /// Join to the account-to-client mapping
    pub client_link: bool,
    /// Join to the fund directory (tickers)
    pub fund_directory: bool,
}

impl JoinSet {
    pub fn union(self, other: JoinSet) -> JoinSet {
        JoinSet {
            client_link: self.client_link || other.client_link,
            fund_directory: self.fund_directory || other.fund_directory,
        }
    }
}

/// One conjunct of a filter predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    ClientIn(BTreeSet<ClientId>),
    FundIn(BTreeSet<FundName>),
    AccountIn(BTreeSet<AccountId>),
    /// Case-insensitive substring on the client display name
    ClientNameContains(String),
    /// Case-insensitive substring on the fund name or its ticker
    FundTextContains(String),
    /// Case-insensitive substring on the account identifier
    AccountIdContains(String),
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl Clause {
    /// The joins this clause needs to be evaluated
    pub fn required_joins(&self) -> JoinSet {
        match self {
            Clause::ClientIn(_) | Clause::ClientNameContains(_) => JoinSet {
                client_link: true,
                fund_directory: false,
            },
            Clause::FundTextContains(_) => JoinSet {
                client_link: false,
                fund_directory: true,
            },
            Clause::FundIn(_) | Clause::AccountIn(_) | Clause::AccountIdContains(_) => {
                JoinSet::default()
            }
        }
    }

    fn matches(&self, fact: &FactRow) -> bool {
        match self {
            Clause::ClientIn(ids) => ids.contains(&fact.client_id),
            Clause::FundIn(names) => names.contains(&fact.fund_name),
            Clause::AccountIn(ids) => ids.contains(&fact.account_id),
            Clause::ClientNameContains(pattern) => contains_ci(&fact.client_name, pattern),
            Clause::FundTextContains(pattern) => {
                contains_ci(fact.fund_name.as_str(), pattern)
                    || fact
                        .fund_ticker
                        .as_deref()
                        .is_some_and(|ticker| contains_ci(ticker, pattern))
            }
            Clause::AccountIdContains(pattern) => contains_ci(fact.account_id.as_str(), pattern),
        }
    }
}

/// A conjunction of clauses over joined balance facts
///
/// The empty predicate is universal: it matches every fact and requires no
/// joins of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// The predicate that matches everything
    pub fn universal() -> Self {
        Self::default()
    }

    pub fn is_universal(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Union of the joins required by all clauses
    pub fn required_joins(&self) -> JoinSet {
        self.clauses
            .iter()
            .fold(JoinSet::default(), |acc, clause| {
                acc.union(clause.required_joins())
            })
    }

    /// Evaluates the predicate against one joined fact
    pub fn matches(&self, fact: &FactRow) -> bool {
        self.clauses.iter().all(|clause| clause.matches(fact))
    }

    fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }
}

/// Composes the effective predicate for rendering dimension `target`.
///
/// Text patterns always apply to every dimension. An inclusion set for
/// dimension `X` applies unless `X == target == selection_source`: the
/// selection source's own list keeps showing its full universe so further
/// multi-selection stays possible, while the related lists narrow.
pub fn predicate_for(criteria: &FilterCriteria, target: Dimension) -> Predicate {
    compose(criteria, Some(target))
}

/// The full, unsuppressed intersection predicate.
///
/// KPIs, history series, and the export path always use this one;
/// `selection_source` has no effect on them.
pub fn full_predicate(criteria: &FilterCriteria) -> Predicate {
    compose(criteria, None)
}

fn compose(criteria: &FilterCriteria, target: Option<Dimension>) -> Predicate {
    let mut predicate = Predicate::universal();

    if let Some(pattern) = &criteria.client_name_pattern {
        predicate.push(Clause::ClientNameContains(pattern.clone()));
    }
    if let Some(pattern) = &criteria.fund_text_pattern {
        predicate.push(Clause::FundTextContains(pattern.clone()));
    }
    if let Some(pattern) = &criteria.account_id_pattern {
        predicate.push(Clause::AccountIdContains(pattern.clone()));
    }

    let suppressed = |dimension: Dimension| {
        target == Some(dimension) && criteria.selection_source == Some(dimension)
    };

    if !criteria.client_ids.is_empty() && !suppressed(Dimension::Client) {
        predicate.push(Clause::ClientIn(criteria.client_ids.clone()));
    }
    if !criteria.fund_names.is_empty() && !suppressed(Dimension::Fund) {
        predicate.push(Clause::FundIn(criteria.fund_names.clone()));
    }
    if !criteria.account_ids.is_empty() && !suppressed(Dimension::Account) {
        predicate.push(Clause::AccountIn(criteria.account_ids.clone()));
    }

    predicate
}
