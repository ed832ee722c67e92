//! Request-date resolution
//!
//! Every balance lookup uses latest-available-at-or-before resolution: the
//! snapshot for a date is the newest balance date not after it. The same
//! rule derives the quarter and year baselines, so a boundary date without a
//! loaded snapshot falls back to the last date that has one.

use chrono::NaiveDate;
use core_kernel::{quarter_start, year_start};

use crate::ports::{FactStore, StoreError};

/// The dates one request is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDates {
    /// The requested date (or the latest fact date when unspecified)
    pub reference: NaiveDate,
    /// `resolve(reference)`; `None` when no fact exists at or before it
    pub current: Option<NaiveDate>,
    /// `resolve(quarter_start(reference))`
    pub qtd_baseline: Option<NaiveDate>,
    /// `resolve(year_start(reference))`
    pub ytd_baseline: Option<NaiveDate>,
}

/// Resolves requested dates against the fact store
pub struct DateResolver<'a> {
    facts: &'a dyn FactStore,
}

impl<'a> DateResolver<'a> {
    pub fn new(facts: &'a dyn FactStore) -> Self {
        Self { facts }
    }

    /// Resolves a request's reference date and baselines.
    ///
    /// An explicit `requested` date is used as-is (it need not have a
    /// snapshot itself). Without one, the latest fact date is the reference;
    /// `Ok(None)` means the store holds no facts at all, in which case every
    /// aggregate degrades to zero/empty.
    pub async fn resolve_request(
        &self,
        requested: Option<NaiveDate>,
    ) -> Result<Option<ResolvedDates>, StoreError> {
        let reference = match requested {
            Some(date) => date,
            None => match self.facts.latest_fact_date().await? {
                Some(date) => date,
                None => return Ok(None),
            },
        };
        self.resolve_reference(reference).await.map(Some)
    }

    /// Resolves the snapshot and period baselines for a known reference date
    pub async fn resolve_reference(
        &self,
        reference: NaiveDate,
    ) -> Result<ResolvedDates, StoreError> {
        let current = self.facts.resolve_snapshot(reference).await?;
        let qtd_baseline = self.facts.resolve_snapshot(quarter_start(reference)).await?;
        let ytd_baseline = self.facts.resolve_snapshot(year_start(reference)).await?;
        Ok(ResolvedDates {
            reference,
            current,
            qtd_baseline,
            ytd_baseline,
        })
    }
}
