//! Cache gateway: cache-vs-live decision per request
//!
//! Materialized snapshots cover exactly one case: the unfiltered,
//! uncursored default view for a calendar date. Anything else computes live.
//! Cache failures never surface to the caller; the gateway reports a miss
//! and the request falls back to live aggregation.

use chrono::NaiveDate;

use crate::criteria::FilterCriteria;
use crate::model::CacheSnapshot;
use crate::paginate::DimensionCursors;
use crate::ports::CacheStore;

/// Mediates read access to materialized snapshots
pub struct CacheGateway<'a> {
    cache: &'a dyn CacheStore,
}

impl<'a> CacheGateway<'a> {
    pub fn new(cache: &'a dyn CacheStore) -> Self {
        Self { cache }
    }

    /// True iff the request is servable from a materialized snapshot: no
    /// inclusion sets, no text patterns, no pagination cursor.
    pub fn should_use_cache(criteria: &FilterCriteria, cursors: &DimensionCursors) -> bool {
        criteria.is_unfiltered() && cursors.is_empty()
    }

    /// Fetches the snapshot for a resolved date. A store failure is logged
    /// and reported as a miss so the caller computes live.
    pub async fn lookup(&self, date: NaiveDate) -> Option<CacheSnapshot> {
        match self.cache.get(date).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!(%date, %error, "cache lookup failed, falling back to live aggregation");
                None
            }
        }
    }
}
