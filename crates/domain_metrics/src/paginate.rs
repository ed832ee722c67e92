//! Keyset pagination over aggregated entity lists
//!
//! Cursors are opaque, stateless tokens: the base64 encoding of the last
//! returned row's sort key. Because facts for a fixed reference date are
//! immutable, resuming from a sort key is exactly stable across calls; there
//! is no skip cost and no duplicate/missing-row anomaly a numeric offset
//! would exhibit.
//!
//! A malformed or undecodable cursor is treated as start-of-list. That is a
//! deliberate leniency: a stale bookmark degrades to the first page instead
//! of failing the request.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::criteria::Dimension;
use crate::model::{EntityMetric, PageInfo};

/// The sort key pagination resumes from
///
/// Clients sort by `(label, entity_id)`; funds and accounts sort by their
/// entity id alone (secondary empty). Ascending, case-sensitive byte order,
/// shared by display and pagination.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SortKey {
    #[serde(rename = "p")]
    pub primary: String,
    #[serde(rename = "s")]
    pub secondary: String,
}

/// The sort key for one entity row in the given dimension
pub fn sort_key(dimension: Dimension, metric: &EntityMetric) -> SortKey {
    match dimension {
        Dimension::Client => SortKey {
            primary: metric.label.clone().unwrap_or_default(),
            secondary: metric.entity_id.clone(),
        },
        Dimension::Fund | Dimension::Account => SortKey {
            primary: metric.entity_id.clone(),
            secondary: String::new(),
        },
    }
}

/// Encodes a sort key as an opaque cursor token
pub fn encode_cursor(key: &SortKey) -> String {
    let json = serde_json::to_vec(key).expect("sort key serializes to JSON");
    URL_SAFE_NO_PAD.encode(json)
}

/// Decodes a cursor token; `None` for anything undecodable
pub fn decode_cursor(token: &str) -> Option<SortKey> {
    let bytes = URL_SAFE_NO_PAD.decode(token).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Per-dimension cursors supplied with a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionCursors {
    pub client: Option<String>,
    pub fund: Option<String>,
    pub account: Option<String>,
}

impl DimensionCursors {
    pub fn is_empty(&self) -> bool {
        self.client.is_none() && self.fund.is_none() && self.account.is_none()
    }

    pub fn for_dimension(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Client => self.client.as_deref(),
            Dimension::Fund => self.fund.as_deref(),
            Dimension::Account => self.account.as_deref(),
        }
    }
}

/// One page of entity metrics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<EntityMetric>,
    pub info: PageInfo,
}

/// Slices a sorted metric list after the cursor position.
///
/// Fetches `page_size + 1` conceptually: `has_more` is set exactly when more
/// rows existed beyond the returned page, and only then is a `next_cursor`
/// emitted.
pub fn paginate(
    dimension: Dimension,
    items: Vec<EntityMetric>,
    page_size: usize,
    cursor: Option<&str>,
) -> Page {
    debug_assert!(page_size > 0, "page_size is validated at the boundary");

    let mut remaining: Vec<EntityMetric> = match cursor.and_then(decode_cursor) {
        Some(after) => items
            .into_iter()
            .filter(|metric| sort_key(dimension, metric) > after)
            .collect(),
        None => items,
    };

    let has_more = remaining.len() > page_size;
    remaining.truncate(page_size);

    let next_cursor = if has_more {
        remaining
            .last()
            .map(|metric| encode_cursor(&sort_key(dimension, metric)))
    } else {
        None
    };

    Page {
        items: remaining,
        info: PageInfo {
            has_more,
            next_cursor,
        },
    }
}
