//! Value set types and per-tick observations.
//!
//! These types match the JSON format produced by the external scraper:
//! a document mapping track names to their cumulative counters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Cumulative counters for a single track at one point in time.
///
/// All counters are running totals reported by the upstream source and are
/// expected to be monotonically non-decreasing between observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackStats {
    /// Total stream count.
    pub streams: u64,
    /// Total listener count.
    pub listeners: u64,
    /// Total save count.
    pub saves: u64,
}

/// One observation's per-track counter snapshot, keyed by track name.
///
/// Track names are unique by construction and iterate in a deterministic
/// order.
pub type ValueSet = BTreeMap<String, TrackStats>;

/// A single tick's observation as delivered by a source.
///
/// `values` holds the rows usable for comparison; rows with blank track
/// names (disabled/sentinel rows upstream) are filtered out at
/// construction. The pre-filter row count is retained so a read that
/// dropped rows can be detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    raw_count: usize,
    values: ValueSet,
}

impl Observation {
    /// Build an observation from a raw value set, filtering blank names.
    pub fn from_raw(raw: ValueSet) -> Self {
        let raw_count = raw.len();
        let values = raw
            .into_iter()
            .filter(|(name, _)| !name.trim().is_empty())
            .collect();
        Self { raw_count, values }
    }

    /// Number of rows in the raw observation, before filtering.
    pub fn raw_count(&self) -> usize {
        self.raw_count
    }

    /// The comparable rows of this observation.
    pub fn values(&self) -> &ValueSet {
        &self.values
    }

    /// Consume the observation, yielding its comparable rows.
    pub fn into_values(self) -> ValueSet {
        self.values
    }

    /// True when the raw observation contained no rows at all.
    pub fn is_empty(&self) -> bool {
        self.raw_count == 0
    }

    /// True when filtering removed at least one row.
    pub fn has_dropped_rows(&self) -> bool {
        self.values.len() < self.raw_count
    }
}
