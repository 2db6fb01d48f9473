//! Classification of a fresh observation against the last known values.

use super::values::{Observation, ValueSet};

/// Outcome of comparing an observation with the last known values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Observation deep-equals the known values; nothing to do.
    Identical,
    /// The raw observation dropped rows; a failed read, not new data.
    Incomplete,
    /// Every common counter went strictly backwards with nothing new.
    /// Counters are cumulative, so this is a bad read, not a real decrease.
    Regressive,
    /// Forward-moving change worth persisting and announcing.
    Accepted,
}

impl Classification {
    /// Returns a short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Identical => "identical",
            Classification::Incomplete => "incomplete",
            Classification::Regressive => "regressive",
            Classification::Accepted => "accepted",
        }
    }
}

/// Classify an observation against the last known values.
///
/// Dropped rows are checked first: an incomplete read must be treated as a
/// failure even if the surviving rows would otherwise look like progress.
pub fn classify(observation: &Observation, known: &ValueSet) -> Classification {
    if observation.has_dropped_rows() {
        return Classification::Incomplete;
    }

    let observed = observation.values();
    if observed == known {
        return Classification::Identical;
    }

    if moves_forward(observed, known) {
        Classification::Accepted
    } else {
        Classification::Regressive
    }
}

/// Existential check across the whole batch: one new track, or one counter
/// that did not shrink, marks the batch as forward-moving. A batch can
/// therefore be accepted even when individual tracks regressed; regression
/// detection is a coarse whole-batch guard, not per-track correction.
fn moves_forward(observed: &ValueSet, known: &ValueSet) -> bool {
    observed.iter().any(|(name, stats)| match known.get(name) {
        None => true,
        Some(prev) => {
            stats.streams >= prev.streams
                || stats.listeners >= prev.listeners
                || stats.saves >= prev.saves
        }
    })
}
