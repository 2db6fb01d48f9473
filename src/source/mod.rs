//! Observation source abstraction.
//!
//! This module provides a trait-based seam for obtaining per-tick
//! observations. The shipped implementation reads a JSON document from
//! disk; anything that can produce a value set per tick (a scraper, a
//! network endpoint) fits behind the same trait.

mod file;

pub use file::FileSource;

use anyhow::Result;

use crate::data::Observation;

/// Trait for obtaining a fresh observation each tick.
///
/// # Example
///
/// ```no_run
/// use statwatch::{FileSource, ObservationSource};
///
/// let mut source = FileSource::new("values.json");
/// let observation = source.observe()?;
/// println!("{} tracks", observation.values().len());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub trait ObservationSource: Send {
    /// Fetch the current observation.
    ///
    /// An error means the source could not produce data at all; the
    /// caller treats it as a failed read, distinct from an empty or
    /// partial observation.
    fn observe(&mut self) -> Result<Observation>;

    /// Human-readable description of the source, used in logs.
    fn description(&self) -> &str;
}
