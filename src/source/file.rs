//! File-based observation source.
//!
//! Reads a JSON document of per-track counters, as written by an external
//! scraper:
//!
//! ```json
//! { "Track name": { "streams": 100, "listeners": 50, "saves": 10 } }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::ObservationSource;
use crate::data::{Observation, ValueSet};

/// An observation source that reads the value document fresh on every
/// tick. Unchanged content is harmless: the comparison downstream
/// classifies it as already known.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being observed.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ObservationSource for FileSource {
    fn observe(&mut self) -> Result<Observation> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let raw: ValueSet = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(Observation::from_raw(raw))
    }

    fn description(&self) -> &str {
        &self.description
    }
}
