//! Durable snapshot store for observed value sets.
//!
//! History is partitioned into one JSON document per calendar year at
//! `<data-dir>/<year>-values.json`, mapping ISO-8601 timestamps to
//! snapshot entries. ISO-8601 sorts lexicographically, so the last entry
//! of a document is always the most recent. Every save rewrites the
//! active year's document in full.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data::ValueSet;

/// One persisted snapshot.
///
/// The `date` field repeats the entry's key so an entry stays
/// self-describing when extracted from its document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// The merged value set as of `date`.
    pub values: ValueSet,
    /// ISO-8601 timestamp of the observation.
    pub date: String,
}

/// A year's worth of snapshots, keyed by ISO-8601 timestamp.
pub type SnapshotHistory = BTreeMap<String, SnapshotEntry>;

/// Owns the persisted history and the cached last known values.
///
/// Reads are served from memory; writes persist the whole active-year
/// document before the in-memory cache is updated, so a failed save never
/// leaves a half-updated view behind.
#[derive(Debug)]
pub struct ValueStore {
    data_dir: PathBuf,
    active_year: i32,
    history: SnapshotHistory,
    last_known: ValueSet,
}

impl ValueStore {
    /// Open the store, restoring the current year's history if present.
    ///
    /// A missing or unreadable document is not fatal: the store starts
    /// empty and logs a warning. When the current year holds no entries,
    /// the most recent entry of any prior year's document seeds the last
    /// known values without writing anything.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        Self::open_at(data_dir, Utc::now())
    }

    fn open_at<P: AsRef<Path>>(data_dir: P, now: DateTime<Utc>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("creating data dir {}", data_dir.display()))?;

        let active_year = now.year();
        let path = unit_path(&data_dir, active_year);
        let history = match read_history(&path) {
            Ok(history) => {
                debug!(path = %path.display(), "restored history");
                history
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unable to restore history, starting empty");
                SnapshotHistory::new()
            }
        };

        let last_known = match latest_values(&history) {
            Some(values) => values,
            None => seed_from_previous_units(&data_dir, active_year),
        };

        Ok(Self { data_dir, active_year, history, last_known })
    }

    /// The cached last known values. Never touches disk.
    pub fn last_known_values(&self) -> &ValueSet {
        &self.last_known
    }

    /// Merge `values` over the last known set and persist the result.
    ///
    /// Tracks absent from `values` keep their last known record; tracks
    /// present are fully replaced. The merged set is appended to the
    /// active year's history and the whole document is written out. Only
    /// a successful write commits the in-memory history and cache; on
    /// failure both are left untouched and the error is surfaced without
    /// any internal retry.
    pub fn add_values(&mut self, values: ValueSet) -> Result<()> {
        self.add_values_at(values, Utc::now())
    }

    fn add_values_at(&mut self, values: ValueSet, now: DateTime<Utc>) -> Result<()> {
        debug!("adding values");
        let mut merged = self.last_known.clone();
        merged.extend(values);

        // The unit rotates on a year change; the new document starts empty
        // and prior years are left behind untouched.
        let year = now.year();
        let mut history = if year == self.active_year {
            self.history.clone()
        } else {
            warn!(year, "history unit rotated");
            SnapshotHistory::new()
        };

        let date = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        history.insert(date.clone(), SnapshotEntry { values: merged.clone(), date });

        write_history(&unit_path(&self.data_dir, year), &history)?;

        self.active_year = year;
        self.history = history;
        self.last_known = merged;
        Ok(())
    }
}

fn unit_path(data_dir: &Path, year: i32) -> PathBuf {
    data_dir.join(format!("{year}-values.json"))
}

fn read_history(path: &Path) -> Result<SnapshotHistory> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Rewrite the whole document via a temporary file and rename, so a failed
/// write leaves the previous document on disk intact.
fn write_history(path: &Path, history: &SnapshotHistory) -> Result<()> {
    let json = serde_json::to_string_pretty(history).context("serializing history")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("replacing {}", path.display()))?;
    debug!(path = %path.display(), "saved history");
    Ok(())
}

fn latest_values(history: &SnapshotHistory) -> Option<ValueSet> {
    history.iter().next_back().map(|(_, entry)| entry.values.clone())
}

/// Scan prior-year documents in descending name order and adopt the most
/// recent entry found. Unreadable documents are skipped with a warning,
/// empty ones silently; nothing is migrated or merged across years.
fn seed_from_previous_units(data_dir: &Path, active_year: i32) -> ValueSet {
    let current = unit_path(data_dir, active_year);
    let mut units: Vec<PathBuf> = match fs::read_dir(data_dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && *path != current
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.ends_with("-values.json"))
            })
            .collect(),
        Err(e) => {
            warn!(dir = %data_dir.display(), error = %e, "unable to scan data dir");
            return ValueSet::new();
        }
    };
    units.sort();

    for path in units.into_iter().rev() {
        match read_history(&path) {
            Ok(history) => {
                if let Some(values) = latest_values(&history) {
                    debug!(path = %path.display(), "seeded last known values from previous unit");
                    return values;
                }
            }
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable unit"),
        }
    }
    ValueSet::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TrackStats;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn stats(streams: u64, listeners: u64, saves: u64) -> TrackStats {
        TrackStats { streams, listeners, saves }
    }

    fn set(entries: &[(&str, TrackStats)]) -> ValueSet {
        entries.iter().map(|(name, s)| (name.to_string(), *s)).collect()
    }

    fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_open_empty_dir() {
        let dir = TempDir::new().unwrap();
        let store = ValueStore::open(dir.path()).unwrap();
        assert!(store.last_known_values().is_empty());
    }

    #[test]
    fn test_add_then_reopen_restores_last_known() {
        let dir = TempDir::new().unwrap();
        let values = set(&[("Song A", stats(100, 50, 10))]);

        let mut store = ValueStore::open(dir.path()).unwrap();
        store.add_values(values.clone()).unwrap();

        let reopened = ValueStore::open(dir.path()).unwrap();
        assert_eq!(reopened.last_known_values(), &values);
    }

    #[test]
    fn test_merge_retains_absent_tracks() {
        let dir = TempDir::new().unwrap();
        let mut store = ValueStore::open_at(dir.path(), at(2024, 3, 1, 8)).unwrap();

        store
            .add_values_at(set(&[("Song A", stats(1, 1, 1))]), at(2024, 3, 1, 9))
            .unwrap();
        store
            .add_values_at(set(&[("Song B", stats(2, 2, 2))]), at(2024, 3, 1, 10))
            .unwrap();

        let expected = set(&[("Song A", stats(1, 1, 1)), ("Song B", stats(2, 2, 2))]);
        assert_eq!(store.last_known_values(), &expected);

        // The persisted latest entry carries the merged set.
        let history = read_history(&unit_path(dir.path(), 2024)).unwrap();
        assert_eq!(history.len(), 2);
        let (_, latest) = history.iter().next_back().unwrap();
        assert_eq!(latest.values, expected);
    }

    #[test]
    fn test_identical_add_is_cache_noop_but_appends() {
        let dir = TempDir::new().unwrap();
        let values = set(&[("Song A", stats(5, 5, 5))]);
        let mut store = ValueStore::open_at(dir.path(), at(2024, 3, 1, 8)).unwrap();

        store.add_values_at(values.clone(), at(2024, 3, 1, 9)).unwrap();
        store.add_values_at(values.clone(), at(2024, 3, 1, 10)).unwrap();

        assert_eq!(store.last_known_values(), &values);
        let history = read_history(&unit_path(dir.path(), 2024)).unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_entry_date_matches_key() {
        let dir = TempDir::new().unwrap();
        let mut store = ValueStore::open_at(dir.path(), at(2024, 3, 1, 8)).unwrap();
        store
            .add_values_at(set(&[("Song A", stats(1, 1, 1))]), at(2024, 3, 1, 9))
            .unwrap();

        let history = read_history(&unit_path(dir.path(), 2024)).unwrap();
        let (key, entry) = history.iter().next_back().unwrap();
        assert_eq!(key, &entry.date);
        assert_eq!(key, "2024-03-01T09:00:00.000Z");
    }

    #[test]
    fn test_seed_from_previous_unit() {
        let dir = TempDir::new().unwrap();
        let values = set(&[("Song A", stats(100, 50, 10))]);

        // Write a prior-year document by hand.
        let mut prior = SnapshotHistory::new();
        prior.insert(
            "2024-12-31T23:00:00.000Z".to_string(),
            SnapshotEntry { values: values.clone(), date: "2024-12-31T23:00:00.000Z".to_string() },
        );
        write_history(&unit_path(dir.path(), 2024), &prior).unwrap();

        let store = ValueStore::open_at(dir.path(), at(2025, 1, 1, 12)).unwrap();
        assert_eq!(store.last_known_values(), &values);

        // Seeding writes nothing.
        assert!(!unit_path(dir.path(), 2025).exists());
    }

    #[test]
    fn test_first_save_after_rollover_starts_fresh_unit() {
        let dir = TempDir::new().unwrap();
        let values = set(&[("Song A", stats(100, 50, 10))]);

        let mut prior = SnapshotHistory::new();
        prior.insert(
            "2024-12-31T23:00:00.000Z".to_string(),
            SnapshotEntry { values: values.clone(), date: "2024-12-31T23:00:00.000Z".to_string() },
        );
        write_history(&unit_path(dir.path(), 2024), &prior).unwrap();

        let mut store = ValueStore::open_at(dir.path(), at(2025, 1, 1, 12)).unwrap();
        store
            .add_values_at(set(&[("Song A", stats(120, 55, 11))]), at(2025, 1, 1, 13))
            .unwrap();

        let new_unit = read_history(&unit_path(dir.path(), 2025)).unwrap();
        assert_eq!(new_unit.len(), 1);

        // Prior year's document is untouched.
        let old_unit = read_history(&unit_path(dir.path(), 2024)).unwrap();
        assert_eq!(old_unit, prior);
    }

    #[test]
    fn test_mid_process_rollover() {
        let dir = TempDir::new().unwrap();
        let mut store = ValueStore::open_at(dir.path(), at(2024, 12, 31, 22)).unwrap();

        store
            .add_values_at(set(&[("Song A", stats(1, 1, 1))]), at(2024, 12, 31, 23))
            .unwrap();
        store
            .add_values_at(set(&[("Song A", stats(2, 2, 2))]), at(2025, 1, 1, 1))
            .unwrap();

        let old_unit = read_history(&unit_path(dir.path(), 2024)).unwrap();
        let new_unit = read_history(&unit_path(dir.path(), 2025)).unwrap();
        assert_eq!(old_unit.len(), 1);
        assert_eq!(new_unit.len(), 1);
        assert_eq!(store.last_known_values(), &set(&[("Song A", stats(2, 2, 2))]));
    }

    #[test]
    fn test_unreadable_unit_starts_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(unit_path(dir.path(), 2024), "not valid json").unwrap();

        let store = ValueStore::open_at(dir.path(), at(2024, 6, 1, 12)).unwrap();
        assert!(store.last_known_values().is_empty());
    }

    #[test]
    fn test_seed_scan_skips_unreadable_units() {
        let dir = TempDir::new().unwrap();
        let values = set(&[("Song A", stats(9, 9, 9))]);

        let mut old = SnapshotHistory::new();
        old.insert(
            "2023-06-01T00:00:00.000Z".to_string(),
            SnapshotEntry { values: values.clone(), date: "2023-06-01T00:00:00.000Z".to_string() },
        );
        write_history(&unit_path(dir.path(), 2023), &old).unwrap();
        fs::write(unit_path(dir.path(), 2024), "garbage").unwrap();

        let store = ValueStore::open_at(dir.path(), at(2025, 1, 1, 12)).unwrap();
        assert_eq!(store.last_known_values(), &values);
    }

    #[test]
    fn test_failed_write_leaves_cache_and_file_untouched() {
        let dir = TempDir::new().unwrap();
        let values = set(&[("Song A", stats(1, 1, 1))]);
        let mut store = ValueStore::open_at(dir.path(), at(2024, 3, 1, 8)).unwrap();
        store.add_values_at(values.clone(), at(2024, 3, 1, 9)).unwrap();

        // Remove the directory out from under the store; the next save
        // must fail without corrupting the in-memory view.
        fs::remove_dir_all(dir.path()).unwrap();
        let result = store.add_values_at(set(&[("Song A", stats(2, 2, 2))]), at(2024, 3, 1, 10));
        assert!(result.is_err());
        assert_eq!(store.last_known_values(), &values);
    }
}
