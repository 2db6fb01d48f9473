//! # statwatch
//!
//! A daemon and library for watching per-track streaming counters and
//! announcing real, forward-moving change.
//!
//! Each tick, an observation (track name → cumulative streams, listeners,
//! saves) is compared against the last known values. Genuinely new values
//! are persisted into per-year JSON history and rendered into an escaped
//! notification message; identical, regressive, or incomplete reads are
//! logged and dropped. Repeated identical failures produce a diagnostic
//! report at most once.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                          Watcher (app)                        │
//! │                                                               │
//! │  ObservationSource ──▶ classify ──▶ ValueStore ──▶ Notifier   │
//! │       (source)         (data)        (store)      (notify)    │
//! │                           │                                   │
//! │                           ▼                                   │
//! │                    FailureReporter ──▶ DiagnosticSink         │
//! │                        (report)                               │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: per-tick orchestration ([`Watcher`], [`TickOutcome`])
//! - **[`data`]**: value types, change classification, message formatting
//! - **[`store`]**: per-year snapshot history and the cached last known values
//! - **[`source`]**: observation input seam ([`ObservationSource`], [`FileSource`])
//! - **[`notify`]**: notification output seam ([`Notifier`])
//! - **[`report`]**: failure deduplication and diagnostic capture
//! - **[`settings`]**: file + environment configuration
//!
//! ## Usage
//!
//! ```
//! use statwatch::{classify, Classification, Observation, TrackStats, ValueSet};
//!
//! let known: ValueSet = [("Song A".to_string(), TrackStats { streams: 100, listeners: 50, saves: 10 })]
//!     .into_iter()
//!     .collect();
//! let mut fresh = known.clone();
//! fresh.get_mut("Song A").unwrap().streams = 150;
//!
//! let observation = Observation::from_raw(fresh);
//! assert_eq!(classify(&observation, &known), Classification::Accepted);
//! ```

pub mod app;
pub mod data;
pub mod notify;
pub mod report;
pub mod settings;
pub mod source;
pub mod store;

// Re-export main types for convenience
pub use app::{TickOutcome, Watcher};
pub use settings::Settings;
pub use data::{classify, format_message, Classification, Observation, TrackStats, ValueSet};
pub use notify::{LogNotifier, Notifier};
pub use report::{DiagnosticSink, FailureReason, FailureReporter, LogSink, ReportOutcome};
pub use source::{FileSource, ObservationSource};
pub use store::{SnapshotEntry, SnapshotHistory, ValueStore};
