//! Data models and pure comparison logic.
//!
//! This module owns everything that can be decided without I/O: the value
//! types themselves, the classification of a fresh observation against the
//! last known values, and the rendering of the notification message.
//!
//! ## Submodules
//!
//! - [`values`]: value set types and per-tick observations
//! - [`diff`]: classification of an observation ([`Classification`])
//! - [`message`]: notification formatting and transport escaping
//!
//! ## Data Flow
//!
//! ```text
//! Observation (raw rows, filtered)
//!        │
//!        ▼
//! classify(observation, last_known)
//!        │
//!        ├──▶ Identical / Incomplete / Regressive (no new data)
//!        │
//!        └──▶ Accepted ──▶ format_message() ──▶ escaped text
//! ```

pub mod diff;
pub mod message;
pub mod values;

pub use diff::{classify, Classification};
pub use message::{escape_reserved, format_message};
pub use values::{Observation, TrackStats, ValueSet};
