//! Failure reporting with duplicate suppression.
//!
//! Failures recur on every tick until the underlying condition resolves
//! (a layout change upstream, an unreachable source). The reporter keeps
//! the single most recent reported reason and only performs the
//! diagnostic side effect when the reason changes, so the notification
//! channel sees each distinct failure once.

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info};

/// Why a tick failed to produce usable values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// No failure reported.
    None,
    /// The source errored while producing an observation.
    ErrorGettingValues,
    /// The observation contained no rows at all.
    NoValues,
    /// The observation dropped rows.
    MissingValues,
}

impl FailureReason {
    /// Stable identifier used in logs and captions.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::None => "NO_REASON",
            FailureReason::ErrorGettingValues => "ERROR_GETTING_VALUES",
            FailureReason::NoValues => "NO_VALUES",
            FailureReason::MissingValues => "MISSING_VALUES",
        }
    }

    /// Human-readable caption accompanying a diagnostic artifact.
    pub fn caption(&self) -> String {
        format!("Bot Error: {}", self.as_str().replace('_', " "))
    }
}

/// Destination for diagnostic artifacts captured on failure.
///
/// An implementation captures a point-in-time artifact under `filename`
/// and forwards it together with `caption`.
pub trait DiagnosticSink: Send {
    fn capture(&mut self, reason: FailureReason, filename: &str, caption: &str) -> Result<()>;
}

/// Logs capture requests instead of producing an artifact.
///
/// Stands in for a real capture collaborator (e.g. a browser screenshot)
/// while honoring the filename and caption contract.
#[derive(Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn capture(&mut self, reason: FailureReason, filename: &str, caption: &str) -> Result<()> {
        info!(reason = reason.as_str(), filename, caption, "diagnostic capture");
        Ok(())
    }
}

/// Whether a `report` call performed the side effect or suppressed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The reason changed; the diagnostic was captured and sent.
    Sent,
    /// Repeat of the current reason; nothing was done.
    Skipped,
}

/// Tracks the most recent reported failure reason.
pub struct FailureReporter {
    last_reason: FailureReason,
    sink: Box<dyn DiagnosticSink>,
}

impl FailureReporter {
    pub fn new(sink: Box<dyn DiagnosticSink>) -> Self {
        Self { last_reason: FailureReason::None, sink }
    }

    /// Report a failure, suppressing repeats of the current reason.
    ///
    /// The reason slot is updated before the capture side effect runs, so
    /// a failing sink still dedups the next identical report.
    pub fn report(&mut self, reason: FailureReason) -> Result<ReportOutcome> {
        self.report_at(reason, Utc::now())
    }

    fn report_at(&mut self, reason: FailureReason, now: DateTime<Utc>) -> Result<ReportOutcome> {
        if reason == self.last_reason {
            debug!(reason = reason.as_str(), "skipping diagnostic, repetitive reason");
            return Ok(ReportOutcome::Skipped);
        }
        self.last_reason = reason;
        let filename = artifact_filename(now);
        self.sink.capture(reason, &filename, &reason.caption())?;
        Ok(ReportOutcome::Sent)
    }

    /// Re-arm the reporter after a fully valid observation cycle.
    pub fn clear(&mut self) {
        if self.last_reason == FailureReason::None {
            return;
        }
        self.last_reason = FailureReason::None;
        debug!("failure reason cleared");
    }

    /// The most recently reported reason.
    pub fn last_reason(&self) -> FailureReason {
        self.last_reason
    }
}

/// Timestamp-derived artifact filename. Colons are not portable in file
/// names, so they are replaced with underscores.
fn artifact_filename(now: DateTime<Utc>) -> String {
    let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true).replace(':', "_");
    format!("{stamp}_screenshot.png")
}
