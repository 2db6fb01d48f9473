//! Tick orchestration: observe, classify, persist, notify.

use tracing::{debug, error, info, warn};

use crate::data::{classify, format_message, Classification};
use crate::notify::Notifier;
use crate::report::{FailureReason, FailureReporter};
use crate::source::ObservationSource;
use crate::store::ValueStore;

/// What a single tick amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A previous tick was still in flight; nothing was touched.
    Busy,
    /// The source failed to produce an observation.
    SourceFailed,
    /// The observation contained no rows at all.
    NoValues,
    /// The observation dropped rows.
    Incomplete,
    /// Values identical to the last known set.
    Unchanged,
    /// Counters went backwards; treated as a bad read.
    Regressive,
    /// New values were accepted but persisting them failed.
    PersistFailed,
    /// New values persisted and announced.
    Notified,
}

/// Drives one observe/classify/persist/notify cycle per tick.
///
/// Owns the store, the failure reporter, and the boxed collaborators for
/// observation, notification, and diagnostics. Exactly one tick runs at a
/// time; a call that lands while a previous tick has not completed
/// returns [`TickOutcome::Busy`] without touching any state.
pub struct Watcher {
    source: Box<dyn ObservationSource>,
    notifier: Box<dyn Notifier>,
    store: ValueStore,
    reporter: FailureReporter,
    chat_ids: Vec<String>,
    in_flight: bool,
}

impl Watcher {
    pub fn new(
        source: Box<dyn ObservationSource>,
        notifier: Box<dyn Notifier>,
        store: ValueStore,
        reporter: FailureReporter,
        chat_ids: Vec<String>,
    ) -> Self {
        Self { source, notifier, store, reporter, chat_ids, in_flight: false }
    }

    /// Run one cycle. Never terminates the process; every failure path
    /// resolves to an outcome the caller can inspect.
    pub fn tick(&mut self) -> TickOutcome {
        if self.in_flight {
            warn!("previous tick still in flight, skipping");
            return TickOutcome::Busy;
        }
        self.in_flight = true;
        let outcome = self.run_tick();
        self.in_flight = false;
        outcome
    }

    fn run_tick(&mut self) -> TickOutcome {
        let observation = match self.source.observe() {
            Ok(observation) => observation,
            Err(e) => {
                error!(source = self.source.description(), error = %e, "error getting values");
                self.report(FailureReason::ErrorGettingValues);
                return TickOutcome::SourceFailed;
            }
        };

        if observation.is_empty() {
            warn!("no values received");
            self.report(FailureReason::NoValues);
            return TickOutcome::NoValues;
        }

        let known = self.store.last_known_values().clone();
        match classify(&observation, &known) {
            Classification::Incomplete => {
                warn!(
                    raw = observation.raw_count(),
                    kept = observation.values().len(),
                    "some values are missing"
                );
                self.report(FailureReason::MissingValues);
                TickOutcome::Incomplete
            }
            Classification::Identical => {
                debug!("already known values");
                TickOutcome::Unchanged
            }
            Classification::Regressive => {
                warn!("received lower values, ignoring as a bad read");
                TickOutcome::Regressive
            }
            Classification::Accepted => {
                info!("these values are new");
                let values = observation.into_values();
                let message = format_message(&values, &known);
                if let Err(e) = self.store.add_values(values) {
                    error!(error = %e, "unable to save values");
                    return TickOutcome::PersistFailed;
                }
                self.reporter.clear();
                info!("sending a message");
                if let Err(e) = self.notifier.send(&message, &self.chat_ids) {
                    error!(error = %e, "failed sending notification");
                }
                TickOutcome::Notified
            }
        }
    }

    fn report(&mut self, reason: FailureReason) {
        if let Err(e) = self.reporter.report(reason) {
            error!(reason = reason.as_str(), error = %e, "failed sending diagnostic");
        }
    }

    /// The store's cached view, exposed for inspection.
    pub fn store(&self) -> &ValueStore {
        &self.store
    }
}
