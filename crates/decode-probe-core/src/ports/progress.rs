//! Progress reporting port.

use crate::domain::{ProbeOutcome, RunSettings, RunSummary};

/// Events emitted by the orchestrator, always from the caller's thread.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The run is about to start.
    Started {
        /// Settings of the run.
        settings: RunSettings,
    },
    /// A parallel round is about to be submitted.
    RoundStarted {
        /// Round index.
        round: usize,
    },
    /// All probes of the round were submitted; collection begins.
    RoundSubmitted {
        /// Round index.
        round: usize,
    },
    /// The outcome of a probe was collected.
    ProbeCollected {
        /// The collected outcome.
        outcome: ProbeOutcome,
    },
    /// Parallel rounds are done and the serial phase begins.
    SerialStarted {
        /// Number of serial probes to run.
        probes: usize,
    },
    /// The run is complete.
    Finished {
        /// Final summary.
        summary: RunSummary,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}
