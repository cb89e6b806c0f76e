//! Aggregated results of rounds and runs.

use serde::Serialize;

use super::{ProbeOutcome, RunSettings};

/// Outcomes of one parallel round, in worker order.
#[derive(Debug, Clone, Serialize)]
pub struct RoundResult {
    /// Round index.
    pub round: usize,
    /// One outcome per worker slot.
    pub outcomes: Vec<ProbeOutcome>,
}

impl RoundResult {
    /// A round fails if any of its probes did not match.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.outcomes.iter().any(|o| !o.is_success())
    }

    /// Number of failing probes in the round.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Settings the run used.
    pub settings: RunSettings,
    /// Parallel rounds in order.
    pub rounds: Vec<RoundResult>,
    /// Serial probes in order.
    pub serial: Vec<ProbeOutcome>,
    /// True iff no probe failed, parallel or serial.
    pub success: bool,
}

impl RunSummary {
    /// Iterates over every outcome, parallel rounds first.
    pub fn outcomes(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.rounds
            .iter()
            .flat_map(|r| r.outcomes.iter())
            .chain(self.serial.iter())
    }

    /// Number of probes that ran.
    #[must_use]
    pub fn probe_count(&self) -> usize {
        self.outcomes().count()
    }

    /// Failing probes, parallel rounds first.
    pub fn failures(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.outcomes().filter(|o| !o.is_success())
    }

    /// Number of parallel rounds with at least one failing probe.
    #[must_use]
    pub fn failed_rounds(&self) -> usize {
        self.rounds.iter().filter(|r| r.failed()).count()
    }
}
