//! Probe identity and outcome types.

use serde::Serialize;

use super::{Argb, DecodeError, DecodeErrorKind};

/// Which phase of a run a probe belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Submitted to the worker pool as part of a round.
    Parallel,
    /// Run on the caller's thread after the pool was shut down.
    Serial,
}

/// Identifies a single probe within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeId {
    /// Phase the probe ran in.
    pub phase: Phase,
    /// Round index (serial probes use their position in the serial phase).
    pub round: usize,
    /// Worker slot within the round (always 0 for serial probes).
    pub worker: usize,
}

impl ProbeId {
    /// Id of the `worker`-th probe of parallel round `round`.
    #[must_use]
    pub const fn parallel(round: usize, worker: usize) -> Self {
        Self {
            phase: Phase::Parallel,
            round,
            worker,
        }
    }

    /// Id of the `index`-th serial probe.
    #[must_use]
    pub const fn serial(index: usize) -> Self {
        Self {
            phase: Phase::Serial,
            round: index,
            worker: 0,
        }
    }
}

/// Result of one decode-and-compare attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The decoded pixel equals the expected value.
    Match {
        /// Decoded pixel.
        pixel: Argb,
    },
    /// Decoding succeeded but produced a different pixel.
    Mismatch {
        /// Decoded pixel.
        observed: Argb,
        /// Pixel the probe expected.
        expected: Argb,
    },
    /// Decoding failed; the failure was captured.
    Error {
        /// Failure category.
        kind: DecodeErrorKind,
        /// Rendered error message.
        message: String,
    },
}

impl Outcome {
    /// Compares a decoded pixel against the expected one.
    #[must_use]
    pub fn compare(observed: Argb, expected: Argb) -> Self {
        if observed == expected {
            Self::Match { pixel: observed }
        } else {
            Self::Mismatch { observed, expected }
        }
    }

    /// Returns true for a matching pixel.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Match { .. })
    }
}

impl From<DecodeError> for Outcome {
    fn from(e: DecodeError) -> Self {
        Self::Error {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// Outcome of a probe, tagged with the probe that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    /// Producing probe.
    pub probe: ProbeId,
    /// What happened.
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ProbeOutcome {
    /// Returns true for a matching pixel.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}
