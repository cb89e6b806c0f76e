//! Diagnostic output port.

use std::path::PathBuf;

use crate::domain::{Argb, ProbeId};

/// A diagnostic emitted by a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The decoded pixel did not match.
    Mismatch {
        /// Reporting probe.
        probe: ProbeId,
        /// Decoded pixel.
        observed: Argb,
        /// Expected pixel.
        expected: Argb,
    },
    /// Decoding failed.
    Error {
        /// Reporting probe.
        probe: ProbeId,
        /// Image the probe tried to read.
        path: PathBuf,
        /// Rendered error.
        message: String,
    },
    /// The codec emitted a warning.
    Warning {
        /// Reporting probe.
        probe: ProbeId,
        /// Warning text.
        message: String,
    },
}

/// Port for diagnostic lines.
///
/// Called concurrently from worker threads. Implementations must write each
/// diagnostic atomically so lines from different probes never interleave.
pub trait DiagnosticSink: Send + Sync {
    /// Reports one diagnostic.
    fn report(&self, diagnostic: Diagnostic);
}
