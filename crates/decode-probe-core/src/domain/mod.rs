//! Core domain types for the decode probe.

mod error;
mod outcome;
mod pixel;
mod settings;
mod summary;

pub use error::{DecodeError, DecodeErrorKind, SettingsError};
pub use outcome::{Outcome, Phase, ProbeId, ProbeOutcome};
pub use pixel::{Argb, EXPECTED_PIXEL, REFERENCE_IMAGE};
pub use settings::{RunSettings, SERIAL_PROBES};
pub use summary::{RoundResult, RunSummary};
