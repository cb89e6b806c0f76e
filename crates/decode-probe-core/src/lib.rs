//! Decode Probe Core - Domain logic for the concurrent decode stress test.
//!
//! This crate contains the domain types, the ports towards the image codec and
//! the reporting layer, a single probe (decode-and-compare) and the orchestrator
//! that runs probes in parallel rounds followed by a serial phase.

pub mod domain;
pub mod orchestrator;
pub mod ports;
pub mod probe;

pub use domain::{
    Argb, DecodeError, DecodeErrorKind, Outcome, Phase, ProbeId, ProbeOutcome, RoundResult,
    RunSettings, RunSummary, SettingsError, EXPECTED_PIXEL, REFERENCE_IMAGE, SERIAL_PROBES,
};
pub use orchestrator::ConcurrentDecodeProbe;
pub use ports::{
    Diagnostic, DiagnosticSink, FrameReader, ImageCodec, ProgressEvent, ProgressSink,
    WarningListener,
};
pub use probe::{DecodeGuard, ProbeConfig, ProbeTask};
