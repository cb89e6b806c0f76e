//! Test support utilities for decode-probe.
//!
//! Provides stub codecs, recording mocks for the reporting ports, and
//! reference image fixtures for testing the probe pipeline.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use decode_probe_core::{ConcurrentDecodeProbe, RunSettings};
//! use decode_probe_test_support::{FixedPixelCodec, MockDiagnosticSink, MockProgressSink};
//!
//! let probe = ConcurrentDecodeProbe::new(
//!     Arc::new(FixedPixelCodec::expected()),
//!     Arc::new(MockDiagnosticSink::new()),
//!     "reference.jpg",
//! );
//! let settings = RunSettings::new(2, 3, false).unwrap();
//! let summary = probe.run(settings, &MockProgressSink::new()).unwrap();
//! assert!(summary.success);
//! ```

mod codecs;
mod fixtures;
mod mocks;

pub use codecs::{
    AlternatingCodec, CountingCodec, FailingCodec, FixedPixelCodec, PanickingCodec,
    RendezvousCodec,
};
pub use fixtures::ReferenceImageBuilder;
pub use mocks::{MockDiagnosticSink, MockProgressSink};
