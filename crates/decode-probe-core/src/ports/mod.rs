//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the probe logic and external adapters:
//! the codec under test and the reporting layer.

mod codec;
mod diagnostics;
mod progress;

pub use codec::{FrameReader, ImageCodec, WarningListener};
pub use diagnostics::{Diagnostic, DiagnosticSink};
pub use progress::{ProgressEvent, ProgressSink};
