//! Line-oriented diagnostic output.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use decode_probe_core::{Diagnostic, DiagnosticSink};
use tracing::debug;

/// Writes one line per diagnostic; the writer lock keeps lines from
/// concurrent probes whole.
pub struct LineDiagnostics {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl LineDiagnostics {
    /// Creates a diagnostic sink writing to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(io::stderr()))
    }

    /// Creates a diagnostic sink writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl DiagnosticSink for LineDiagnostics {
    #[allow(clippy::significant_drop_tightening)]
    fn report(&self, diagnostic: Diagnostic) {
        let line = format_diagnostic(&diagnostic);
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(writer, "{line}").and_then(|()| writer.flush()) {
            debug!("Failed to write diagnostic: {e}");
        }
    }
}

/// Renders a diagnostic as a single line.
pub fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    match diagnostic {
        Diagnostic::Mismatch {
            probe,
            observed,
            expected,
        } => format!(
            "    ({:3},{:3}) !!! pixel(0,0) = {observed}. Expected: {expected}",
            probe.round, probe.worker
        ),
        Diagnostic::Error {
            probe,
            path,
            message,
        } => format!(
            "    ({:3},{:3}) !!! Error reading '{}': {message}",
            probe.round,
            probe.worker,
            path.display()
        ),
        Diagnostic::Warning { probe, message } => format!(
            "    ({:3},{:3}) warning: {message}",
            probe.round, probe.worker
        ),
    }
}
