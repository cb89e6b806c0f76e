//! Mock implementations of the reporting ports.

use std::sync::{Arc, Mutex, PoisonError};

use decode_probe_core::{Diagnostic, DiagnosticSink, ProgressEvent, ProgressSink};

/// Mock implementation of `DiagnosticSink` for testing.
///
/// Captures diagnostics from any thread for later assertions.
#[derive(Clone, Default)]
pub struct MockDiagnosticSink {
    diagnostics: Arc<Mutex<Vec<Diagnostic>>>,
}

impl MockDiagnosticSink {
    /// Creates a new mock sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured diagnostics.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Mismatch` diagnostics.
    #[must_use]
    pub fn mismatch_count(&self) -> usize {
        self.diagnostics()
            .iter()
            .filter(|d| matches!(d, Diagnostic::Mismatch { .. }))
            .count()
    }

    /// Returns the number of `Error` diagnostics.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics()
            .iter()
            .filter(|d| matches!(d, Diagnostic::Error { .. }))
            .count()
    }

    /// Returns the number of `Warning` diagnostics.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.diagnostics()
            .iter()
            .filter(|d| matches!(d, Diagnostic::Warning { .. }))
            .count()
    }
}

impl DiagnosticSink for MockDiagnosticSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
#[derive(Default)]
pub struct MockProgressSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `RoundStarted` events.
    #[must_use]
    pub fn rounds_started(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::RoundStarted { .. }))
            .count()
    }

    /// Returns the number of `ProbeCollected` events.
    #[must_use]
    pub fn probes_collected(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::ProbeCollected { .. }))
            .count()
    }

    /// Returns whether a `Finished` event was received.
    #[must_use]
    pub fn has_finished(&self) -> bool {
        self.events()
            .iter()
            .any(|e| matches!(e, ProgressEvent::Finished { .. }))
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
