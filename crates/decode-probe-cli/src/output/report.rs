//! JSON run report.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use decode_probe_core::{ProbeOutcome, RunSettings, RunSummary};
use serde::Serialize;
use tracing::debug;

/// Machine-readable summary of a run.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    /// When the report was produced (RFC 3339).
    pub timestamp: String,
    /// Decoded reference image.
    pub reference: String,
    /// Run settings.
    pub settings: RunSettings,
    /// Probes that ran, serial phase included.
    pub probes: usize,
    /// Probes that failed.
    pub failures: usize,
    /// Indices of parallel rounds with at least one failure.
    pub failed_rounds: Vec<usize>,
    /// Overall result.
    pub success: bool,
    /// Every failing outcome, parallel rounds first.
    pub failing: Vec<&'a ProbeOutcome>,
}

impl<'a> RunReport<'a> {
    /// Builds the report for `summary`.
    #[must_use]
    pub fn new(summary: &'a RunSummary, reference: &Path) -> Self {
        let failing: Vec<_> = summary.failures().collect();
        Self {
            timestamp: iso_timestamp(),
            reference: reference.to_string_lossy().into_owned(),
            settings: summary.settings,
            probes: summary.probe_count(),
            failures: failing.len(),
            failed_rounds: summary
                .rounds
                .iter()
                .filter(|r| r.failed())
                .map(|r| r.round)
                .collect(),
            success: summary.success,
            failing,
        }
    }

    /// Writes the report as one JSON document followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write(&self, writer: &mut impl Write, pretty: bool) -> Result<()> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        writeln!(writer, "{json}").context("Failed to write report")?;
        Ok(())
    }
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
