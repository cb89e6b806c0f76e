//! Progress adapter: per-probe lines or an indicatif bar.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use decode_probe_core::{Phase, ProgressEvent, ProgressSink};
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};
use tracing::debug;

/// Progress adapter for CLI output.
pub struct ConsoleProgress {
    writer: Mutex<Box<dyn Write + Send>>,
    bar: Option<IndicatifBar>,
    quiet: bool,
}

impl ConsoleProgress {
    /// Progress lines on stdout.
    #[must_use]
    pub fn stdout(total: usize, quiet: bool, show_bar: bool) -> Self {
        Self::new(Box::new(io::stdout()), total, quiet, show_bar)
    }

    /// Progress lines on stderr, keeping stdout free for a report.
    #[must_use]
    pub fn stderr(total: usize, quiet: bool, show_bar: bool) -> Self {
        Self::new(Box::new(io::stderr()), total, quiet, show_bar)
    }

    /// Creates a progress adapter.
    ///
    /// # Arguments
    ///
    /// * `writer` - Destination of progress lines
    /// * `total` - Total number of probes in the run
    /// * `quiet` - If true, suppress all output
    /// * `show_bar` - If true, show a progress bar instead of per-probe lines
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>, total: usize, quiet: bool, show_bar: bool) -> Self {
        let bar = (!quiet && show_bar).then(|| {
            let bar = IndicatifBar::new(total as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar
        });

        Self {
            writer: Mutex::new(writer),
            bar,
            quiet,
        }
    }

    fn line(&self, args: fmt::Arguments<'_>) {
        if let Err(e) = self.write_line(args) {
            debug!("Failed to write progress: {e}");
        }
    }

    #[allow(clippy::significant_drop_tightening)]
    fn write_line(&self, args: fmt::Arguments<'_>) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_fmt(args)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

impl ProgressSink for ConsoleProgress {
    fn on_event(&self, event: ProgressEvent) {
        if self.quiet {
            return;
        }

        if let Some(bar) = &self.bar {
            match event {
                ProgressEvent::RoundStarted { round } => bar.set_message(format!("round {round}")),
                ProgressEvent::ProbeCollected { .. } => bar.inc(1),
                ProgressEvent::SerialStarted { .. } => bar.set_message("serial phase"),
                ProgressEvent::Finished { summary } => bar.finish_with_message(format!(
                    "Done: {} probes, {} failed",
                    summary.probe_count(),
                    summary.failures().count()
                )),
                ProgressEvent::Started { .. } | ProgressEvent::RoundSubmitted { .. } => {}
            }
            return;
        }

        match event {
            ProgressEvent::Started { .. } => self.line(format_args!("Starting")),
            ProgressEvent::RoundStarted { round } => self.line(format_args!("Loop {round}")),
            ProgressEvent::RoundSubmitted { .. } => {
                self.line(format_args!("Probes submitted. Collecting results"));
            }
            ProgressEvent::ProbeCollected { outcome } => {
                let probe = outcome.probe;
                let success = outcome.is_success();
                match probe.phase {
                    Phase::Parallel => self.line(format_args!(
                        "\tsuccess ({}, {}) -> {success}",
                        probe.round, probe.worker
                    )),
                    Phase::Serial => {
                        self.line(format_args!("\tsuccess ({}): {success}", probe.round));
                    }
                }
            }
            ProgressEvent::SerialStarted { probes } => self.line(format_args!(
                "Parallel reading ended. Now a serial test with {probes} iterations:"
            )),
            ProgressEvent::Finished { summary } => {
                if summary.success {
                    self.line(format_args!("All {} probes matched", summary.probe_count()));
                } else {
                    self.line(format_args!(
                        "{} of {} probes failed",
                        summary.failures().count(),
                        summary.probe_count()
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use decode_probe_core::{Outcome, ProbeId, ProbeOutcome, RunSettings, EXPECTED_PIXEL};

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn collected(probe: ProbeId, success: bool) -> ProgressEvent {
        let outcome = if success {
            Outcome::Match {
                pixel: EXPECTED_PIXEL,
            }
        } else {
            Outcome::compare(decode_probe_core::Argb(0), EXPECTED_PIXEL)
        };
        ProgressEvent::ProbeCollected {
            outcome: ProbeOutcome { probe, outcome },
        }
    }

    #[test]
    fn test_text_lines() {
        let buffer = SharedBuffer::default();
        let progress = ConsoleProgress::new(Box::new(buffer.clone()), 12, false, false);

        progress.on_event(ProgressEvent::Started {
            settings: RunSettings::new(2, 1, false).unwrap(),
        });
        progress.on_event(ProgressEvent::RoundStarted { round: 0 });
        progress.on_event(ProgressEvent::RoundSubmitted { round: 0 });
        progress.on_event(collected(ProbeId::parallel(0, 0), true));
        progress.on_event(collected(ProbeId::parallel(0, 1), false));
        progress.on_event(ProgressEvent::SerialStarted { probes: 10 });
        progress.on_event(collected(ProbeId::serial(0), true));

        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(
            text,
            "Starting\n\
             Loop 0\n\
             Probes submitted. Collecting results\n\
             \tsuccess (0, 0) -> true\n\
             \tsuccess (0, 1) -> false\n\
             Parallel reading ended. Now a serial test with 10 iterations:\n\
             \tsuccess (0): true\n"
        );
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn test_write_errors_are_surfaced_not_raised() {
        let progress = ConsoleProgress::new(Box::new(BrokenPipe), 12, false, false);

        let err = progress.write_line(format_args!("Starting")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);

        // Reporting keeps going when the console is gone.
        progress.on_event(ProgressEvent::RoundStarted { round: 0 });
        progress.on_event(collected(ProbeId::parallel(0, 0), true));
    }

    #[test]
    fn test_quiet_writes_nothing() {
        let buffer = SharedBuffer::default();
        let progress = ConsoleProgress::new(Box::new(buffer.clone()), 12, true, false);
        progress.on_event(ProgressEvent::RoundStarted { round: 0 });
        assert!(buffer.0.lock().unwrap().is_empty());
    }
}
