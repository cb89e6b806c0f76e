//! Orchestration of parallel probe rounds followed by a serial phase.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use rayon::ThreadPool;
use tracing::{debug, error, info, warn};

use crate::domain::{
    ProbeId, ProbeOutcome, RoundResult, RunSettings, RunSummary, SERIAL_PROBES,
};
use crate::ports::{DiagnosticSink, ImageCodec, ProgressEvent, ProgressSink};
use crate::probe::{ProbeConfig, ProbeTask};

/// Runs decode probes against a codec from a fixed-size worker pool.
pub struct ConcurrentDecodeProbe {
    codec: Arc<dyn ImageCodec>,
    diagnostics: Arc<dyn DiagnosticSink>,
    config: ProbeConfig,
}

impl ConcurrentDecodeProbe {
    /// Creates a probe decoding `reference` with `codec`.
    #[must_use]
    pub fn new(
        codec: Arc<dyn ImageCodec>,
        diagnostics: Arc<dyn DiagnosticSink>,
        reference: impl Into<PathBuf>,
    ) -> Self {
        Self {
            codec,
            diagnostics,
            config: ProbeConfig::new(reference),
        }
    }

    /// Returns the configuration shared by all probes.
    #[must_use]
    pub const fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Runs `settings.rounds()` parallel rounds of `settings.workers()` probes, then
    /// [`SERIAL_PROBES`] probes on the calling thread.
    ///
    /// Each round is a barrier: the next round is submitted only after every
    /// outcome of the current one has been collected. Probe failures are data in
    /// the returned summary; there is no timeout on a hanging decode.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker pool cannot be built or a probe never
    /// reports its outcome, for instance because a diagnostic sink panicked.
    pub fn run(&self, settings: RunSettings, progress: &dyn ProgressSink) -> Result<RunSummary> {
        info!(
            workers = settings.workers(),
            rounds = settings.rounds(),
            synchronize = settings.synchronize(),
            codec = self.codec.name(),
            reference = %self.config.reference.display(),
            "Starting probe run"
        );
        progress.on_event(ProgressEvent::Started { settings });

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.workers())
            .thread_name(|i| format!("probe-worker-{i}"))
            .build()
            .with_context(|| format!("Failed to build pool of {} workers", settings.workers()))?;

        let mut failed = false;
        let mut rounds = Vec::with_capacity(settings.rounds());

        for round in 0..settings.rounds() {
            progress.on_event(ProgressEvent::RoundStarted { round });
            let result = self.run_round(&pool, round, settings, progress)?;

            for outcome in &result.outcomes {
                progress.on_event(ProgressEvent::ProbeCollected {
                    outcome: outcome.clone(),
                });
            }

            if result.failed() {
                warn!(round, failures = result.failure_count(), "Round failed");
                failed = true;
            }
            rounds.push(result);
        }

        drop(pool);
        debug!("Worker pool shut down");

        progress.on_event(ProgressEvent::SerialStarted {
            probes: SERIAL_PROBES,
        });
        let mut serial = Vec::with_capacity(SERIAL_PROBES);
        for index in 0..SERIAL_PROBES {
            let outcome = ProbeTask::new(ProbeId::serial(index), &self.config, false)
                .run(self.codec.as_ref(), &self.diagnostics);
            if !outcome.is_success() {
                failed = true;
            }
            progress.on_event(ProgressEvent::ProbeCollected {
                outcome: outcome.clone(),
            });
            serial.push(outcome);
        }

        let summary = RunSummary {
            settings,
            rounds,
            serial,
            success: !failed,
        };
        info!(
            probes = summary.probe_count(),
            failures = summary.failures().count(),
            failed_rounds = summary.failed_rounds(),
            success = summary.success,
            "Probe run finished"
        );
        progress.on_event(ProgressEvent::Finished {
            summary: summary.clone(),
        });

        Ok(summary)
    }

    /// Fans one probe per worker out to the pool and joins all of them.
    fn run_round(
        &self,
        pool: &ThreadPool,
        round: usize,
        settings: RunSettings,
        progress: &dyn ProgressSink,
    ) -> Result<RoundResult> {
        let workers = settings.workers();
        let (tx, rx) = crossbeam_channel::bounded::<ProbeOutcome>(workers);
        let mut slots: Vec<Option<ProbeOutcome>> = vec![None; workers];

        // Returns only once every spawned probe has finished.
        pool.in_place_scope(|scope| {
            for worker in 0..workers {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let task = ProbeTask::new(
                        ProbeId::parallel(round, worker),
                        &self.config,
                        settings.synchronize(),
                    );
                    // Codec panics are outcomes already; anything else leaves the slot empty.
                    match panic::catch_unwind(AssertUnwindSafe(|| {
                        task.run(self.codec.as_ref(), &self.diagnostics)
                    })) {
                        Ok(outcome) => {
                            // The receiver outlives the scope.
                            let _ = tx.send(outcome);
                        }
                        Err(_) => error!(round, worker, "Probe panicked outside the codec"),
                    }
                });
            }
            drop(tx);
            progress.on_event(ProgressEvent::RoundSubmitted { round });

            for outcome in &rx {
                let worker = outcome.probe.worker;
                slots[worker] = Some(outcome);
            }
        });

        let mut outcomes = Vec::with_capacity(workers);
        for (worker, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(outcome) => outcomes.push(outcome),
                None => bail!("Probe ({round}, {worker}) never reported an outcome"),
            }
        }

        debug!(round, "Round collected");
        Ok(RoundResult { round, outcomes })
    }
}
