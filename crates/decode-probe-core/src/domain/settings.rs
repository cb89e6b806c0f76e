//! Run settings.

use serde::Serialize;

use super::SettingsError;

/// Number of probes run on the caller's thread after the parallel rounds.
pub const SERIAL_PROBES: usize = 10;

/// Validated settings for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSettings {
    workers: usize,
    rounds: usize,
    synchronize: bool,
}

impl RunSettings {
    /// Creates settings for `workers` parallel workers and `rounds` parallel rounds.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NoWorkers`] if `workers` is zero.
    pub const fn new(workers: usize, rounds: usize, synchronize: bool) -> Result<Self, SettingsError> {
        if workers == 0 {
            return Err(SettingsError::NoWorkers);
        }
        Ok(Self {
            workers,
            rounds,
            synchronize,
        })
    }

    /// Worker pool size, also the number of probes per round.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Number of parallel rounds.
    #[must_use]
    pub const fn rounds(&self) -> usize {
        self.rounds
    }

    /// Whether every decode is serialized behind the decode guard.
    #[must_use]
    pub const fn synchronize(&self) -> bool {
        self.synchronize
    }

    /// Total number of probes a run performs, serial phase included.
    #[must_use]
    pub const fn total_probes(&self) -> usize {
        self.workers * self.rounds + SERIAL_PROBES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_workers_rejected() {
        assert_eq!(RunSettings::new(0, 3, false), Err(SettingsError::NoWorkers));
    }

    #[test]
    fn test_zero_rounds_allowed() {
        let settings = RunSettings::new(2, 0, true);
        assert!(settings.is_ok_and(|s| s.total_probes() == SERIAL_PROBES));
    }

    #[test]
    fn test_total_probes_counts_serial_phase() {
        let settings = RunSettings::new(4, 5, false);
        assert!(settings.is_ok_and(|s| s.total_probes() == 30));
    }
}
