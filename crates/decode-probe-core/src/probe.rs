//! A single decode-and-compare probe.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use image::{DynamicImage, GenericImageView};
use tracing::trace;

use crate::domain::{Argb, DecodeError, Outcome, ProbeId, ProbeOutcome, EXPECTED_PIXEL};
use crate::ports::{Diagnostic, DiagnosticSink, ImageCodec};

/// Run-wide lock that serializes decodes when a run is synchronized.
///
/// Cloning yields another handle to the same lock.
#[derive(Debug, Clone, Default)]
pub struct DecodeGuard(Arc<Mutex<()>>);

impl DecodeGuard {
    /// Creates a new, unlocked guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// What every probe of a run shares.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Image each probe decodes.
    pub reference: PathBuf,
    /// Pixel expected at (0,0).
    pub expected: Argb,
    /// Lock taken by synchronized probes.
    pub guard: DecodeGuard,
}

impl ProbeConfig {
    /// Creates a configuration for `reference` with a fresh decode guard.
    #[must_use]
    pub fn new(reference: impl Into<PathBuf>) -> Self {
        Self {
            reference: reference.into(),
            expected: EXPECTED_PIXEL,
            guard: DecodeGuard::new(),
        }
    }
}

/// One decode-and-compare attempt.
#[derive(Debug, Clone, Copy)]
pub struct ProbeTask<'a> {
    id: ProbeId,
    config: &'a ProbeConfig,
    synchronize: bool,
}

impl<'a> ProbeTask<'a> {
    /// Creates a probe. With `synchronize` set, the decode runs under the config's guard.
    #[must_use]
    pub const fn new(id: ProbeId, config: &'a ProbeConfig, synchronize: bool) -> Self {
        Self {
            id,
            config,
            synchronize,
        }
    }

    /// Decodes the reference image and checks its first pixel.
    ///
    /// Never fails: codec errors and panics are captured in the returned outcome,
    /// and any mismatch or error is also reported to `diagnostics`.
    pub fn run(
        &self,
        codec: &dyn ImageCodec,
        diagnostics: &Arc<dyn DiagnosticSink>,
    ) -> ProbeOutcome {
        trace!(round = self.id.round, worker = self.id.worker, "probe started");

        let decoded = {
            let _guard = self.synchronize.then(|| self.config.guard.lock());
            self.decode(codec, diagnostics)
        };

        let outcome = match decoded.and_then(|image| corner_pixel(&image)) {
            Ok(pixel) => Outcome::compare(pixel, self.config.expected),
            Err(e) => Outcome::from(e),
        };

        match &outcome {
            Outcome::Match { .. } => {}
            Outcome::Mismatch { observed, expected } => diagnostics.report(Diagnostic::Mismatch {
                probe: self.id,
                observed: *observed,
                expected: *expected,
            }),
            Outcome::Error { message, .. } => diagnostics.report(Diagnostic::Error {
                probe: self.id,
                path: self.config.reference.clone(),
                message: message.clone(),
            }),
        }

        ProbeOutcome {
            probe: self.id,
            outcome,
        }
    }

    fn decode(
        &self,
        codec: &dyn ImageCodec,
        diagnostics: &Arc<dyn DiagnosticSink>,
    ) -> Result<DynamicImage, DecodeError> {
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut reader = codec.open(&self.config.reference)?;

            let sink = Arc::clone(diagnostics);
            let probe = self.id;
            reader.add_warning_listener(Arc::new(move |message: &str| {
                sink.report(Diagnostic::Warning {
                    probe,
                    message: message.to_owned(),
                });
            }));

            // Release even when the read failed; a read error wins over a release error.
            let decoded = reader.read(0);
            let released = reader.dispose();
            let image = decoded?;
            released?;
            Ok(image)
        }));

        attempt.unwrap_or_else(|payload| Err(DecodeError::Panicked(panic_message(payload.as_ref()))))
    }
}

/// Reads the pixel at (0,0).
fn corner_pixel(image: &DynamicImage) -> Result<Argb, DecodeError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyFrame { width, height });
    }
    Ok(Argb::from_rgba(image.get_pixel(0, 0)))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("unknown panic payload"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use image::RgbaImage;

    use super::*;
    use crate::domain::DecodeErrorKind;
    use crate::ports::{FrameReader, WarningListener};

    enum Behaviour {
        Pixel(Argb),
        Empty,
        ReadFails,
        ReleaseFails,
        Panics,
    }

    struct StubCodec {
        behaviour: Behaviour,
        disposed: AtomicUsize,
        dropped: AtomicUsize,
    }

    impl StubCodec {
        fn new(behaviour: Behaviour) -> Self {
            Self {
                behaviour,
                disposed: AtomicUsize::new(0),
                dropped: AtomicUsize::new(0),
            }
        }
    }

    struct StubReader<'a> {
        codec: &'a StubCodec,
        listeners: Vec<WarningListener>,
    }

    impl Drop for StubReader<'_> {
        fn drop(&mut self) {
            self.codec.dropped.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl FrameReader for StubReader<'_> {
        fn add_warning_listener(&mut self, listener: WarningListener) {
            self.listeners.push(listener);
        }

        fn read(&mut self, _index: usize) -> Result<DynamicImage, DecodeError> {
            for listener in &self.listeners {
                listener("stub warning");
            }
            match self.codec.behaviour {
                Behaviour::Pixel(pixel) => Ok(solid(pixel)),
                Behaviour::ReleaseFails => Ok(solid(EXPECTED_PIXEL)),
                Behaviour::Empty => Ok(DynamicImage::new_rgba8(0, 0)),
                Behaviour::ReadFails => Err(DecodeError::Decode("corrupt stream".into())),
                Behaviour::Panics => panic!("native state corrupted"),
            }
        }

        fn dispose(self: Box<Self>) -> Result<(), DecodeError> {
            self.codec.disposed.fetch_add(1, Ordering::SeqCst);
            if matches!(self.codec.behaviour, Behaviour::ReleaseFails) {
                return Err(DecodeError::Release("stream already closed".into()));
            }
            Ok(())
        }
    }

    impl ImageCodec for StubCodec {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn open(&self, _path: &Path) -> Result<Box<dyn FrameReader + '_>, DecodeError> {
            Ok(Box::new(StubReader {
                codec: self,
                listeners: Vec::new(),
            }))
        }
    }

    fn solid(pixel: Argb) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, pixel.to_rgba()))
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Diagnostic>>);

    impl DiagnosticSink for Recorder {
        fn report(&self, diagnostic: Diagnostic) {
            self.0.lock().unwrap().push(diagnostic);
        }
    }

    fn run_probe(codec: &StubCodec, synchronize: bool) -> (ProbeOutcome, Vec<Diagnostic>) {
        let recorder = Arc::new(Recorder::default());
        let sink: Arc<dyn DiagnosticSink> = recorder.clone();
        let config = ProbeConfig::new("reference.jpg");
        let outcome = ProbeTask::new(ProbeId::parallel(1, 2), &config, synchronize).run(codec, &sink);
        let diagnostics = recorder.0.lock().unwrap().clone();
        (outcome, diagnostics)
    }

    #[test]
    fn test_matching_pixel_succeeds() {
        let codec = StubCodec::new(Behaviour::Pixel(EXPECTED_PIXEL));
        let (outcome, diagnostics) = run_probe(&codec, true);
        assert!(outcome.is_success());
        assert_eq!(outcome.probe, ProbeId::parallel(1, 2));
        // Only the codec warning is forwarded.
        assert_eq!(
            diagnostics,
            vec![Diagnostic::Warning {
                probe: ProbeId::parallel(1, 2),
                message: "stub warning".into(),
            }]
        );
        assert_eq!(codec.disposed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_wrong_pixel_reports_mismatch() {
        let codec = StubCodec::new(Behaviour::Pixel(Argb(0xff00_0000)));
        let (outcome, diagnostics) = run_probe(&codec, false);
        assert_eq!(
            outcome.outcome,
            Outcome::Mismatch {
                observed: Argb(0xff00_0000),
                expected: EXPECTED_PIXEL,
            }
        );
        assert!(diagnostics.contains(&Diagnostic::Mismatch {
            probe: ProbeId::parallel(1, 2),
            observed: Argb(0xff00_0000),
            expected: EXPECTED_PIXEL,
        }));
    }

    #[test]
    fn test_read_error_is_captured_and_reader_disposed() {
        let codec = StubCodec::new(Behaviour::ReadFails);
        let (outcome, diagnostics) = run_probe(&codec, false);
        assert!(matches!(
            outcome.outcome,
            Outcome::Error {
                kind: DecodeErrorKind::Decode,
                ..
            }
        ));
        assert_eq!(codec.disposed.load(Ordering::SeqCst), 1);
        assert!(diagnostics.iter().any(|d| matches!(
            d,
            Diagnostic::Error { path, message, .. }
                if path == Path::new("reference.jpg") && message.contains("corrupt stream")
        )));
    }

    #[test]
    fn test_release_error_fails_probe() {
        let codec = StubCodec::new(Behaviour::ReleaseFails);
        let (outcome, _) = run_probe(&codec, false);
        assert!(matches!(
            outcome.outcome,
            Outcome::Error {
                kind: DecodeErrorKind::Release,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_frame_is_an_error() {
        let codec = StubCodec::new(Behaviour::Empty);
        let (outcome, _) = run_probe(&codec, false);
        assert!(matches!(
            outcome.outcome,
            Outcome::Error {
                kind: DecodeErrorKind::EmptyFrame,
                ..
            }
        ));
    }

    #[test]
    fn test_panic_is_captured_and_reader_released() {
        let codec = StubCodec::new(Behaviour::Panics);
        let (outcome, _) = run_probe(&codec, true);
        match outcome.outcome {
            Outcome::Error { kind, message } => {
                assert_eq!(kind, DecodeErrorKind::Panic);
                assert!(message.contains("native state corrupted"));
            }
            other => panic!("expected captured panic, got {other:?}"),
        }
        assert_eq!(codec.dropped.load(Ordering::SeqCst), 1);
        assert_eq!(codec.disposed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_guard_released_after_panic() {
        let codec = StubCodec::new(Behaviour::Panics);
        let config = ProbeConfig::new("reference.jpg");
        let sink: Arc<dyn DiagnosticSink> = Arc::new(Recorder::default());
        let _ = ProbeTask::new(ProbeId::serial(0), &config, true).run(&codec, &sink);
        assert!(config.guard.0.try_lock().is_ok());
    }
}
