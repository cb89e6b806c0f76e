//! Stub implementations of the codec port.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use decode_probe_core::{
    Argb, DecodeError, FrameReader, ImageCodec, WarningListener, EXPECTED_PIXEL,
};
use image::{DynamicImage, RgbaImage};

/// Pixel returned by stubs that decode "wrongly".
const WRONG_PIXEL: Argb = Argb(0xff00_0000);

enum Behaviour {
    Pixel(Argb),
    Fail(String),
    Panic(String),
}

/// Tracks how many decodes overlap.
#[derive(Default)]
struct Concurrency {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completed: AtomicUsize,
}

/// Reusable meeting point for a fixed number of decodes.
///
/// Unlike `std::sync::Barrier` the wait gives up after a timeout, so a run
/// that never lets decodes overlap fails instead of hanging.
struct Rendezvous {
    parties: usize,
    timeout: Duration,
    /// Arrivals in the current generation, and the generation.
    state: Mutex<(usize, usize)>,
    all_arrived: Condvar,
}

impl Rendezvous {
    fn new(parties: usize, timeout: Duration) -> Self {
        Self {
            parties,
            timeout,
            state: Mutex::new((0, 0)),
            all_arrived: Condvar::new(),
        }
    }

    fn wait(&self) -> Result<(), DecodeError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = state.1;
        state.0 += 1;
        if state.0 >= self.parties {
            *state = (0, generation.wrapping_add(1));
            self.all_arrived.notify_all();
            return Ok(());
        }

        let (mut state, waited) = self
            .all_arrived
            .wait_timeout_while(state, self.timeout, |s| s.1 == generation)
            .unwrap_or_else(PoisonError::into_inner);
        if waited.timed_out() {
            state.0 -= 1;
            return Err(DecodeError::Decode(format!(
                "{} concurrent decodes never met within {:?}",
                self.parties, self.timeout
            )));
        }
        Ok(())
    }
}

/// Reader shared by all stubs: decodes to a solid 4x4 image.
struct StubReader<'a> {
    behaviour: Behaviour,
    warning: Option<&'a str>,
    listeners: Vec<WarningListener>,
    disposed: &'a AtomicUsize,
    concurrency: Option<(&'a Concurrency, Duration)>,
    rendezvous: Option<&'a Rendezvous>,
}

impl<'a> StubReader<'a> {
    const fn new(behaviour: Behaviour, disposed: &'a AtomicUsize) -> Self {
        Self {
            behaviour,
            warning: None,
            listeners: Vec::new(),
            disposed,
            concurrency: None,
            rendezvous: None,
        }
    }

    fn decode(&self) -> Result<DynamicImage, DecodeError> {
        if let Some(warning) = self.warning {
            for listener in &self.listeners {
                listener(warning);
            }
        }
        match &self.behaviour {
            Behaviour::Pixel(pixel) => Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                4,
                4,
                pixel.to_rgba(),
            ))),
            Behaviour::Fail(message) => Err(DecodeError::Decode(message.clone())),
            Behaviour::Panic(message) => panic!("{message}"),
        }
    }
}

impl FrameReader for StubReader<'_> {
    fn add_warning_listener(&mut self, listener: WarningListener) {
        self.listeners.push(listener);
    }

    fn read(&mut self, _index: usize) -> Result<DynamicImage, DecodeError> {
        let Some((concurrency, delay)) = self.concurrency else {
            return self.decode();
        };
        let now = concurrency.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        concurrency.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let met = self.rendezvous.map_or(Ok(()), Rendezvous::wait);
        thread::sleep(delay);
        let result = met.and_then(|()| self.decode());
        concurrency.in_flight.fetch_sub(1, Ordering::SeqCst);
        concurrency.completed.fetch_add(1, Ordering::SeqCst);
        result
    }

    fn dispose(self: Box<Self>) -> Result<(), DecodeError> {
        self.disposed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Codec that always decodes the same pixel.
pub struct FixedPixelCodec {
    pixel: Argb,
    warning: Option<String>,
    calls: AtomicUsize,
    disposed: AtomicUsize,
}

impl FixedPixelCodec {
    /// Creates a codec decoding `pixel`.
    #[must_use]
    pub const fn new(pixel: Argb) -> Self {
        Self {
            pixel,
            warning: None,
            calls: AtomicUsize::new(0),
            disposed: AtomicUsize::new(0),
        }
    }

    /// Creates a correctly behaving codec.
    #[must_use]
    pub const fn expected() -> Self {
        Self::new(EXPECTED_PIXEL)
    }

    /// Emits `warning` on every decode.
    #[must_use]
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    /// Number of readers opened.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of readers disposed.
    #[must_use]
    pub fn disposed(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl ImageCodec for FixedPixelCodec {
    fn name(&self) -> &'static str {
        "fixed-pixel"
    }

    fn open(&self, _path: &Path) -> Result<Box<dyn FrameReader + '_>, DecodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut reader = StubReader::new(Behaviour::Pixel(self.pixel), &self.disposed);
        reader.warning = self.warning.as_deref();
        Ok(Box::new(reader))
    }
}

/// Codec whose every decode fails.
pub struct FailingCodec {
    message: String,
    calls: AtomicUsize,
    disposed: AtomicUsize,
}

impl FailingCodec {
    /// Creates a codec failing with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: AtomicUsize::new(0),
            disposed: AtomicUsize::new(0),
        }
    }

    /// Number of readers opened.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of readers disposed.
    #[must_use]
    pub fn disposed(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl ImageCodec for FailingCodec {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn open(&self, _path: &Path) -> Result<Box<dyn FrameReader + '_>, DecodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubReader::new(
            Behaviour::Fail(self.message.clone()),
            &self.disposed,
        )))
    }
}

/// Codec whose every decode panics.
pub struct PanickingCodec {
    message: String,
    disposed: AtomicUsize,
}

impl PanickingCodec {
    /// Creates a codec panicking with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            disposed: AtomicUsize::new(0),
        }
    }
}

impl ImageCodec for PanickingCodec {
    fn name(&self) -> &'static str {
        "panicking"
    }

    fn open(&self, _path: &Path) -> Result<Box<dyn FrameReader + '_>, DecodeError> {
        Ok(Box::new(StubReader::new(
            Behaviour::Panic(self.message.clone()),
            &self.disposed,
        )))
    }
}

/// Codec that decodes correctly on odd-numbered calls (1st, 3rd, ...) and
/// returns a wrong pixel on even-numbered ones.
#[derive(Default)]
pub struct AlternatingCodec {
    calls: AtomicUsize,
    disposed: AtomicUsize,
}

impl AlternatingCodec {
    /// Creates the codec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of readers opened.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageCodec for AlternatingCodec {
    fn name(&self) -> &'static str {
        "alternating"
    }

    fn open(&self, _path: &Path) -> Result<Box<dyn FrameReader + '_>, DecodeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let pixel = if call % 2 == 1 { EXPECTED_PIXEL } else { WRONG_PIXEL };
        Ok(Box::new(StubReader::new(Behaviour::Pixel(pixel), &self.disposed)))
    }
}

/// Correct codec that holds each decode for a while and records how many
/// decodes were in flight at once.
pub struct CountingCodec {
    delay: Duration,
    concurrency: Concurrency,
    disposed: AtomicUsize,
}

impl CountingCodec {
    /// Creates a codec whose decodes take at least `delay`.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            concurrency: Concurrency::default(),
            disposed: AtomicUsize::new(0),
        }
    }

    /// Decodes currently running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.concurrency.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of decodes that ever ran at the same time.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.concurrency.max_in_flight.load(Ordering::SeqCst)
    }

    /// Decodes that have finished.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.concurrency.completed.load(Ordering::SeqCst)
    }
}

impl ImageCodec for CountingCodec {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn open(&self, _path: &Path) -> Result<Box<dyn FrameReader + '_>, DecodeError> {
        let mut reader = StubReader::new(Behaviour::Pixel(EXPECTED_PIXEL), &self.disposed);
        reader.concurrency = Some((&self.concurrency, self.delay));
        Ok(Box::new(reader))
    }
}

/// Correct codec whose first `gated` decodes only proceed once `parties` of
/// them are running at the same time.
///
/// With `parties` equal to the worker count, every parallel round must run
/// all of its decodes concurrently or they fail after the timeout.
pub struct RendezvousCodec {
    gated: usize,
    rendezvous: Rendezvous,
    calls: AtomicUsize,
    concurrency: Concurrency,
    disposed: AtomicUsize,
}

impl RendezvousCodec {
    /// Default time a decode waits for the others.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a codec gating the first `gated` decodes in groups of `parties`.
    #[must_use]
    pub fn new(parties: usize, gated: usize) -> Self {
        Self::with_timeout(parties, gated, Self::DEFAULT_TIMEOUT)
    }

    /// Like [`RendezvousCodec::new`] with a custom wait `timeout`.
    #[must_use]
    pub fn with_timeout(parties: usize, gated: usize, timeout: Duration) -> Self {
        Self {
            gated,
            rendezvous: Rendezvous::new(parties, timeout),
            calls: AtomicUsize::new(0),
            concurrency: Concurrency::default(),
            disposed: AtomicUsize::new(0),
        }
    }

    /// Highest number of decodes that ever ran at the same time.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.concurrency.max_in_flight.load(Ordering::SeqCst)
    }

    /// Decodes that have finished.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.concurrency.completed.load(Ordering::SeqCst)
    }
}

impl ImageCodec for RendezvousCodec {
    fn name(&self) -> &'static str {
        "rendezvous"
    }

    fn open(&self, _path: &Path) -> Result<Box<dyn FrameReader + '_>, DecodeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let mut reader = StubReader::new(Behaviour::Pixel(EXPECTED_PIXEL), &self.disposed);
        reader.concurrency = Some((&self.concurrency, Duration::ZERO));
        reader.rendezvous = (call < self.gated).then_some(&self.rendezvous);
        Ok(Box::new(reader))
    }
}
