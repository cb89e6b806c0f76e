//! Image codec port.
//!
//! Models a codec that hands out a fresh reader per decode. The thread-safety of
//! whatever state those readers share is exactly what the probe exercises, so
//! implementations must not add locking of their own.

use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;

use crate::domain::DecodeError;

/// Callback receiving warnings emitted by a reader while decoding.
pub type WarningListener = Arc<dyn Fn(&str) + Send + Sync>;

/// Port for the image codec under test.
pub trait ImageCodec: Send + Sync {
    /// Returns the name of this codec.
    fn name(&self) -> &'static str;

    /// Opens `path` and returns a new reader over it.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Open`] if the input cannot be opened.
    fn open(&self, path: &Path) -> Result<Box<dyn FrameReader + '_>, DecodeError>;
}

/// A reader bound to one input stream.
///
/// Dropping a reader releases it; [`FrameReader::dispose`] does the same but
/// reports release failures.
pub trait FrameReader {
    /// Registers a listener for decode warnings.
    fn add_warning_listener(&mut self, listener: WarningListener);

    /// Decodes frame `index` into memory.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the frame cannot be decoded.
    fn read(&mut self, index: usize) -> Result<DynamicImage, DecodeError>;

    /// Releases the reader and closes its stream.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Release`] if the release fails.
    fn dispose(self: Box<Self>) -> Result<(), DecodeError>;
}
