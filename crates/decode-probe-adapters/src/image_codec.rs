//! Codec adapter backed by the `image` crate.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use decode_probe_core::{DecodeError, FrameReader, ImageCodec, WarningListener};
use image::{DynamicImage, ImageDecoder, ImageReader};
use tracing::debug;

/// Opens images with the `image` crate's format-guessing reader.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateCodec;

impl ImageCrateCodec {
    /// Creates the codec adapter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ImageCodec for ImageCrateCodec {
    fn name(&self) -> &'static str {
        "image"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn FrameReader + '_>, DecodeError> {
        let file = File::open(path).map_err(DecodeError::Open)?;
        Ok(Box::new(ImageFileReader {
            path: path.to_path_buf(),
            stream: Some(BufReader::new(file)),
            listeners: Vec::new(),
        }))
    }
}

/// Reader over a single image file.
///
/// The stream is consumed by the first read; the file is closed when the
/// reader is disposed or dropped.
struct ImageFileReader {
    path: PathBuf,
    stream: Option<BufReader<File>>,
    listeners: Vec<WarningListener>,
}

impl ImageFileReader {
    fn warn(&self, message: &str) {
        for listener in &self.listeners {
            listener(message);
        }
    }
}

impl FrameReader for ImageFileReader {
    fn add_warning_listener(&mut self, listener: WarningListener) {
        self.listeners.push(listener);
    }

    fn read(&mut self, index: usize) -> Result<DynamicImage, DecodeError> {
        if index != 0 {
            return Err(DecodeError::Decode(format!(
                "frame {index} requested, only frame 0 is supported"
            )));
        }
        let stream = self
            .stream
            .take()
            .ok_or_else(|| DecodeError::Decode("stream already consumed".into()))?;

        let reader = ImageReader::new(stream)
            .with_guessed_format()
            .map_err(|e| DecodeError::Format(e.to_string()))?;
        let Some(format) = reader.format() else {
            return Err(DecodeError::Format(format!(
                "{} is not a recognised image",
                self.path.display()
            )));
        };

        let mut decoder = reader
            .into_decoder()
            .map_err(|e| DecodeError::Decode(e.to_string()))?;

        match decoder.icc_profile() {
            Ok(Some(profile)) => debug!(bytes = profile.len(), "Embedded color profile"),
            Ok(None) => self.warn(&format!("{format:?} image has no embedded color profile")),
            Err(e) => self.warn(&format!("unreadable color profile: {e}")),
        }

        DynamicImage::from_decoder(decoder).map_err(|e| DecodeError::Decode(e.to_string()))
    }

    fn dispose(mut self: Box<Self>) -> Result<(), DecodeError> {
        self.listeners.clear();
        drop(self.stream.take());
        Ok(())
    }
}
