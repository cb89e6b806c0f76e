//! Error types for decoding and run configuration.

use serde::Serialize;
use thiserror::Error;

/// Errors reported by an [`ImageCodec`](crate::ImageCodec) or its readers.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The reference image could not be opened.
    #[error("cannot open image: {0}")]
    Open(#[source] std::io::Error),
    /// The input was not recognised as a decodable image.
    #[error("unrecognised image format: {0}")]
    Format(String),
    /// The codec failed while decoding.
    #[error("decode failed: {0}")]
    Decode(String),
    /// The decoded frame has no pixels.
    #[error("decoded frame is empty ({width}x{height})")]
    EmptyFrame {
        /// Frame width in pixels.
        width: u32,
        /// Frame height in pixels.
        height: u32,
    },
    /// Releasing the reader or its stream failed.
    #[error("release failed: {0}")]
    Release(String),
    /// The codec panicked.
    #[error("codec panicked: {0}")]
    Panicked(String),
}

impl DecodeError {
    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> DecodeErrorKind {
        match self {
            Self::Open(_) => DecodeErrorKind::Open,
            Self::Format(_) => DecodeErrorKind::Format,
            Self::Decode(_) => DecodeErrorKind::Decode,
            Self::EmptyFrame { .. } => DecodeErrorKind::EmptyFrame,
            Self::Release(_) => DecodeErrorKind::Release,
            Self::Panicked(_) => DecodeErrorKind::Panic,
        }
    }
}

/// Category of a captured decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeErrorKind {
    /// Stream could not be opened.
    Open,
    /// Format could not be determined.
    Format,
    /// Decoding failed.
    Decode,
    /// Frame without pixels.
    EmptyFrame,
    /// Reader disposal failed.
    Release,
    /// Codec panicked.
    Panic,
}

/// Invalid run settings, rejected before any worker is started.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// At least one worker is required.
    #[error("worker count must be at least 1")]
    NoWorkers,
}
