//! Reference image fixtures written to temporary directories.

use std::io;
use std::path::{Path, PathBuf};

use decode_probe_core::{Argb, EXPECTED_PIXEL};
use image::{ImageResult, RgbaImage};
use tempfile::TempDir;

/// Builder for reference images on disk.
///
/// PNG fixtures are lossless, so the first pixel decodes to exactly the
/// value the builder was given.
pub struct ReferenceImageBuilder {
    corner: Argb,
    width: u32,
    height: u32,
}

impl ReferenceImageBuilder {
    /// Starts a fixture whose (0,0) pixel is the expected reference value.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            corner: EXPECTED_PIXEL,
            width: 16,
            height: 16,
        }
    }

    /// Sets the (0,0) pixel.
    #[must_use]
    pub const fn corner(mut self, pixel: Argb) -> Self {
        self.corner = pixel;
        self
    }

    /// Sets the image size.
    #[must_use]
    pub const fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Builds the image in memory. Every pixel but (0,0) is mid gray.
    #[must_use]
    pub fn build(&self) -> RgbaImage {
        let corner = self.corner.to_rgba();
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            if x == 0 && y == 0 {
                corner
            } else {
                image::Rgba([128, 128, 128, 255])
            }
        })
    }

    /// Writes the image to `path`; the format follows the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn write_to(&self, path: &Path) -> ImageResult<()> {
        self.build().save(path)
    }

    /// Writes `name` into a fresh temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the image cannot be created.
    pub fn write_temp(&self, name: &str) -> io::Result<(TempDir, PathBuf)> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(name);
        self.write_to(&path).map_err(io::Error::other)?;
        Ok((dir, path))
    }
}

impl Default for ReferenceImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}
