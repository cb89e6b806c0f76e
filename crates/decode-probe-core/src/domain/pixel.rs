//! Packed pixel values and the reference constants.

use std::fmt;

use image::Rgba;
use serde::{Serialize, Serializer};

/// Default location of the reference image, relative to the working directory.
pub const REFERENCE_IMAGE: &str = "testImage_sRGB.jpg";

/// Value the pixel at (0,0) of the reference image decodes to when the codec behaves.
pub const EXPECTED_PIXEL: Argb = Argb(0xff01_0103);

/// A pixel packed as `0xAARRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Argb(pub u32);

impl Argb {
    /// Packs an RGBA pixel.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn from_rgba(pixel: Rgba<u8>) -> Self {
        let [r, g, b, a] = pixel.0;
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// Unpacks into an RGBA pixel.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn to_rgba(self) -> Rgba<u8> {
        let v = self.0;
        Rgba([(v >> 16) as u8, (v >> 8) as u8, v as u8, (v >> 24) as u8])
    }
}

impl fmt::Display for Argb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl fmt::LowerHex for Argb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl Serialize for Argb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("0x{:08x}", self.0))
    }
}
