//! Decode Probe Adapters - External adapters for decode-probe.
//!
//! This crate provides the adapter for the codec under test:
//! - `image` crate decoder, opened through a fresh reader per probe

pub mod image_codec;

pub use image_codec::ImageCrateCodec;
