//! Image codec trait and shared types.
//!
//! The [`ImageCodec`] trait is the capability the pipeline receives
//! explicitly: decode a source once, report its size, render one variant from
//! it. Nothing in the pipeline reaches for a process-wide codec context.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_backend::RustCodec), pure Rust, no system
//! libraries. Tests substitute the recording mock in [`tests`].

use super::params::RenderParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to decode source image: {0}")]
    Decode(String),
    #[error("Unsupported target format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to encode {format}: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Trait for image codecs.
///
/// `decode` applies EXIF orientation, so every image handed to `render` is
/// already upright. `render` must not mutate the decoded image: variants are
/// rendered concurrently from one shared decode.
pub trait ImageCodec: Sync {
    /// Decoded, upright source image.
    type Image: Sync;

    /// Decode source bytes and apply EXIF orientation.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Image, CodecError>;

    /// Dimensions of a decoded image.
    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    /// Resample, optionally crop, and encode one variant.
    fn render(&self, image: &Self::Image, params: &RenderParams) -> Result<Vec<u8>, CodecError>;
}
