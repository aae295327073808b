//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`operations`](super::operations) module (which turns
//! a variant's policy into concrete pixel dimensions) and the
//! [`backend`](super::backend) (which does the actual decode/resize/encode).
//! This separation allows swapping codecs (e.g. for testing with a mock)
//! without changing planning logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100). Clamped on construction.
//! - [`OutputFormat`]: The encoders a variant may target: JPEG, PNG, WebP.
//! - [`ResizeMode`]: How a variant relates to its bounding box.
//! - [`Transform`]: The policy half of a variant: bounds, crop, format name, encoder knobs.
//! - [`RenderParams`]: A resolved transform: exact output size and parsed format.

use super::backend::Dimensions;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Encoders a variant can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    /// Parse a target format name. Only `jpeg`, `png` and `webp` are recognized.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }
}

/// How a variant's output size relates to its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    /// Scale down (never up) so the image fits inside the bounds.
    FitInside,
    /// Scale down to cover the bounds, then center-crop to them.
    Cover,
    /// Keep the decoded size.
    Original,
}

/// Transform policy for one variant.
///
/// `target_format` stays a plain name (derived from the source extension)
/// and is only parsed when the variant is rendered, so an unrecognized
/// format surfaces as a codec error for that variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub resize: ResizeMode,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub target_format: String,
    pub quality: Quality,
    /// zlib-style level 0-9, PNG only.
    pub compression_level: Option<u8>,
    /// Encoder effort 0-6, WebP only.
    pub effort: Option<u8>,
}

/// A transform resolved against a decoded source.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    /// Size the source is resampled to (equal to the source for no-ops).
    pub width: u32,
    pub height: u32,
    /// Centered crop applied after resampling.
    pub crop: Option<Dimensions>,
    pub format: OutputFormat,
    /// JPEG quality. [`RustCodec`](super::RustCodec) ignores it for WebP,
    /// whose encoder is lossless.
    pub quality: Quality,
    pub compression_level: Option<u8>,
    /// WebP effort; ignored by [`RustCodec`](super::RustCodec).
    pub effort: Option<u8>,
}

impl RenderParams {
    /// Final dimensions of the encoded output.
    pub fn output_dimensions(&self) -> Dimensions {
        self.crop.unwrap_or(Dimensions {
            width: self.width,
            height: self.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(80).value(), 80);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_85() {
        assert_eq!(Quality::default().value(), 85);
    }

    #[test]
    fn output_format_recognizes_three_names() {
        assert_eq!(OutputFormat::from_name("jpeg"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_name("png"), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_name("webp"), Some(OutputFormat::WebP));
        assert_eq!(OutputFormat::from_name("jpg"), None);
        assert_eq!(OutputFormat::from_name("gif"), None);
        assert_eq!(OutputFormat::from_name("tiff"), None);
    }

    #[test]
    fn output_dimensions_prefer_crop() {
        let params = RenderParams {
            width: 400,
            height: 300,
            crop: Some(Dimensions {
                width: 300,
                height: 300,
            }),
            format: OutputFormat::Jpeg,
            quality: Quality::new(80),
            compression_level: None,
            effort: None,
        };
        assert_eq!(
            params.output_dimensions(),
            Dimensions {
                width: 300,
                height: 300
            }
        );
    }
}
