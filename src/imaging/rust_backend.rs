//! Pure Rust codec, no system image libraries.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP, GIF, BMP, TIFF) | `image::ImageReader` with format sniffing |
//! | EXIF orientation | `kamadak-exif` + [`apply_orientation`](super::orientation::apply_orientation) |
//! | Resize | `image::imageops::resize` with `Lanczos3` filter |
//! | Crop | `DynamicImage::crop_imm`, centered |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → PNG | `PngEncoder::new_with_quality` (compression level → `CompressionType`) |
//! | Encode → WebP | `WebPEncoder::new_lossless` |
//!
//! The `image` crate's WebP encoder is lossless only, so `quality` and
//! `effort` do not change WebP output here.

use super::backend::{CodecError, Dimensions, ImageCodec};
use super::orientation::{Orientation, apply_orientation, read_orientation};
use super::params::{OutputFormat, RenderParams};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

/// Pure Rust codec using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn png_compression(level: Option<u8>) -> CompressionType {
    match level {
        Some(l) if l >= 7 => CompressionType::Best,
        Some(l) if l <= 3 => CompressionType::Fast,
        _ => CompressionType::Default,
    }
}

fn encode_failed(format: OutputFormat) -> impl FnOnce(image::ImageError) -> CodecError {
    move |e| CodecError::Encode {
        format: format.name(),
        message: e.to_string(),
    }
}

/// Encode into an in-memory buffer.
fn encode(img: &DynamicImage, params: &RenderParams) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();

    match params.format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut buf, params.quality.value());
            rgb.write_with_encoder(encoder)
                .map_err(encode_failed(params.format))?;
        }
        OutputFormat::Png => {
            let encoder = PngEncoder::new_with_quality(
                &mut buf,
                png_compression(params.compression_level),
                PngFilter::Adaptive,
            );
            img.write_with_encoder(encoder)
                .map_err(encode_failed(params.format))?;
        }
        OutputFormat::WebP => {
            // The lossless encoder accepts 8-bit RGB(A) only
            let eight_bit = if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            };
            let encoder = WebPEncoder::new_lossless(&mut buf);
            eight_bit
                .write_with_encoder(encoder)
                .map_err(encode_failed(params.format))?;
        }
    }

    Ok(buf)
}

impl ImageCodec for RustCodec {
    type Image = DynamicImage;

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError> {
        let img = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode(format!("failed to guess format: {e}")))?
            .decode()
            .map_err(|e| CodecError::Decode(e.to_string()))?;

        let orientation = read_orientation(bytes).unwrap_or(Orientation::UPRIGHT);
        Ok(apply_orientation(img, orientation))
    }

    fn dimensions(&self, image: &DynamicImage) -> Dimensions {
        Dimensions {
            width: image.width(),
            height: image.height(),
        }
    }

    fn render(&self, image: &DynamicImage, params: &RenderParams) -> Result<Vec<u8>, CodecError> {
        let resized = if (params.width, params.height) == (image.width(), image.height()) {
            None
        } else {
            Some(image.resize_exact(params.width, params.height, FilterType::Lanczos3))
        };
        let resized = resized.as_ref().unwrap_or(image);

        match params.crop {
            Some(crop) if (crop.width, crop.height) != (resized.width(), resized.height()) => {
                let x = (resized.width() - crop.width) / 2;
                let y = (resized.height() - crop.height) / 2;
                let cropped = resized.crop_imm(x, y, crop.width, crop.height);
                encode(&cropped, params)
            }
            _ => encode(resized, params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::orientation::tests::with_exif_orientation;
    use crate::imaging::params::Quality;
    use image::{ImageEncoder, RgbImage};

    /// Encode a synthetic gradient JPEG with the given dimensions.
    fn test_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut buf = Vec::new();
        JpegEncoder::new(&mut buf)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
        buf
    }

    fn params(width: u32, height: u32, format: OutputFormat) -> RenderParams {
        RenderParams {
            width,
            height,
            crop: None,
            format,
            quality: Quality::new(85),
            compression_level: None,
            effort: None,
        }
    }

    fn decoded_size(bytes: &[u8]) -> (u32, u32) {
        let img = image::load_from_memory(bytes).unwrap();
        (img.width(), img.height())
    }

    #[test]
    fn decode_synthetic_jpeg() {
        let codec = RustCodec::new();
        let img = codec.decode(&test_jpeg(200, 150)).unwrap();
        assert_eq!(codec.dimensions(&img).as_tuple(), (200, 150));
    }

    #[test]
    fn decode_applies_exif_rotation() {
        let jpeg = with_exif_orientation(&test_jpeg(400, 200), 6);
        let codec = RustCodec::new();
        let img = codec.decode(&jpeg).unwrap();
        assert_eq!(codec.dimensions(&img).as_tuple(), (200, 400));
    }

    #[test]
    fn rotated_source_renders_upright_sizes() {
        let codec = RustCodec::new();
        let img = codec
            .decode(&with_exif_orientation(&test_jpeg(400, 200), 8))
            .unwrap();

        let out = codec.render(&img, &params(100, 200, OutputFormat::Jpeg)).unwrap();

        assert_eq!(decoded_size(&out), (100, 200));
    }

    #[test]
    fn decode_garbage_errors() {
        let codec = RustCodec::new();
        assert!(matches!(
            codec.decode(b"definitely not an image"),
            Err(CodecError::Decode(_))
        ));
    }

    #[test]
    fn render_jpeg_resized() {
        let codec = RustCodec::new();
        let img = codec.decode(&test_jpeg(400, 300)).unwrap();

        let out = codec.render(&img, &params(200, 150, OutputFormat::Jpeg)).unwrap();

        assert_eq!(&out[0..2], &[0xFF, 0xD8]);
        assert_eq!(decoded_size(&out), (200, 150));
    }

    #[test]
    fn render_png_with_best_compression() {
        let codec = RustCodec::new();
        let img = codec.decode(&test_jpeg(64, 48)).unwrap();

        let mut p = params(32, 24, OutputFormat::Png);
        p.compression_level = Some(9);
        let out = codec.render(&img, &p).unwrap();

        assert_eq!(&out[0..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
        assert_eq!(decoded_size(&out), (32, 24));
    }

    #[test]
    fn webp_output_ignores_quality_and_effort() {
        let codec = RustCodec::new();
        let img = codec.decode(&test_jpeg(64, 48)).unwrap();

        let baseline = codec.render(&img, &params(64, 48, OutputFormat::WebP)).unwrap();
        let mut tuned = params(64, 48, OutputFormat::WebP);
        tuned.quality = Quality::new(10);
        tuned.effort = Some(6);

        assert_eq!(codec.render(&img, &tuned).unwrap(), baseline);
    }

    #[test]
    fn render_webp_full_size() {
        let codec = RustCodec::new();
        let img = codec.decode(&test_jpeg(120, 80)).unwrap();

        let out = codec.render(&img, &params(120, 80, OutputFormat::WebP)).unwrap();

        assert_eq!(&out[0..4], b"RIFF");
        assert_eq!(&out[8..12], b"WEBP");
        assert_eq!(decoded_size(&out), (120, 80));
    }

    #[test]
    fn render_center_crop() {
        let codec = RustCodec::new();
        let img = codec.decode(&test_jpeg(400, 300)).unwrap();

        let mut p = params(400, 300, OutputFormat::Jpeg);
        p.crop = Some(Dimensions {
            width: 300,
            height: 300,
        });
        let out = codec.render(&img, &p).unwrap();

        assert_eq!(decoded_size(&out), (300, 300));
    }

    #[test]
    fn png_compression_levels() {
        assert!(matches!(png_compression(Some(9)), CompressionType::Best));
        assert!(matches!(png_compression(Some(1)), CompressionType::Fast));
        assert!(matches!(png_compression(None), CompressionType::Default));
    }
}
