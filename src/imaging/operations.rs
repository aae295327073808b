//! High-level image operations.
//!
//! These functions combine calculations with codec execution: resolve a
//! variant's [`Transform`] against the decoded source, then hand the
//! resulting [`RenderParams`] to the codec. All variants of one source render
//! concurrently on the rayon pool.

use super::backend::{CodecError, Dimensions, ImageCodec};
use super::calculations::{cover_crop, fit_inside};
use super::params::{OutputFormat, RenderParams, ResizeMode, Transform};
use crate::plan::VariantSpec;
use rayon::prelude::*;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// One rendered variant, ready to be written.
#[derive(Debug, Clone)]
pub struct ProcessedVariant {
    pub spec: VariantSpec,
    pub bytes: Vec<u8>,
    pub dimensions: Dimensions,
}

impl ProcessedVariant {
    pub fn destination_key(&self) -> &str {
        &self.spec.destination_key
    }
}

/// Resolve a transform against the source size without executing it.
///
/// Fails with [`CodecError::UnsupportedFormat`] when the target format is not
/// one the codec can encode.
pub fn plan_render(source: Dimensions, transform: &Transform) -> Result<RenderParams> {
    let format = OutputFormat::from_name(&transform.target_format)
        .ok_or_else(|| CodecError::UnsupportedFormat(transform.target_format.clone()))?;

    let src = source.as_tuple();
    let ((width, height), crop) = match transform.resize {
        ResizeMode::Original => (src, None),
        ResizeMode::FitInside => (
            fit_inside(src, transform.max_width, transform.max_height),
            None,
        ),
        ResizeMode::Cover => {
            let target = (
                transform.max_width.unwrap_or(source.width),
                transform.max_height.unwrap_or(source.height),
            );
            let plan = cover_crop(src, target);
            let crop = Dimensions {
                width: plan.crop.0,
                height: plan.crop.1,
            };
            (plan.resize, Some(crop))
        }
    };

    Ok(RenderParams {
        width,
        height,
        crop,
        format,
        quality: transform.quality,
        compression_level: transform.compression_level,
        effort: transform.effort,
    })
}

/// Render one variant from a decoded source.
pub fn render_variant<C: ImageCodec>(
    codec: &C,
    image: &C::Image,
    spec: &VariantSpec,
) -> Result<ProcessedVariant> {
    let params = plan_render(codec.dimensions(image), &spec.transform)?;
    let bytes = codec.render(image, &params)?;
    tracing::debug!(
        variant = %spec.kind,
        key = %spec.destination_key,
        width = params.output_dimensions().width,
        height = params.output_dimensions().height,
        bytes = bytes.len(),
        "rendered variant"
    );
    Ok(ProcessedVariant {
        spec: spec.clone(),
        bytes,
        dimensions: params.output_dimensions(),
    })
}

/// Render every variant concurrently.
///
/// Output order matches `specs`. The first failure is returned; variants
/// already rendered are discarded.
pub fn render_variants<C: ImageCodec>(
    codec: &C,
    image: &C::Image,
    specs: &[VariantSpec],
) -> Result<Vec<ProcessedVariant>> {
    specs
        .par_iter()
        .map(|spec| render_variant(codec, image, spec))
        .collect()
}
