//! Eligibility checks and the fixed variant plan.
//!
//! An uploaded object is a candidate only if all three checks pass, in order:
//!
//! 1. its key starts with the source prefix (default `original/`);
//! 2. its extension, compared case-insensitively, is one of
//!    [`SUPPORTED_EXTENSIONS`];
//! 3. the content-type reported by the store starts with `image/`.
//!
//! The first two look only at the key and run before anything is fetched;
//! the third needs the fetched object. A failed check is a [`SkipReason`],
//! never an error.
//!
//! ## Variant table
//!
//! ```text
//! optimized     optimized/<name>.<ext>        fit 1200x1200  source fmt  q85 (png: level 9)
//! thumbnail     thumbnails/<name>.<ext>       fit 300x300    source fmt  q80
//! sized-small   sizes/<name>-small.<ext>      width 320      source fmt  q85
//! sized-medium  sizes/<name>-medium.<ext>     width 640      source fmt  q85
//! sized-large   sizes/<name>-large.<ext>      width 1024     source fmt  q85
//! webp          webp/<name>.webp              full size      webp        q85, effort 6
//! ```
//!
//! Destination keys depend only on the source filename, so reprocessing the
//! same upload overwrites the same six objects.

use crate::config::HandlerConfig;
use crate::imaging::{Quality, ResizeMode, Transform};
use std::fmt;

/// Extensions accepted as source images (lower-case).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff"];

/// Media-type prefix a fetched object's content-type must carry.
pub const IMAGE_CONTENT_TYPE_PREFIX: &str = "image/";

/// Planner settings derived from the handler config.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOptions {
    pub source_prefix: String,
    /// Center-crop the thumbnail to a square instead of fitting inside it.
    pub thumbnail_crop: bool,
}

impl PlanOptions {
    pub fn from_config(config: &HandlerConfig) -> Self {
        Self {
            source_prefix: config.source_prefix.clone(),
            thumbnail_crop: config.thumbnail.crop,
        }
    }
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self::from_config(&HandlerConfig::default())
    }
}

/// Why an object was not processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    WrongPrefix { prefix: String },
    UnsupportedExtension(String),
    NotAnImage(Option<String>),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongPrefix { prefix } => write!(f, "key is outside {prefix}"),
            Self::UnsupportedExtension(ext) if ext.is_empty() => write!(f, "key has no extension"),
            Self::UnsupportedExtension(ext) => write!(f, "unsupported extension \"{ext}\""),
            Self::NotAnImage(Some(ct)) => write!(f, "content-type \"{ct}\" is not an image"),
            Self::NotAnImage(None) => write!(f, "object has no content-type"),
        }
    }
}

/// A source key that passed the key-based checks.
///
/// `filename` is the key with the source prefix removed; sub-paths under the
/// prefix are kept. `extension` keeps its original case, since destination
/// keys reuse it verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceName {
    pub filename: String,
    pub stem: String,
    pub extension: String,
}

impl SourceName {
    /// Target format name for "same as source" variants (`jpg` → `jpeg`).
    pub fn source_format(&self) -> String {
        match self.extension.to_ascii_lowercase().as_str() {
            "jpg" => "jpeg".to_string(),
            other => other.to_string(),
        }
    }

    /// Insert `-<suffix>` immediately before the final extension.
    pub fn with_suffix(&self, suffix: &str) -> String {
        format!("{}-{}.{}", self.stem, suffix, self.extension)
    }

    /// Replace the final extension.
    pub fn with_extension(&self, extension: &str) -> String {
        format!("{}.{}", self.stem, extension)
    }
}

/// Split a filename at the last `.` of its final path segment.
fn split_extension(filename: &str) -> Option<(&str, &str)> {
    let segment_start = filename.rfind('/').map_or(0, |i| i + 1);
    let dot = filename[segment_start..].rfind('.')? + segment_start;
    Some((&filename[..dot], &filename[dot + 1..]))
}

/// Checks 1 and 2: source prefix and extension.
pub fn check_key(key: &str, options: &PlanOptions) -> Result<SourceName, SkipReason> {
    let filename = key
        .strip_prefix(&options.source_prefix)
        .ok_or_else(|| SkipReason::WrongPrefix {
            prefix: options.source_prefix.clone(),
        })?;

    let (stem, extension) =
        split_extension(filename).ok_or_else(|| SkipReason::UnsupportedExtension(String::new()))?;

    let lower = extension.to_ascii_lowercase();
    if !SUPPORTED_EXTENSIONS.contains(&lower.as_str()) {
        return Err(SkipReason::UnsupportedExtension(lower));
    }

    Ok(SourceName {
        filename: filename.to_string(),
        stem: stem.to_string(),
        extension: extension.to_string(),
    })
}

/// Check 3: the fetched object's declared content-type.
pub fn check_content_type(content_type: Option<&str>) -> Result<(), SkipReason> {
    match content_type {
        Some(ct) if ct.starts_with(IMAGE_CONTENT_TYPE_PREFIX) => Ok(()),
        other => Err(SkipReason::NotAnImage(other.map(str::to_string))),
    }
}

/// The fixed set of variants produced for every eligible source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Optimized,
    Thumbnail,
    SizedSmall,
    SizedMedium,
    SizedLarge,
    WebP,
}

impl VariantKind {
    pub const ALL: [VariantKind; 6] = [
        Self::Optimized,
        Self::Thumbnail,
        Self::SizedSmall,
        Self::SizedMedium,
        Self::SizedLarge,
        Self::WebP,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Optimized => "optimized",
            Self::Thumbnail => "thumbnail",
            Self::SizedSmall => "sized-small",
            Self::SizedMedium => "sized-medium",
            Self::SizedLarge => "sized-large",
            Self::WebP => "webp",
        }
    }

    pub fn output_prefix(self) -> &'static str {
        match self {
            Self::Optimized => "optimized/",
            Self::Thumbnail => "thumbnails/",
            Self::SizedSmall | Self::SizedMedium | Self::SizedLarge => "sizes/",
            Self::WebP => "webp/",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One planned output: what to render and where it goes.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantSpec {
    pub kind: VariantKind,
    pub transform: Transform,
    pub destination_key: String,
}

fn same_format(
    source: &SourceName,
    resize: ResizeMode,
    bounds: (Option<u32>, Option<u32>),
    quality: u8,
) -> Transform {
    Transform {
        resize,
        max_width: bounds.0,
        max_height: bounds.1,
        target_format: source.source_format(),
        quality: Quality::new(quality),
        compression_level: None,
        effort: None,
    }
}

/// Plan one variant for a source.
pub fn plan_variant(kind: VariantKind, source: &SourceName, options: &PlanOptions) -> VariantSpec {
    let (transform, name) = match kind {
        VariantKind::Optimized => {
            let mut transform =
                same_format(source, ResizeMode::FitInside, (Some(1200), Some(1200)), 85);
            if transform.target_format == "png" {
                transform.compression_level = Some(9);
            }
            (transform, source.filename.clone())
        }
        VariantKind::Thumbnail => {
            let mode = if options.thumbnail_crop {
                ResizeMode::Cover
            } else {
                ResizeMode::FitInside
            };
            (
                same_format(source, mode, (Some(300), Some(300)), 80),
                source.filename.clone(),
            )
        }
        VariantKind::SizedSmall => (sized(source, 320), source.with_suffix("small")),
        VariantKind::SizedMedium => (sized(source, 640), source.with_suffix("medium")),
        VariantKind::SizedLarge => (sized(source, 1024), source.with_suffix("large")),
        VariantKind::WebP => (
            Transform {
                resize: ResizeMode::Original,
                max_width: None,
                max_height: None,
                target_format: "webp".to_string(),
                quality: Quality::new(85),
                compression_level: None,
                effort: Some(6),
            },
            source.with_extension("webp"),
        ),
    };

    VariantSpec {
        kind,
        destination_key: format!("{}{}", kind.output_prefix(), name),
        transform,
    }
}

fn sized(source: &SourceName, width: u32) -> Transform {
    same_format(source, ResizeMode::FitInside, (Some(width), None), 85)
}

/// Plan every variant for a source, in table order.
pub fn plan_variants(source: &SourceName, options: &PlanOptions) -> Vec<VariantSpec> {
    VariantKind::ALL
        .iter()
        .map(|&kind| plan_variant(kind, source, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(key: &str) -> SourceName {
        check_key(key, &PlanOptions::default()).unwrap()
    }

    fn keys(specs: &[VariantSpec]) -> Vec<&str> {
        specs.iter().map(|s| s.destination_key.as_str()).collect()
    }

    // =========================================================================
    // Eligibility
    // =========================================================================

    #[test]
    fn key_outside_prefix_is_skipped() {
        let result = check_key("thumbnails/x.jpg", &PlanOptions::default());
        assert_eq!(
            result,
            Err(SkipReason::WrongPrefix {
                prefix: "original/".to_string()
            })
        );
    }

    #[test]
    fn unsupported_extension_is_skipped() {
        assert_eq!(
            check_key("original/doc.pdf", &PlanOptions::default()),
            Err(SkipReason::UnsupportedExtension("pdf".to_string()))
        );
    }

    #[test]
    fn missing_extension_is_skipped() {
        assert_eq!(
            check_key("original/README", &PlanOptions::default()),
            Err(SkipReason::UnsupportedExtension(String::new()))
        );
        // a dot in a directory name is not an extension
        assert_eq!(
            check_key("original/v1.2/README", &PlanOptions::default()),
            Err(SkipReason::UnsupportedExtension(String::new()))
        );
    }

    #[test]
    fn every_supported_extension_is_accepted_in_any_case() {
        for ext in SUPPORTED_EXTENSIONS {
            assert!(check_key(&format!("original/a.{ext}"), &PlanOptions::default()).is_ok());
            let upper = ext.to_ascii_uppercase();
            assert!(check_key(&format!("original/a.{upper}"), &PlanOptions::default()).is_ok());
        }
    }

    #[test]
    fn content_type_must_be_image() {
        assert!(check_content_type(Some("image/jpeg")).is_ok());
        assert_eq!(
            check_content_type(Some("text/plain")),
            Err(SkipReason::NotAnImage(Some("text/plain".to_string())))
        );
        assert_eq!(check_content_type(None), Err(SkipReason::NotAnImage(None)));
    }

    #[test]
    fn custom_prefix_is_honored() {
        let options = PlanOptions {
            source_prefix: "uploads/".to_string(),
            thumbnail_crop: false,
        };
        assert!(check_key("uploads/a.png", &options).is_ok());
        assert!(check_key("original/a.png", &options).is_err());
    }

    #[test]
    fn skip_reasons_display() {
        assert_eq!(
            SkipReason::UnsupportedExtension("pdf".into()).to_string(),
            "unsupported extension \"pdf\""
        );
        assert_eq!(
            SkipReason::NotAnImage(Some("text/plain".into())).to_string(),
            "content-type \"text/plain\" is not an image"
        );
    }

    // =========================================================================
    // Naming
    // =========================================================================

    #[test]
    fn destination_keys_for_jpg() {
        let specs = plan_variants(&source("original/photo.jpg"), &PlanOptions::default());
        assert_eq!(
            keys(&specs),
            vec![
                "optimized/photo.jpg",
                "thumbnails/photo.jpg",
                "sizes/photo-small.jpg",
                "sizes/photo-medium.jpg",
                "sizes/photo-large.jpg",
                "webp/photo.webp",
            ]
        );
    }

    #[test]
    fn upper_case_extension_is_preserved() {
        let specs = plan_variants(&source("original/photo.JPG"), &PlanOptions::default());
        assert_eq!(
            keys(&specs)[2..],
            [
                "sizes/photo-small.JPG",
                "sizes/photo-medium.JPG",
                "sizes/photo-large.JPG",
                "webp/photo.webp",
            ]
        );
    }

    #[test]
    fn suffix_goes_before_last_extension_only() {
        let name = source("original/my.holiday.photo.png");
        assert_eq!(name.stem, "my.holiday.photo");
        assert_eq!(name.with_suffix("small"), "my.holiday.photo-small.png");
    }

    #[test]
    fn nested_paths_are_kept() {
        let specs = plan_variants(&source("original/2024/06/beach.jpeg"), &PlanOptions::default());
        assert_eq!(specs[0].destination_key, "optimized/2024/06/beach.jpeg");
        assert_eq!(specs[3].destination_key, "sizes/2024/06/beach-medium.jpeg");
        assert_eq!(specs[5].destination_key, "webp/2024/06/beach.webp");
    }

    #[test]
    fn planning_is_deterministic() {
        let name = source("original/photo.jpg");
        let first = plan_variants(&name, &PlanOptions::default());
        let second = plan_variants(&name, &PlanOptions::default());
        assert_eq!(first, second);
    }

    // =========================================================================
    // Transforms
    // =========================================================================

    #[test]
    fn jpg_targets_jpeg() {
        let specs = plan_variants(&source("original/photo.JPG"), &PlanOptions::default());
        for spec in &specs[..5] {
            assert_eq!(spec.transform.target_format, "jpeg");
        }
        assert_eq!(specs[5].transform.target_format, "webp");
    }

    #[test]
    fn table_bounds_and_quality() {
        let specs = plan_variants(&source("original/photo.jpg"), &PlanOptions::default());
        let summary: Vec<_> = specs
            .iter()
            .map(|s| {
                (
                    s.kind,
                    s.transform.resize,
                    s.transform.max_width,
                    s.transform.max_height,
                    s.transform.quality.value(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                (VariantKind::Optimized, ResizeMode::FitInside, Some(1200), Some(1200), 85),
                (VariantKind::Thumbnail, ResizeMode::FitInside, Some(300), Some(300), 80),
                (VariantKind::SizedSmall, ResizeMode::FitInside, Some(320), None, 85),
                (VariantKind::SizedMedium, ResizeMode::FitInside, Some(640), None, 85),
                (VariantKind::SizedLarge, ResizeMode::FitInside, Some(1024), None, 85),
                (VariantKind::WebP, ResizeMode::Original, None, None, 85),
            ]
        );
        assert_eq!(specs[5].transform.effort, Some(6));
    }

    #[test]
    fn png_optimized_uses_max_compression() {
        let specs = plan_variants(&source("original/logo.png"), &PlanOptions::default());
        assert_eq!(specs[0].transform.compression_level, Some(9));
        assert_eq!(specs[1].transform.compression_level, None);
    }

    #[test]
    fn jpeg_optimized_has_no_compression_level() {
        let specs = plan_variants(&source("original/photo.jpg"), &PlanOptions::default());
        assert_eq!(specs[0].transform.compression_level, None);
    }

    #[test]
    fn thumbnail_crop_option_switches_mode() {
        let options = PlanOptions {
            thumbnail_crop: true,
            ..PlanOptions::default()
        };
        let spec = plan_variant(VariantKind::Thumbnail, &source("original/photo.jpg"), &options);
        assert_eq!(spec.transform.resize, ResizeMode::Cover);
        assert_eq!(spec.destination_key, "thumbnails/photo.jpg");
    }
}
