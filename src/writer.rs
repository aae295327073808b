//! Persist rendered variants.
//!
//! Every variant is written with a content-type derived from its target
//! format and a one-year immutable cache directive. The optimized variant
//! additionally carries size statistics as object metadata:
//!
//! ```text
//! original-size      500000
//! optimized-size     182311
//! compression-ratio  63.54
//! optimized-at       2024-06-01T12:00:00+00:00
//! ```
//!
//! Writes for one source run concurrently and are not retried.

use crate::imaging::ProcessedVariant;
use crate::plan::VariantKind;
use crate::storage::{ObjectStore, PutRequest, StorageError};
use chrono::{DateTime, SecondsFormat, Utc};
use rayon::prelude::*;
use std::collections::BTreeMap;

pub const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

pub const META_ORIGINAL_SIZE: &str = "original-size";
pub const META_OPTIMIZED_SIZE: &str = "optimized-size";
pub const META_COMPRESSION_RATIO: &str = "compression-ratio";
pub const META_OPTIMIZED_AT: &str = "optimized-at";

/// Content-type for a target format name (`jpeg` → `image/jpeg`, else `image/<format>`).
pub fn content_type_for(target_format: &str) -> String {
    match target_format {
        "jpeg" | "jpg" => "image/jpeg".to_string(),
        other => format!("image/{other}"),
    }
}

/// Percentage saved, formatted with two decimals.
///
/// Negative when the output grew. An empty original reports `0.00`.
pub fn compression_ratio(original: usize, optimized: usize) -> String {
    if original == 0 {
        return "0.00".to_string();
    }
    let ratio = (original as f64 - optimized as f64) / original as f64 * 100.0;
    format!("{ratio:.2}")
}

/// Metadata attached to the optimized variant.
pub fn optimization_metadata(
    original_size: usize,
    optimized_size: usize,
    optimized_at: DateTime<Utc>,
) -> BTreeMap<String, String> {
    BTreeMap::from([
        (META_ORIGINAL_SIZE.to_string(), original_size.to_string()),
        (META_OPTIMIZED_SIZE.to_string(), optimized_size.to_string()),
        (
            META_COMPRESSION_RATIO.to_string(),
            compression_ratio(original_size, optimized_size),
        ),
        (
            META_OPTIMIZED_AT.to_string(),
            optimized_at.to_rfc3339_opts(SecondsFormat::Secs, false),
        ),
    ])
}

/// Build the write for one variant.
pub fn build_put(
    variant: &ProcessedVariant,
    original_size: usize,
    processed_at: DateTime<Utc>,
) -> PutRequest {
    let metadata = match variant.spec.kind {
        VariantKind::Optimized => {
            optimization_metadata(original_size, variant.bytes.len(), processed_at)
        }
        _ => BTreeMap::new(),
    };

    PutRequest {
        key: variant.spec.destination_key.clone(),
        bytes: variant.bytes.clone(),
        content_type: content_type_for(&variant.spec.transform.target_format),
        cache_control: CACHE_CONTROL.to_string(),
        metadata,
    }
}

/// Write every variant concurrently; returns the written keys in input order.
pub fn write_variants(
    store: &impl ObjectStore,
    bucket: &str,
    variants: &[ProcessedVariant],
    original_size: usize,
    processed_at: DateTime<Utc>,
) -> Result<Vec<String>, StorageError> {
    variants
        .par_iter()
        .map(|variant| {
            let request = build_put(variant, original_size, processed_at);
            store.put(bucket, &request)?;
            tracing::debug!(
                bucket,
                key = %request.key,
                content_type = %request.content_type,
                bytes = request.bytes.len(),
                "wrote variant"
            );
            Ok(request.key)
        })
        .collect()
}
