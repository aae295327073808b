//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Scale `source` by `scale`, rounding and keeping at least one pixel per side.
fn apply_scale(source: (u32, u32), scale: f64) -> (u32, u32) {
    let (src_w, src_h) = source;
    let w = (src_w as f64 * scale).round() as u32;
    let h = (src_h as f64 * scale).round() as u32;
    (w.max(1), h.max(1))
}

/// Calculate fit-inside dimensions without enlargement.
///
/// Either bound may be absent (unconstrained). If the source already fits,
/// it is returned unchanged; otherwise it is scaled down preserving aspect
/// ratio so the constraining side equals its bound.
///
/// # Examples
/// ```
/// # use variant_forge::imaging::fit_inside;
/// // 2000x1500 inside a 1200 box → 1200x900
/// assert_eq!(fit_inside((2000, 1500), Some(1200), Some(1200)), (1200, 900));
///
/// // width-only bound, height follows
/// assert_eq!(fit_inside((2000, 1500), Some(320), None), (320, 240));
///
/// // never enlarge
/// assert_eq!(fit_inside((200, 100), Some(300), Some(300)), (200, 100));
/// ```
pub fn fit_inside(source: (u32, u32), max_width: Option<u32>, max_height: Option<u32>) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 {
        return source;
    }

    let scale_w = max_width.map_or(1.0, |w| w as f64 / src_w as f64);
    let scale_h = max_height.map_or(1.0, |h| h as f64 / src_h as f64);
    let scale = scale_w.min(scale_h);

    if scale >= 1.0 {
        source
    } else {
        apply_scale(source, scale)
    }
}

/// Resample and crop sizes for a cover-and-center-crop operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverPlan {
    /// Size the source is resampled to before cropping.
    pub resize: (u32, u32),
    /// Final crop box.
    pub crop: (u32, u32),
}

/// Calculate a cover crop without enlargement.
///
/// The crop box is the target clamped to the source, so small sources are
/// cropped but never upscaled. The resample size covers the crop box
/// completely: one side matches exactly, the other may exceed.
pub fn cover_crop(source: (u32, u32), target: (u32, u32)) -> CoverPlan {
    let (src_w, src_h) = source;
    let crop = (target.0.min(src_w).max(1), target.1.min(src_h).max(1));
    if src_w == 0 || src_h == 0 {
        return CoverPlan {
            resize: source,
            crop,
        };
    }

    let scale_w = crop.0 as f64 / src_w as f64;
    let scale_h = crop.1 as f64 / src_h as f64;
    let scale = scale_w.max(scale_h);

    let (w, h) = apply_scale(source, scale);
    CoverPlan {
        // rounding can land one pixel short of the crop box
        resize: (w.max(crop.0), h.max(crop.1)),
        crop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // fit_inside tests
    // =========================================================================

    #[test]
    fn fit_landscape_into_box() {
        assert_eq!(fit_inside((2000, 1500), Some(1200), Some(1200)), (1200, 900));
    }

    #[test]
    fn fit_portrait_into_box() {
        assert_eq!(fit_inside((1500, 2000), Some(300), Some(300)), (225, 300));
    }

    #[test]
    fn fit_width_only() {
        assert_eq!(fit_inside((2000, 1500), Some(640), None), (640, 480));
        assert_eq!(fit_inside((2000, 1500), Some(1024), None), (1024, 768));
    }

    #[test]
    fn fit_width_only_ignores_tall_height() {
        // 500x4000: width 320 bound → height follows, unconstrained
        assert_eq!(fit_inside((500, 4000), Some(320), None), (320, 2560));
    }

    #[test]
    fn fit_never_enlarges() {
        assert_eq!(fit_inside((200, 100), Some(300), Some(300)), (200, 100));
        assert_eq!(fit_inside((300, 300), Some(300), Some(300)), (300, 300));
        assert_eq!(fit_inside((100, 50), Some(320), None), (100, 50));
    }

    #[test]
    fn fit_without_bounds_is_identity() {
        assert_eq!(fit_inside((4000, 3000), None, None), (4000, 3000));
    }

    #[test]
    fn fit_keeps_at_least_one_pixel() {
        assert_eq!(fit_inside((10000, 10), Some(100), Some(100)), (100, 1));
    }

    #[test]
    fn fit_preserves_aspect_within_rounding() {
        let (w, h) = fit_inside((3001, 1999), Some(1200), Some(1200));
        assert_eq!(w, 1200);
        let expected = 1999.0 * 1200.0 / 3001.0;
        assert!((h as f64 - expected).abs() <= 1.0);
    }

    // =========================================================================
    // cover_crop tests
    // =========================================================================

    #[test]
    fn cover_wider_source() {
        // 2000x1500 → cover 300x300: height matches, width exceeds
        let plan = cover_crop((2000, 1500), (300, 300));
        assert_eq!(plan.resize, (400, 300));
        assert_eq!(plan.crop, (300, 300));
    }

    #[test]
    fn cover_taller_source() {
        let plan = cover_crop((600, 800), (300, 300));
        assert_eq!(plan.resize, (300, 400));
        assert_eq!(plan.crop, (300, 300));
    }

    #[test]
    fn cover_small_source_is_not_enlarged() {
        let plan = cover_crop((200, 120), (300, 300));
        assert_eq!(plan.resize, (200, 120));
        assert_eq!(plan.crop, (200, 120));
    }

    #[test]
    fn cover_one_side_smaller_than_target() {
        // 1000x200: crop box clamps height to 200, no resampling needed
        let plan = cover_crop((1000, 200), (300, 300));
        assert_eq!(plan.crop, (300, 200));
        assert_eq!(plan.resize, (1000, 200));
    }
}
