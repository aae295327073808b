//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` with format sniffing |
//! | **Orientation** | `kamadak-exif`, applied once at decode |
//! | **Resize** | Lanczos3, fit-inside or cover-and-crop |
//! | **Encode** | JPEG, PNG, WebP encoders from `image` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageCodec`] trait + [`RustCodec`]
//! - **Operations**: Resolve variant policy into render parameters and fan out

pub mod backend;
mod calculations;
pub mod operations;
pub(crate) mod orientation;
mod params;
pub mod rust_backend;

pub use backend::{CodecError, Dimensions, ImageCodec};
pub use calculations::{CoverPlan, cover_crop, fit_inside};
pub use operations::{ProcessedVariant, plan_render, render_variant, render_variants};
pub use params::{OutputFormat, Quality, RenderParams, ResizeMode, Transform};
pub use rust_backend::RustCodec;
