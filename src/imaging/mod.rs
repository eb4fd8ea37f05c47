//! Image processing — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (JPEG, PNG, GIF, BMP, TIFF, WebP, ICO) |
//! | **Geometry** | [`plan`] — fit / fill / stretch / pad |
//! | **Resize** | Lanczos3 via `DynamicImage::resize_exact` |
//! | **EXIF** | `img-parts` (JPEG, PNG, WebP containers) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for geometry (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageCodec`] trait + [`RustCodec`]
//! - **Operations**: High-level functions combining calculations + codec

pub mod backend;
mod calculations;
pub(crate) mod exif;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{CodecError, DecodedImage, ImageCodec};
pub use calculations::{
    calculate_fill_crop, calculate_fit_dimensions, center_offset, plan, resolve_target,
};
pub use operations::{TransformReport, transform_image};
pub use params::{CropBox, EncodeParams, GeometryPlan, Quality, ResizeRequest, Rgb};
pub use rust_backend::RustCodec;
