//! Image codec trait and shared types.
//!
//! The [`ImageCodec`] trait is the seam between batch logic and pixel work:
//! decode, crop, resize, pad, flatten, encode. Everything above it (geometry,
//! naming, collision policy, bookkeeping) is backend-agnostic.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_backend::RustCodec), built on the `image` crate.
//! Tests use the recording `MockCodec` below.

use super::params::{CropBox, EncodeParams, Rgb};
use crate::types::Dimensions;
use std::path::Path;
use thiserror::Error;

/// Errors raised by a codec. The display string is what ends up in the
/// batch summary, so variants carry the full message.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Decode(String),
    #[error("{0}")]
    Encode(String),
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// A decoded source image plus what the pipeline needs to know about it.
#[derive(Debug, Clone)]
pub struct DecodedImage<I> {
    pub image: I,
    pub dimensions: Dimensions,
    /// Source carries an alpha channel or palette transparency.
    pub has_alpha_or_palette: bool,
    /// Raw EXIF block (TIFF-structured, no container framing) when present.
    pub exif: Option<Vec<u8>>,
}

/// Trait for image codecs.
///
/// Operations take the image by value and hand back the transformed one, so
/// implementations may reuse buffers. `Sync` lets the batch run files on a
/// rayon pool.
pub trait ImageCodec: Sync {
    type Image: Send;

    /// Decode an image file from disk.
    fn decode(&self, path: &Path) -> Result<DecodedImage<Self::Image>, CodecError>;

    /// Cut `region` out of the image.
    fn crop(&self, image: Self::Image, region: CropBox) -> Result<Self::Image, CodecError>;

    /// Resample to exactly `size`.
    fn resize(&self, image: Self::Image, size: Dimensions) -> Result<Self::Image, CodecError>;

    /// Center the image on a `canvas`-sized background of `color`.
    fn pad(
        &self,
        image: Self::Image,
        canvas: Dimensions,
        color: Rgb,
    ) -> Result<Self::Image, CodecError>;

    /// Composite onto an opaque `background`, dropping alpha.
    fn flatten(&self, image: Self::Image, background: Rgb) -> Result<Self::Image, CodecError>;

    /// Encode and write to `path`.
    fn encode(
        &self,
        image: &Self::Image,
        path: &Path,
        params: &EncodeParams,
    ) -> Result<(), CodecError>;
}
