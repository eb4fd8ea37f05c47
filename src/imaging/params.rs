//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the planning code in [`calculations`](super::calculations)
//! and [`operations`](super::operations), and the [`backend`](super::backend)
//! that does the pixel work. Keeping them plain data lets tests drive the
//! pipeline with a mock codec.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 85). Clamped on construction.
//! - [`Rgb`] — Opaque color used for pad canvases and alpha flattening.
//! - [`CropBox`] — Source-space crop region, right/bottom exclusive.
//! - [`ResizeRequest`] — Requested size, aspect mode, quality, and format for a batch.
//! - [`GeometryPlan`] — Per-image output of the planner.
//! - [`EncodeParams`] — What the encoder receives: format, optional quality, optional EXIF.

use crate::types::{AspectMode, Dimensions, OutputFormat};
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const WHITE: Rgb = Rgb([255, 255, 255]);
}

/// Crop region in source pixel space. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropBox {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

/// What the user asked for, shared by every file in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub mode: AspectMode,
    pub quality: Quality,
    pub output_format: Option<OutputFormat>,
    pub preserve_metadata: bool,
}

impl Default for ResizeRequest {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            mode: AspectMode::Fit,
            quality: Quality::default(),
            output_format: None,
            preserve_metadata: true,
        }
    }
}

impl ResizeRequest {
    /// True when neither dimension was requested (pass-through geometry).
    pub fn is_passthrough(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }
}

/// Geometry computed for one source image.
///
/// Applied in order: crop (if any), resample to `final_resample_size`,
/// then center on a `pad_color` canvas of `target_size` (if any).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryPlan {
    pub target_size: Dimensions,
    pub crop_box: Option<CropBox>,
    pub pad_color: Option<Rgb>,
    pub final_resample_size: Dimensions,
}

impl GeometryPlan {
    /// Size of the image the plan produces.
    pub fn output_size(&self) -> Dimensions {
        if self.pad_color.is_some() {
            self.target_size
        } else {
            self.final_resample_size
        }
    }
}

/// Parameters handed to the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeParams {
    pub format: OutputFormat,
    /// Only ever `Some` for formats where [`OutputFormat::supports_quality`] holds.
    pub quality: Option<Quality>,
    /// Raw EXIF payload to embed, if the destination can carry it.
    pub exif: Option<Vec<u8>>,
}
