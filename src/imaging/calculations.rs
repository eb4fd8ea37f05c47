//! Pure calculation functions for image geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! [`plan`] is the entry point: given a source's natural size and a
//! [`ResizeRequest`], it returns the [`GeometryPlan`] the codec executes.
//!
//! Rounding: scaled dimensions round to the nearest integer with a floor of
//! 1px per side. Crop extents use exact integer arithmetic and are floored.

use super::params::{CropBox, GeometryPlan, ResizeRequest, Rgb};
use crate::types::{AspectMode, Dimensions};

/// Scale a single dimension, rounding to nearest and never returning 0.
fn scale_dim(value: u32, factor: f64) -> u32 {
    ((value as f64 * factor).round() as u32).max(1)
}

/// Resolve the requested target size before any aspect mode is applied.
///
/// - both given → exactly `(width, height)`
/// - one given → the other follows the source aspect ratio
/// - neither → the natural size
///
/// # Examples
/// ```
/// # use bulk_resize::imaging::resolve_target;
/// # use bulk_resize::types::Dimensions;
/// let natural = Dimensions::new(4000, 3000);
/// assert_eq!(resolve_target(natural, Some(1000), None), Dimensions::new(1000, 750));
/// assert_eq!(resolve_target(natural, None, Some(300)), Dimensions::new(400, 300));
/// ```
pub fn resolve_target(natural: Dimensions, width: Option<u32>, height: Option<u32>) -> Dimensions {
    match (width, height) {
        (Some(w), Some(h)) => Dimensions::new(w, h),
        (Some(w), None) => {
            let ratio = w as f64 / natural.width as f64;
            Dimensions::new(w, scale_dim(natural.height, ratio))
        }
        (None, Some(h)) => {
            let ratio = h as f64 / natural.height as f64;
            Dimensions::new(scale_dim(natural.width, ratio), h)
        }
        (None, None) => natural,
    }
}

/// Calculate the largest size that fits inside `target` without upscaling.
///
/// Aspect ratio is preserved within rounding. A source that already fits is
/// returned unchanged.
pub fn calculate_fit_dimensions(source: Dimensions, target: Dimensions) -> Dimensions {
    let ratio = (target.width as f64 / source.width as f64)
        .min(target.height as f64 / source.height as f64);

    if ratio >= 1.0 {
        return source;
    }

    Dimensions::new(
        scale_dim(source.width, ratio).min(target.width),
        scale_dim(source.height, ratio).min(target.height),
    )
}

/// Calculate the centered crop that gives `source` the aspect ratio of `target`.
///
/// A source wider than the target loses columns symmetrically; otherwise it
/// loses rows. When the left/right (or top/bottom) margins can't be equal the
/// extra pixel goes to the right (bottom).
pub fn calculate_fill_crop(source: Dimensions, target: Dimensions) -> CropBox {
    let (sw, sh) = (source.width as u64, source.height as u64);
    let (tw, th) = (target.width as u64, target.height as u64);

    // sw/sh > tw/th, compared without floating point
    if sw * th > tw * sh {
        let crop_w = ((sh * tw / th) as u32).clamp(1, source.width);
        let left = (source.width - crop_w) / 2;
        CropBox {
            left,
            top: 0,
            right: left + crop_w,
            bottom: source.height,
        }
    } else {
        let crop_h = ((sw * th / tw) as u32).clamp(1, source.height);
        let top = (source.height - crop_h) / 2;
        CropBox {
            left: 0,
            top,
            right: source.width,
            bottom: top + crop_h,
        }
    }
}

/// Compute the geometry for one image.
///
/// # Examples
/// ```
/// # use bulk_resize::imaging::{plan, ResizeRequest};
/// # use bulk_resize::types::{AspectMode, Dimensions};
/// let request = ResizeRequest {
///     width: Some(1000),
///     height: Some(1000),
///     mode: AspectMode::Fill,
///     ..ResizeRequest::default()
/// };
/// let plan = plan(Dimensions::new(4000, 3000), &request);
/// let crop = plan.crop_box.unwrap();
/// assert_eq!((crop.left, crop.right), (500, 3500));
/// assert_eq!(plan.output_size(), Dimensions::new(1000, 1000));
/// ```
pub fn plan(natural: Dimensions, request: &ResizeRequest) -> GeometryPlan {
    if request.is_passthrough() {
        return GeometryPlan {
            target_size: natural,
            crop_box: None,
            pad_color: None,
            final_resample_size: natural,
        };
    }

    let target = resolve_target(natural, request.width, request.height);

    match request.mode {
        AspectMode::Fit => GeometryPlan {
            target_size: target,
            crop_box: None,
            pad_color: None,
            final_resample_size: calculate_fit_dimensions(natural, target),
        },
        AspectMode::Fill => {
            let crop = calculate_fill_crop(natural, target);
            let crops_anything = crop.width() != natural.width || crop.height() != natural.height;
            GeometryPlan {
                target_size: target,
                crop_box: crops_anything.then_some(crop),
                pad_color: None,
                final_resample_size: target,
            }
        }
        AspectMode::Stretch => GeometryPlan {
            target_size: target,
            crop_box: None,
            pad_color: None,
            final_resample_size: target,
        },
        AspectMode::Pad => GeometryPlan {
            target_size: target,
            crop_box: None,
            pad_color: Some(Rgb::WHITE),
            final_resample_size: calculate_fit_dimensions(natural, target),
        },
    }
}

/// Offset that centers `inner` on a canvas of `outer`.
pub fn center_offset(outer: Dimensions, inner: Dimensions) -> (u32, u32) {
    (
        outer.width.saturating_sub(inner.width) / 2,
        outer.height.saturating_sub(inner.height) / 2,
    )
}
