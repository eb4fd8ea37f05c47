//! High-level image operations.
//!
//! These functions combine calculations with codec execution. They take a
//! [`ResizeRequest`], compute the per-image plan, and drive the codec.

use super::backend::{CodecError, ImageCodec};
use super::calculations::plan;
use super::params::{EncodeParams, GeometryPlan, ResizeRequest, Rgb};
use crate::types::{Dimensions, OutputFormat};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Background used when flattening transparency for opaque encodings.
pub const FLATTEN_BACKGROUND: Rgb = Rgb::WHITE;

/// Largest image, in pixels, a transform may produce (16384 x 16384).
pub const MAX_OUTPUT_PIXELS: u64 = 1 << 28;

/// Pixel sizes before and after a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformReport {
    pub original_size: Dimensions,
    pub new_size: Dimensions,
}

/// Pick the encoding for `source`: the requested format, or the one implied
/// by the source extension.
pub fn resolve_format(request: &ResizeRequest, source: &Path) -> Result<OutputFormat> {
    if let Some(format) = request.output_format {
        return Ok(format);
    }
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    OutputFormat::from_extension(ext).ok_or_else(|| {
        CodecError::Unsupported(format!(
            "no encoder for .{} sources; choose an output format",
            ext.to_lowercase()
        ))
    })
}

/// Build encoder parameters.
///
/// Quality is only attached for formats that take one, and EXIF only
/// travels into containers that can hold it.
pub fn plan_encode(
    format: OutputFormat,
    request: &ResizeRequest,
    exif: Option<Vec<u8>>,
) -> EncodeParams {
    EncodeParams {
        format,
        quality: format.supports_quality().then_some(request.quality),
        exif: exif.filter(|_| request.preserve_metadata && format.supports_exif()),
    }
}

/// Reject plans that would allocate more than [`MAX_OUTPUT_PIXELS`].
///
/// Keeping the source size is always allowed; it is already in memory.
pub fn check_output_size(plan: &GeometryPlan, original: Dimensions) -> Result<()> {
    for size in [plan.final_resample_size, plan.target_size] {
        let pixels = size.width as u64 * size.height as u64;
        if size != original && pixels > MAX_OUTPUT_PIXELS {
            return Err(CodecError::Unsupported(format!(
                "target size {size} exceeds the {MAX_OUTPUT_PIXELS} pixel limit"
            )));
        }
    }
    Ok(())
}

/// Decode `source`, apply the geometry for `request`, and write `output`.
///
/// Transparent sources bound for an opaque encoding are flattened onto
/// [`FLATTEN_BACKGROUND`] before any geometry is applied.
pub fn transform_image<C: ImageCodec>(
    codec: &C,
    source: &Path,
    output: &Path,
    request: &ResizeRequest,
) -> Result<TransformReport> {
    let format = resolve_format(request, source)?;
    let decoded = codec.decode(source)?;
    let original_size = decoded.dimensions;

    let mut image = decoded.image;
    if decoded.has_alpha_or_palette && !format.supports_alpha() {
        image = codec.flatten(image, FLATTEN_BACKGROUND)?;
    }

    let geometry = plan(original_size, request);
    check_output_size(&geometry, original_size)?;
    if let Some(region) = geometry.crop_box {
        image = codec.crop(image, region)?;
    }
    if geometry.final_resample_size != original_size || geometry.crop_box.is_some() {
        image = codec.resize(image, geometry.final_resample_size)?;
    }
    if let Some(color) = geometry.pad_color {
        image = codec.pad(image, geometry.target_size, color)?;
    }

    let params = plan_encode(format, request, decoded.exif);
    codec.encode(&image, output, &params)?;

    Ok(TransformReport {
        original_size,
        new_size: geometry.output_size(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockCodec, MockSource, RecordedOp};
    use crate::imaging::{CropBox, Quality};
    use crate::types::AspectMode;
    use tempfile::TempDir;

    fn sized(w: u32, h: u32, mode: AspectMode) -> ResizeRequest {
        ResizeRequest {
            width: Some(w),
            height: Some(h),
            mode,
            ..ResizeRequest::default()
        }
    }

    #[test]
    fn resolve_format_prefers_request() {
        let request = ResizeRequest {
            output_format: Some(OutputFormat::Png),
            ..ResizeRequest::default()
        };
        assert_eq!(
            resolve_format(&request, Path::new("a.JPG")).unwrap(),
            OutputFormat::Png
        );
    }

    #[test]
    fn resolve_format_from_source_extension() {
        let request = ResizeRequest::default();
        assert_eq!(
            resolve_format(&request, Path::new("a.JPEG")).unwrap(),
            OutputFormat::Jpeg
        );
        assert_eq!(
            resolve_format(&request, Path::new("scan.tiff")).unwrap(),
            OutputFormat::Tiff
        );
        assert_eq!(
            resolve_format(&request, Path::new("app.ICO")).unwrap(),
            OutputFormat::Ico
        );
        assert!(resolve_format(&request, Path::new("noext")).is_err());
    }

    #[test]
    fn quality_only_for_formats_that_take_it() {
        let request = ResizeRequest {
            quality: Quality::new(70),
            ..ResizeRequest::default()
        };
        assert_eq!(
            plan_encode(OutputFormat::Jpeg, &request, None).quality,
            Some(Quality::new(70))
        );
        assert_eq!(
            plan_encode(OutputFormat::Webp, &request, None).quality,
            Some(Quality::new(70))
        );
        for format in [OutputFormat::Png, OutputFormat::Bmp, OutputFormat::Gif] {
            assert_eq!(plan_encode(format, &request, None).quality, None);
        }
    }

    #[test]
    fn exif_kept_for_containers_that_hold_it() {
        let exif = Some(b"MM\0*\0\0\0\x08".to_vec());
        let keep = ResizeRequest::default();
        let drop = ResizeRequest {
            preserve_metadata: false,
            ..ResizeRequest::default()
        };

        for format in [OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::Webp] {
            assert!(plan_encode(format, &keep, exif.clone()).exif.is_some());
            assert!(plan_encode(format, &drop, exif.clone()).exif.is_none());
        }
        for format in [OutputFormat::Gif, OutputFormat::Bmp, OutputFormat::Tiff] {
            assert!(plan_encode(format, &keep, exif.clone()).exif.is_none());
        }
    }

    #[test]
    fn fill_crops_then_resizes() {
        let tmp = TempDir::new().unwrap();
        let codec = MockCodec::with_default_size(Dimensions::new(4000, 3000));
        let out = tmp.path().join("out.jpg");

        let report = transform_image(
            &codec,
            Path::new("photo.jpg"),
            &out,
            &sized(1000, 1000, AspectMode::Fill),
        )
        .unwrap();

        assert_eq!(report.original_size, Dimensions::new(4000, 3000));
        assert_eq!(report.new_size, Dimensions::new(1000, 1000));

        let ops = codec.get_operations();
        assert_eq!(
            ops[1],
            RecordedOp::Crop(CropBox {
                left: 500,
                top: 0,
                right: 3500,
                bottom: 3000
            })
        );
        assert_eq!(ops[2], RecordedOp::Resize(Dimensions::new(1000, 1000)));
        assert!(matches!(
            &ops[3],
            RecordedOp::Encode { size, quality: Some(85), .. } if *size == Dimensions::new(1000, 1000)
        ));
    }

    #[test]
    fn pad_resizes_then_pads() {
        let tmp = TempDir::new().unwrap();
        let codec = MockCodec::with_default_size(Dimensions::new(4000, 3000));

        transform_image(
            &codec,
            Path::new("photo.png"),
            &tmp.path().join("out.png"),
            &sized(1000, 1000, AspectMode::Pad),
        )
        .unwrap();

        let ops = codec.get_operations();
        assert_eq!(ops[1], RecordedOp::Resize(Dimensions::new(1000, 750)));
        assert_eq!(
            ops[2],
            RecordedOp::Pad {
                canvas: Dimensions::new(1000, 1000),
                color: Rgb::WHITE
            }
        );
        assert!(matches!(&ops[3], RecordedOp::Encode { quality: None, .. }));
    }

    #[test]
    fn passthrough_skips_resample() {
        let tmp = TempDir::new().unwrap();
        let codec = MockCodec::with_default_size(Dimensions::new(640, 480));
        let request = ResizeRequest {
            output_format: Some(OutputFormat::Webp),
            ..ResizeRequest::default()
        };

        let report =
            transform_image(&codec, Path::new("a.png"), &tmp.path().join("a.webp"), &request)
                .unwrap();

        assert_eq!(report.new_size, Dimensions::new(640, 480));
        let ops = codec.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[1], RecordedOp::Encode { format: OutputFormat::Webp, .. }));
    }

    #[test]
    fn transparent_source_flattened_for_jpeg() {
        let tmp = TempDir::new().unwrap();
        let codec = MockCodec::new().with_source(
            "logo.png",
            MockSource::Image {
                size: Dimensions::new(100, 100),
                has_alpha: true,
                exif: None,
            },
        );
        let request = ResizeRequest {
            output_format: Some(OutputFormat::Jpeg),
            ..ResizeRequest::default()
        };

        transform_image(&codec, Path::new("logo.png"), &tmp.path().join("logo.jpg"), &request)
            .unwrap();

        let ops = codec.get_operations();
        assert_eq!(ops[1], RecordedOp::Flatten(Rgb::WHITE));
        assert!(matches!(&ops[2], RecordedOp::Encode { has_alpha: false, .. }));
    }

    #[test]
    fn transparent_source_kept_for_png() {
        let tmp = TempDir::new().unwrap();
        let codec = MockCodec::new().with_source(
            "logo.png",
            MockSource::Image {
                size: Dimensions::new(100, 100),
                has_alpha: true,
                exif: None,
            },
        );

        transform_image(
            &codec,
            Path::new("logo.png"),
            &tmp.path().join("logo.png"),
            &ResizeRequest::default(),
        )
        .unwrap();

        assert!(
            !codec
                .get_operations()
                .iter()
                .any(|op| matches!(op, RecordedOp::Flatten(_)))
        );
    }

    #[test]
    fn decode_failure_surfaces_message() {
        let tmp = TempDir::new().unwrap();
        let codec =
            MockCodec::new().with_source("bad.jpg", MockSource::Broken("cannot identify image".into()));

        let err = transform_image(
            &codec,
            Path::new("bad.jpg"),
            &tmp.path().join("bad.jpg"),
            &ResizeRequest::default(),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "cannot identify image");
        assert!(!tmp.path().join("bad.jpg").exists());
    }

    #[test]
    fn tiff_source_written_back_as_tiff() {
        let tmp = TempDir::new().unwrap();
        let codec = MockCodec::with_default_size(Dimensions::new(400, 300));

        transform_image(
            &codec,
            Path::new("scan.tiff"),
            &tmp.path().join("scan.tiff"),
            &sized(200, 200, AspectMode::Fit),
        )
        .unwrap();

        assert!(matches!(
            &codec.encodes()[0],
            RecordedOp::Encode { format: OutputFormat::Tiff, quality: None, .. }
        ));
    }

    #[test]
    fn huge_target_rejected_before_resize() {
        let tmp = TempDir::new().unwrap();
        let codec = MockCodec::with_default_size(Dimensions::new(1, 5000));
        let request = ResizeRequest {
            width: Some(100_000),
            mode: AspectMode::Stretch,
            ..ResizeRequest::default()
        };

        let err = transform_image(&codec, Path::new("thin.png"), &tmp.path().join("t.png"), &request)
            .unwrap_err();

        assert!(matches!(err, CodecError::Unsupported(msg) if msg.contains("pixel limit")));
        let ops = codec.get_operations();
        assert!(!ops.iter().any(|op| matches!(op, RecordedOp::Resize(_) | RecordedOp::Crop(_))));
        assert!(codec.encodes().is_empty());
    }

    #[test]
    fn keeping_a_large_source_size_is_allowed() {
        let natural = Dimensions::new(20_000, 20_000);
        let geometry = plan(natural, &ResizeRequest::default());
        assert!(check_output_size(&geometry, natural).is_ok());
    }
}
