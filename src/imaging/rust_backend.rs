//! Pure Rust codec built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, BMP, TIFF, WebP, ICO) | `image::ImageReader` over the file bytes, content sniffed |
//! | EXIF read/write | [`exif`](super::exif) via `img-parts` (JPEG, PNG, WebP) |
//! | Crop | `DynamicImage::crop_imm` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Pad | `imageops::overlay` onto a filled canvas |
//! | Flatten | per-pixel alpha blend onto an opaque background |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → WebP | `WebPEncoder::new_lossless` (the crate has no lossy WebP encoder) |
//! | Encode → PNG, BMP, GIF, TIFF, ICO | `DynamicImage::write_to` |

use super::backend::{CodecError, DecodedImage, ImageCodec};
use super::exif;
use super::params::{CropBox, EncodeParams, Rgb};
use crate::types::{Dimensions, OutputFormat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, Rgba, RgbaImage};
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

/// Pure Rust codec using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Largest side an ICO entry can have.
const ICO_MAX_SIDE: u32 = 256;

/// Decode file bytes, sniffing the real format from content and falling
/// back to the extension.
fn decode_bytes(data: &[u8], path: &Path) -> Result<DynamicImage, CodecError> {
    let mut reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    if reader.format().is_none() {
        if let Ok(format) = ImageFormat::from_path(path) {
            reader.set_format(format);
        }
    }
    reader
        .decode()
        .map_err(|e| CodecError::Decode(format!("Failed to decode {}: {}", path.display(), e)))
}

/// Alpha-blend every pixel over `background` and return an opaque RGB image.
fn flatten_onto(img: &DynamicImage, background: Rgb) -> DynamicImage {
    let rgba = img.to_rgba8();
    let [br, bg, bb] = background.0;
    let flat = image::RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let alpha = a as u32;
        let blend = |fg: u8, back: u8| {
            ((fg as u32 * alpha + back as u32 * (255 - alpha) + 127) / 255) as u8
        };
        image::Rgb([blend(r, br), blend(g, bg), blend(b, bb)])
    });
    DynamicImage::ImageRgb8(flat)
}

/// Encode `img` into an in-memory buffer for the given format.
fn encode_to_vec(img: &DynamicImage, params: &EncodeParams) -> Result<Vec<u8>, CodecError> {
    let encode_err =
        |e: image::ImageError| CodecError::Encode(format!("{} encode failed: {}", params.format, e));
    let mut buf = Cursor::new(Vec::new());

    match params.format {
        OutputFormat::Jpeg => {
            let quality = params.quality.map(|q| q.value() as u8).unwrap_or(85);
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(encode_err)?;
        }
        OutputFormat::Webp => {
            let encoder = WebPEncoder::new_lossless(&mut buf);
            let converted = if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            };
            converted.write_with_encoder(encoder).map_err(encode_err)?;
        }
        OutputFormat::Png => {
            img.write_to(&mut buf, ImageFormat::Png).map_err(encode_err)?;
        }
        OutputFormat::Bmp => {
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_to(&mut buf, ImageFormat::Bmp)
                .map_err(encode_err)?;
        }
        OutputFormat::Gif => {
            DynamicImage::ImageRgba8(img.to_rgba8())
                .write_to(&mut buf, ImageFormat::Gif)
                .map_err(encode_err)?;
        }
        OutputFormat::Tiff => {
            let converted = if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            };
            converted
                .write_to(&mut buf, ImageFormat::Tiff)
                .map_err(encode_err)?;
        }
        OutputFormat::Ico => {
            if img.width() > ICO_MAX_SIDE || img.height() > ICO_MAX_SIDE {
                return Err(CodecError::Encode(format!(
                    "ICO images are limited to {ICO_MAX_SIDE}x{ICO_MAX_SIDE}, got {}x{}",
                    img.width(),
                    img.height()
                )));
            }
            DynamicImage::ImageRgba8(img.to_rgba8())
                .write_to(&mut buf, ImageFormat::Ico)
                .map_err(encode_err)?;
        }
    }

    let bytes = buf.into_inner();
    Ok(match &params.exif {
        Some(exif) if params.format.supports_exif() => exif::embed_exif(bytes, exif),
        _ => bytes,
    })
}

impl ImageCodec for RustCodec {
    type Image = DynamicImage;

    fn decode(&self, path: &Path) -> Result<DecodedImage<DynamicImage>, CodecError> {
        let data = std::fs::read(path)?;
        let image = decode_bytes(&data, path)?;
        let exif = exif::read_exif(&data);
        Ok(DecodedImage {
            dimensions: Dimensions::new(image.width(), image.height()),
            // Palettes are expanded on decode, so transparency shows up as alpha.
            has_alpha_or_palette: image.color().has_alpha(),
            exif,
            image,
        })
    }

    fn crop(&self, image: DynamicImage, region: CropBox) -> Result<DynamicImage, CodecError> {
        if region.right > image.width() || region.bottom > image.height() {
            return Err(CodecError::Unsupported(format!(
                "crop {}x{}+{}+{} exceeds {}x{} image",
                region.width(),
                region.height(),
                region.left,
                region.top,
                image.width(),
                image.height()
            )));
        }
        Ok(image.crop_imm(region.left, region.top, region.width(), region.height()))
    }

    fn resize(&self, image: DynamicImage, size: Dimensions) -> Result<DynamicImage, CodecError> {
        if image.width() == size.width && image.height() == size.height {
            return Ok(image);
        }
        Ok(image.resize_exact(size.width, size.height, FilterType::Lanczos3))
    }

    fn pad(
        &self,
        image: DynamicImage,
        canvas: Dimensions,
        color: Rgb,
    ) -> Result<DynamicImage, CodecError> {
        let [r, g, b] = color.0;
        let mut background =
            RgbaImage::from_pixel(canvas.width, canvas.height, Rgba([r, g, b, 255]));
        let x = canvas.width.saturating_sub(image.width()) / 2;
        let y = canvas.height.saturating_sub(image.height()) / 2;
        image::imageops::overlay(&mut background, &image.to_rgba8(), x as i64, y as i64);

        Ok(if image.color().has_alpha() {
            DynamicImage::ImageRgba8(background)
        } else {
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(background).to_rgb8())
        })
    }

    fn flatten(&self, image: DynamicImage, background: Rgb) -> Result<DynamicImage, CodecError> {
        if !image.color().has_alpha() {
            return Ok(image);
        }
        Ok(flatten_onto(&image, background))
    }

    fn encode(
        &self,
        image: &DynamicImage,
        path: &Path,
        params: &EncodeParams,
    ) -> Result<(), CodecError> {
        let bytes = encode_to_vec(image, params)?;
        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }
}
