//! EXIF carrier for JPEG, PNG and WebP.
//!
//! The block is treated as opaque TIFF-structured bytes: read from the
//! source container and written into the re-encoded one without parsing, so
//! orientation and dimension tags are carried over as-is. `img-parts`
//! handles the container framing (JPEG APP1 `Exif\0\0`, PNG `eXIf`, WebP
//! `EXIF` chunk), so the payload looks the same whichever container it came
//! from.

use img_parts::{DynImage, ImageEXIF};

/// Largest EXIF block a single JPEG APP1 segment can hold.
const MAX_JPEG_EXIF: usize = u16::MAX as usize - 2 - b"Exif\0\0".len();

/// Return the EXIF block of an encoded JPEG, PNG or WebP.
///
/// Returns `None` for other formats, unparsable data, or an image without
/// EXIF.
pub fn read_exif(data: &[u8]) -> Option<Vec<u8>> {
    let image = DynImage::from_bytes(data.to_vec().into()).ok()??;
    image
        .exif()
        .filter(|exif| !exif.is_empty())
        .map(|exif| exif.to_vec())
}

/// Store `exif` in freshly encoded image bytes, replacing any existing block.
///
/// Bytes that aren't a JPEG, PNG or WebP come back unchanged, as do JPEGs
/// when the block can't fit a single segment.
pub fn embed_exif(encoded: Vec<u8>, exif: &[u8]) -> Vec<u8> {
    if exif.is_empty() {
        return encoded;
    }
    let Ok(Some(mut image)) = DynImage::from_bytes(encoded.clone().into()) else {
        return encoded;
    };
    if matches!(image, DynImage::Jpeg(_)) && exif.len() > MAX_JPEG_EXIF {
        tracing::debug!(len = exif.len(), "EXIF block too large for JPEG, dropped");
        return encoded;
    }

    image.set_exif(Some(exif.to_vec().into()));
    image.encoder().bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    /// Big-endian TIFF header followed by an empty IFD.
    const EXIF: &[u8] = b"MM\0*\0\0\0\x08\0\0\0\0\0\0";

    fn encoded(format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(8, 8)
            .write_to(&mut buf, format)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn read_from_empty_returns_none() {
        assert_eq!(read_exif(&[]), None);
    }

    #[test]
    fn read_from_garbage_returns_none() {
        assert_eq!(read_exif(b"definitely not an image"), None);
    }

    #[test]
    fn read_without_exif_returns_none() {
        assert_eq!(read_exif(&encoded(ImageFormat::Jpeg)), None);
        assert_eq!(read_exif(&encoded(ImageFormat::Png)), None);
    }

    #[test]
    fn jpeg_round_trip() {
        let out = embed_exif(encoded(ImageFormat::Jpeg), EXIF);
        assert_eq!(read_exif(&out).as_deref(), Some(EXIF));
        assert!(image::load_from_memory(&out).is_ok());
    }

    #[test]
    fn png_round_trip() {
        let out = embed_exif(encoded(ImageFormat::Png), EXIF);
        assert_eq!(read_exif(&out).as_deref(), Some(EXIF));
        assert_eq!(image::load_from_memory(&out).unwrap().width(), 8);
    }

    #[test]
    fn embed_replaces_existing_block() {
        let first = embed_exif(encoded(ImageFormat::Png), b"II*\0\x08\0\0\0\0\0\0\0\0\0");
        let second = embed_exif(first, EXIF);
        assert_eq!(read_exif(&second).as_deref(), Some(EXIF));
    }

    #[test]
    fn embed_into_bmp_is_noop() {
        let bmp = encoded(ImageFormat::Bmp);
        assert_eq!(embed_exif(bmp.clone(), EXIF), bmp);
    }

    #[test]
    fn embed_oversized_jpeg_block_is_noop() {
        let jpeg = encoded(ImageFormat::Jpeg);
        let huge = vec![0u8; MAX_JPEG_EXIF + 1];
        assert_eq!(embed_exif(jpeg.clone(), &huge), jpeg);
    }

    #[test]
    fn embed_empty_block_is_noop() {
        let png = encoded(ImageFormat::Png);
        assert_eq!(embed_exif(png.clone(), &[]), png);
    }
}
