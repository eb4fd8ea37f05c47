//! Shared types used across planning, naming, and batch processing.
//!
//! Aspect modes and output formats are closed enums. String values coming
//! from the CLI or `resize.toml` are parsed once, at construction time, so
//! the rest of the crate only ever matches on variants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown aspect mode: {0} (expected fit, fill, stretch or pad)")]
    InvalidMode(String),
    #[error("Unknown output format: {0} (expected JPEG, PNG, WEBP, BMP or GIF)")]
    InvalidFormat(String),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height.
    pub fn aspect(self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// How the source aspect ratio is reconciled with the requested size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectMode {
    /// Shrink to fit inside the target, keeping the aspect ratio.
    #[default]
    Fit,
    /// Center-crop to the target aspect ratio, then scale to the exact target.
    Fill,
    /// Scale to the exact target, ignoring the aspect ratio.
    Stretch,
    /// Fit, then center on a white canvas of the exact target size.
    Pad,
}

impl AspectMode {
    pub const ALL: [AspectMode; 4] = [Self::Fit, Self::Fill, Self::Stretch, Self::Pad];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fit => "fit",
            Self::Fill => "fill",
            Self::Stretch => "stretch",
            Self::Pad => "pad",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Fit => "Resize to fit within dimensions (maintain aspect ratio)",
            Self::Fill => "Resize to fill dimensions (may crop)",
            Self::Stretch => "Stretch to exact dimensions (may distort)",
            Self::Pad => "Resize to fit and add padding (maintain aspect ratio)",
        }
    }
}

impl fmt::Display for AspectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fit" => Ok(Self::Fit),
            "fill" => Ok(Self::Fill),
            "stretch" => Ok(Self::Stretch),
            "pad" => Ok(Self::Pad),
            _ => Err(ParseError::InvalidMode(s.to_string())),
        }
    }
}

/// Encodings the batch can write.
///
/// `Tiff` and `Ico` exist so those sources can be written back in their own
/// format. They are never parsed from user input and are not in [`Self::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputFormat {
    Jpeg,
    Png,
    Webp,
    Bmp,
    Gif,
    #[serde(skip_deserializing)]
    Tiff,
    #[serde(skip_deserializing)]
    Ico,
}

impl OutputFormat {
    /// Formats a user can ask for.
    pub const ALL: [OutputFormat; 5] = [Self::Jpeg, Self::Png, Self::Webp, Self::Bmp, Self::Gif];

    pub fn name(self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Webp => "WEBP",
            Self::Bmp => "BMP",
            Self::Gif => "GIF",
            Self::Tiff => "TIFF",
            Self::Ico => "ICO",
        }
    }

    /// Canonical file extension, including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => ".jpg",
            Self::Png => ".png",
            Self::Webp => ".webp",
            Self::Bmp => ".bmp",
            Self::Gif => ".gif",
            Self::Tiff => ".tiff",
            Self::Ico => ".ico",
        }
    }

    /// Whether the encoder accepts a quality scalar.
    pub fn supports_quality(self) -> bool {
        matches!(self, Self::Jpeg | Self::Webp)
    }

    /// Whether the container can carry an EXIF block.
    pub fn supports_exif(self) -> bool {
        matches!(self, Self::Jpeg | Self::Png | Self::Webp)
    }

    /// Whether the encoding can store an alpha channel.
    ///
    /// GIF keeps single-color transparency through its palette.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, Self::Jpeg | Self::Bmp)
    }

    /// Infer the format from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            "bmp" => Some(Self::Bmp),
            "gif" => Some(Self::Gif),
            "tiff" | "tif" => Some(Self::Tiff),
            "ico" => Some(Self::Ico),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "JPEG" | "JPG" => Ok(Self::Jpeg),
            "PNG" => Ok(Self::Png),
            "WEBP" => Ok(Self::Webp),
            "BMP" => Ok(Self::Bmp),
            "GIF" => Ok(Self::Gif),
            _ => Err(ParseError::InvalidFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_mode_parses_case_insensitively() {
        assert_eq!("fit".parse::<AspectMode>().unwrap(), AspectMode::Fit);
        assert_eq!("FILL".parse::<AspectMode>().unwrap(), AspectMode::Fill);
        assert_eq!(" Stretch ".parse::<AspectMode>().unwrap(), AspectMode::Stretch);
        assert_eq!("pad".parse::<AspectMode>().unwrap(), AspectMode::Pad);
    }

    #[test]
    fn unknown_aspect_mode_is_invalid_mode() {
        let err = "zoom".parse::<AspectMode>().unwrap_err();
        assert_eq!(err, ParseError::InvalidMode("zoom".to_string()));
    }

    #[test]
    fn aspect_mode_round_trips_through_display() {
        for mode in AspectMode::ALL {
            assert_eq!(mode.to_string().parse::<AspectMode>().unwrap(), mode);
        }
    }

    #[test]
    fn output_format_accepts_jpg_alias() {
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("Jpeg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("webp".parse::<OutputFormat>().unwrap(), OutputFormat::Webp);
    }

    #[test]
    fn unknown_output_format_is_invalid_format() {
        assert!(matches!(
            "tga".parse::<OutputFormat>(),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn output_format_extensions() {
        assert_eq!(OutputFormat::Jpeg.extension(), ".jpg");
        assert_eq!(OutputFormat::Png.extension(), ".png");
        assert_eq!(OutputFormat::Webp.extension(), ".webp");
        assert_eq!(OutputFormat::Bmp.extension(), ".bmp");
        assert_eq!(OutputFormat::Gif.extension(), ".gif");
    }

    #[test]
    fn only_jpeg_and_webp_take_quality() {
        let with_quality: Vec<_> = OutputFormat::ALL
            .into_iter()
            .filter(|f| f.supports_quality())
            .collect();
        assert_eq!(with_quality, vec![OutputFormat::Jpeg, OutputFormat::Webp]);
    }

    #[test]
    fn opaque_formats_have_no_alpha() {
        assert!(!OutputFormat::Jpeg.supports_alpha());
        assert!(!OutputFormat::Bmp.supports_alpha());
        assert!(OutputFormat::Png.supports_alpha());
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(OutputFormat::from_extension("JPEG"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension("tiff"), Some(OutputFormat::Tiff));
        assert_eq!(OutputFormat::from_extension("ICO"), Some(OutputFormat::Ico));
        assert_eq!(OutputFormat::from_extension("tga"), None);
    }

    #[test]
    fn source_only_formats_cannot_be_requested() {
        assert!(matches!(
            "tiff".parse::<OutputFormat>(),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!("ICO".parse::<OutputFormat>().is_err());
        assert!(!OutputFormat::ALL.contains(&OutputFormat::Tiff));
        assert!(!OutputFormat::ALL.contains(&OutputFormat::Ico));
        assert_eq!(OutputFormat::Tiff.extension(), ".tiff");
        assert!(!OutputFormat::Ico.supports_quality());
    }

    #[test]
    fn exif_containers() {
        assert!(OutputFormat::Jpeg.supports_exif());
        assert!(OutputFormat::Png.supports_exif());
        assert!(OutputFormat::Webp.supports_exif());
        assert!(!OutputFormat::Gif.supports_exif());
        assert!(!OutputFormat::Bmp.supports_exif());
    }

    #[test]
    fn dimensions_display() {
        assert_eq!(Dimensions::new(1920, 1080).to_string(), "1920x1080");
    }
}
