//! Batch configuration module.
//!
//! Handles loading, validating, and merging `resize.toml`. Stock defaults are
//! overridden by a user file, either `resize.toml` in the input directory or
//! a path passed with `--config`. Command-line flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [defaults]
//! # width = 800            # Target width in pixels (omit to follow height)
//! # height = 600           # Target height in pixels (omit to follow width)
//! mode = "fit"             # fit | fill | stretch | pad
//! quality = 85             # JPEG quality (1-100); WEBP is lossless
//! # format = "JPEG"        # JPEG | PNG | WEBP | BMP | GIF (omit to keep)
//! prefix = "resized_"
//! suffix = ""
//! preserve_metadata = true # Carry EXIF into JPEG/PNG/WEBP output
//!
//! [processing]
//! # jobs = 4               # Parallel workers (omit for sequential)
//!
//! [presets]
//! thumbnail = [150, 150]
//! hd = [1920, 1080]
//! # ...
//!
//! [quality_presets]
//! low = 60
//! medium = 80
//! high = 95
//! maximum = 100
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want. Preset
//! tables merge key-by-key, so adding one preset keeps the stock ones.
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::Quality;
use crate::types::{AspectMode, Dimensions, OutputFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the input directory.
pub const CONFIG_FILENAME: &str = "resize.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `resize.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Values used when the command line doesn't say otherwise.
    pub defaults: DefaultsConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Named `[width, height]` sizes.
    pub presets: BTreeMap<String, [u32; 2]>,
    /// Named quality levels.
    pub quality_presets: BTreeMap<String, u32>,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            defaults: DefaultsConfig::default(),
            processing: ProcessingConfig::default(),
            presets: stock_presets(),
            quality_presets: stock_quality_presets(),
        }
    }
}

fn stock_presets() -> BTreeMap<String, [u32; 2]> {
    [
        ("thumbnail", [150, 150]),
        ("small", [320, 320]),
        ("medium", [640, 640]),
        ("large", [1024, 1024]),
        ("hd", [1920, 1080]),
        ("instagram", [1080, 1080]),
        ("facebook", [1200, 630]),
        ("twitter", [1200, 675]),
        ("youtube", [1280, 720]),
        ("profile", [400, 400]),
    ]
    .into_iter()
    .map(|(name, size)| (name.to_string(), size))
    .collect()
}

fn stock_quality_presets() -> BTreeMap<String, u32> {
    [("low", 60), ("medium", 80), ("high", 95), ("maximum", 100)]
        .into_iter()
        .map(|(name, q)| (name.to_string(), q))
        .collect()
}

impl ResizeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.defaults;
        if !(1..=100).contains(&d.quality) {
            return Err(ConfigError::Validation(
                "defaults.quality must be 1-100".into(),
            ));
        }
        if d.width == Some(0) || d.height == Some(0) {
            return Err(ConfigError::Validation(
                "defaults.width and defaults.height must be non-zero".into(),
            ));
        }
        if self.processing.jobs == Some(0) {
            return Err(ConfigError::Validation(
                "processing.jobs must be at least 1".into(),
            ));
        }
        for (name, [w, h]) in &self.presets {
            if *w == 0 || *h == 0 {
                return Err(ConfigError::Validation(format!(
                    "presets.{name} dimensions must be non-zero"
                )));
            }
        }
        for (name, q) in &self.quality_presets {
            if !(1..=100).contains(q) {
                return Err(ConfigError::Validation(format!(
                    "quality_presets.{name} must be 1-100"
                )));
            }
        }
        Ok(())
    }

    /// Look up a size preset by name.
    pub fn preset(&self, name: &str) -> Option<Dimensions> {
        self.presets
            .get(name)
            .map(|&[w, h]| Dimensions::new(w, h))
    }

    /// Look up a quality preset by name.
    pub fn quality_preset(&self, name: &str) -> Option<Quality> {
        self.quality_presets.get(name).copied().map(Quality::new)
    }
}

/// Per-run defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub mode: AspectMode,
    /// JPEG quality (1 = worst, 100 = best). WEBP output is lossless.
    pub quality: u32,
    /// Output encoding. Absent keeps each source's own format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    pub prefix: String,
    pub suffix: String,
    pub preserve_metadata: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            mode: AspectMode::Fit,
            quality: 85,
            format: None,
            prefix: "resized_".to_string(),
            suffix: String::new(),
            preserve_metadata: true,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, files are processed one at a time.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

/// Resolve the effective worker count.
///
/// - `None` → 1 (sequential)
/// - `Some(n)` → `min(n, cores)` (user can constrain down, not up)
pub fn effective_jobs(requested: Option<usize>) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    requested.map(|n| n.clamp(1, cores)).unwrap_or(1)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(ResizeConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock config does not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a TOML file as a raw value. `Ok(None)` if it doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ResizeConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ResizeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from an explicit file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<ResizeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Load config from `resize.toml` in `dir`, falling back to stock defaults.
pub fn load_config(dir: &Path) -> Result<ResizeConfig, ConfigError> {
    resolve_config(load_raw_config(&dir.join(CONFIG_FILENAME))?)
}

/// Returns a fully-commented stock `resize.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Bulk Resize Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as resize.toml in the input directory, or pass it with
# --config. Command-line flags take precedence over anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Defaults for every run
# ---------------------------------------------------------------------------
[defaults]
# Target size in pixels. Give one to keep the aspect ratio, both for an
# exact box. Omit both to keep the original size (format conversion only).
# width = 800
# height = 600

# How the source aspect ratio meets the target box:
#   fit     - shrink to fit inside (never enlarges)
#   fill    - center-crop to the box, then scale to it exactly
#   stretch - scale to the box exactly, may distort
#   pad     - fit, then center on a white canvas of the box size
mode = "fit"

# Encoding quality for JPEG (1 = worst, 100 = best).
# WEBP is always written lossless and ignores it, as do the other formats.
quality = 85

# Output format: JPEG, PNG, WEBP, BMP or GIF. Omit to keep each source's
# own format.
# format = "JPEG"

# Output name: <prefix><original name><suffix>[_0001].<ext>
prefix = "resized_"
suffix = ""

# Copy EXIF metadata into JPEG, PNG and WEBP output.
preserve_metadata = true

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Number of parallel workers. Omit to process one file at a time.
# Values above the CPU core count are clamped down.
# jobs = 4

# ---------------------------------------------------------------------------
# Size presets: name = [width, height]
# ---------------------------------------------------------------------------
[presets]
thumbnail = [150, 150]
small = [320, 320]
medium = [640, 640]
large = [1024, 1024]
hd = [1920, 1080]
instagram = [1080, 1080]
facebook = [1200, 630]
twitter = [1200, 675]
youtube = [1280, 720]
profile = [400, 400]

# ---------------------------------------------------------------------------
# Quality presets
# ---------------------------------------------------------------------------
[quality_presets]
low = 60
medium = 80
high = 95
maximum = 100
"##
}
