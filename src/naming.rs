//! Output filename composition.
//!
//! Every output name is built the same way from the source file name:
//!
//! ```text
//! <prefix><original stem><suffix>[_<counter:04>]<extension>
//! ```
//!
//! - `photo.JPG`, prefix `resized_` → `resized_photo.jpg`
//! - `photo.JPG`, prefix `resized_`, format PNG → `resized_photo.png`
//! - `photo.jpg`, suffix `-web`, counter 7 → `photo-web_0007.jpg`
//!
//! The extension is the canonical one for the output format when a format is
//! set, otherwise the source extension lower-cased. Naming is pure: it never
//! looks at the filesystem, so collisions are the batch processor's concern.

use crate::types::OutputFormat;
use std::path::{Path, PathBuf};

/// Naming options, fixed for a whole batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingOptions {
    pub prefix: String,
    pub suffix: String,
    /// Append a zero-padded sequence counter.
    pub sequential: bool,
    pub output_format: Option<OutputFormat>,
}

/// Compose the output file stem.
///
/// - `("resized_", "photo", "", None)` → `"resized_photo"`
/// - `("", "photo", "-small", Some(12))` → `"photo-small_0012"`
pub fn output_stem(prefix: &str, stem: &str, suffix: &str, counter: Option<u32>) -> String {
    let mut name = String::with_capacity(prefix.len() + stem.len() + suffix.len() + 5);
    name.push_str(prefix);
    name.push_str(stem);
    name.push_str(suffix);
    if let Some(n) = counter {
        name.push_str(&format!("_{n:04}"));
    }
    name
}

/// Extension for the output file, including the dot. Empty when there is no
/// format and the source has no extension.
pub fn output_extension(input: &Path, output_format: Option<OutputFormat>) -> String {
    match output_format {
        Some(format) => format.extension().to_string(),
        None => input
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default(),
    }
}

/// Build the output path for `input` inside `output_dir`.
///
/// `counter` is only used when the options ask for sequential naming.
pub fn output_path(
    input: &Path,
    output_dir: &Path,
    options: &NamingOptions,
    counter: Option<u32>,
) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let counter = counter.filter(|_| options.sequential);

    let file_name = format!(
        "{}{}",
        output_stem(&options.prefix, &stem, &options.suffix, counter),
        output_extension(input, options.output_format)
    );
    output_dir.join(file_name)
}
