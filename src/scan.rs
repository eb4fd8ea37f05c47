//! File discovery and the small set of filesystem queries the batch needs.
//!
//! Discovery walks the input root once, up front, and returns a fixed,
//! sorted list of candidate images. Matching is by extension only and is
//! case-insensitive:
//!
//! ```text
//! jpg  jpeg  png  gif  bmp  tiff  webp  ico
//! ```
//!
//! In recursive mode subdirectories are descended too. When the output
//! directory lives inside the input root (the default `<input>/resized`),
//! it is pruned from the walk so earlier results are never picked up as
//! new inputs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Input is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Extensions accepted as input, lower-case and without the dot.
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp", "ico"];

/// True if `path` has one of `extensions`, ignoring case.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// List files under `root` whose extension is in `extensions`.
///
/// Results are sorted by file name within each directory, so the order is
/// stable across runs and platforms. `exclude` prunes one subtree.
pub fn list_matching(
    root: &Path,
    extensions: &[&str],
    recursive: bool,
    exclude: Option<&Path>,
) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| exclude.is_none_or(|ex| e.path() != ex));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }

    tracing::debug!(root = %root.display(), count = files.len(), recursive, "discovered images");
    Ok(files)
}

/// If `output` is inside `root`, return it expressed under `root` as the
/// walker will see it.
pub fn nested_output(root: &Path, output: &Path) -> Option<PathBuf> {
    let root_abs = fs::canonicalize(root).ok()?;
    let output_abs = fs::canonicalize(output).ok()?;
    let relative = output_abs.strip_prefix(&root_abs).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(root.join(relative))
}

/// Directory of `file` relative to `root`; empty for files directly in `root`.
pub fn relative_dir(root: &Path, file: &Path) -> PathBuf {
    file.parent()
        .and_then(|p| p.strip_prefix(root).ok())
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

/// Create `path` and any missing parents.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Size of a file in bytes.
pub fn file_size(path: &Path) -> io::Result<u64> {
    Ok(fs::metadata(path)?.len())
}
