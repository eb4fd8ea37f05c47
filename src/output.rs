//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Progress
//!
//! ```text
//! Found 3 images → photos/resized
//! [1/3] beach.jpg ✅ 4000x3000 → 800x600 (1200.0KB → 96.4KB, -92.0%)
//! [2/3] logo.png ⏭️  exists: resized_logo.png
//! [3/3] broken.jpg ❌ cannot identify image file
//! ```
//!
//! ## Summary
//!
//! ```text
//! Processed: 1
//! Skipped: 1
//! Failed: 1
//! Size: 1200.0KB → 96.4KB (-92.0%)
//! Errors
//!     broken.jpg: cannot identify image file
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::config::ResizeConfig;
use crate::process::{FileStatus, ProcessEvent, Summary};
use crate::types::{AspectMode, OutputFormat};

/// Bytes as kilobytes with one decimal.
fn format_kb(bytes: u64) -> String {
    format!("{:.1}KB", bytes as f64 / 1024.0)
}

/// Signed size change, `-` meaning smaller.
fn format_change(before: u64, after: u64) -> String {
    if before == 0 {
        return "n/a".to_string();
    }
    let change = (after as f64 - before as f64) / before as f64 * 100.0;
    format!("{change:+.1}%")
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

// ============================================================================
// Progress
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started { total: 0, .. } => vec!["No images found".to_string()],
        ProcessEvent::Started { total, output_dir } => {
            let noun = if *total == 1 { "image" } else { "images" };
            vec![format!("Found {total} {noun} → {}", output_dir.display())]
        }
        ProcessEvent::FileFinished {
            index,
            total,
            filename,
            outcome,
        } => {
            let head = format!("[{index}/{total}] {filename}");
            let line = match &outcome.status {
                FileStatus::Processed(p) => format!(
                    "{head} ✅ {} → {} ({} → {}, {})",
                    p.original_size,
                    p.new_size,
                    format_kb(p.bytes_before),
                    format_kb(p.bytes_after),
                    format_change(p.bytes_before, p.bytes_after)
                ),
                FileStatus::Skipped => {
                    let existing = outcome
                        .output_path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    format!("{head} ⏭️  exists: {existing}")
                }
                FileStatus::Failed(message) => format!("{head} ❌ {message}"),
            };
            vec![line]
        }
    }
}

// ============================================================================
// Summary
// ============================================================================

pub fn format_summary(summary: &Summary) -> Vec<String> {
    let mut lines = vec![
        format!("Processed: {}", summary.processed),
        format!("Skipped: {}", summary.skipped),
        format!("Failed: {}", summary.failed),
    ];

    if summary.processed > 0 {
        let (before, after) = summary.byte_totals();
        lines.push(format!(
            "Size: {} → {} ({})",
            format_kb(before),
            format_kb(after),
            format_change(before, after)
        ));
    }

    if !summary.errors.is_empty() {
        lines.push("Errors".to_string());
        for (filename, message) in &summary.errors {
            lines.push(format!("{}{filename}: {message}", indent(1)));
        }
    }

    lines
}

pub fn print_summary(summary: &Summary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Presets
// ============================================================================

/// List size presets, quality presets, modes and formats.
pub fn format_presets(config: &ResizeConfig) -> Vec<String> {
    let mut lines = vec!["Size presets".to_string()];
    let width = config.presets.keys().map(String::len).max().unwrap_or(0);
    for (name, [w, h]) in &config.presets {
        lines.push(format!("{}{name:<width$}  {w}x{h}", indent(1)));
    }

    lines.push(String::new());
    lines.push("Quality presets".to_string());
    let width = config.quality_presets.keys().map(String::len).max().unwrap_or(0);
    for (name, q) in &config.quality_presets {
        lines.push(format!("{}{name:<width$}  {q}", indent(1)));
    }

    lines.push(String::new());
    lines.push("Modes".to_string());
    for mode in AspectMode::ALL {
        lines.push(format!(
            "{}{:<7}  {}",
            indent(1),
            mode.as_str(),
            mode.description()
        ));
    }

    lines.push(String::new());
    lines.push("Formats".to_string());
    let formats: Vec<&str> = OutputFormat::ALL.iter().map(|f| f.name()).collect();
    lines.push(format!("{}{}", indent(1), formats.join(" ")));

    lines
}

pub fn print_presets(config: &ResizeConfig) {
    for line in format_presets(config) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{FileOutcome, ProcessedFile};
    use crate::types::Dimensions;
    use std::path::PathBuf;

    fn finished(status: FileStatus) -> ProcessEvent {
        ProcessEvent::FileFinished {
            index: 2,
            total: 5,
            filename: "beach.JPG".to_string(),
            outcome: FileOutcome {
                source_path: PathBuf::from("in/beach.JPG"),
                output_path: PathBuf::from("in/resized/resized_beach.jpg"),
                status,
            },
        }
    }

    fn processed(before: u64, after: u64) -> ProcessedFile {
        ProcessedFile {
            original_size: Dimensions::new(4000, 3000),
            new_size: Dimensions::new(800, 600),
            bytes_before: before,
            bytes_after: after,
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_kb_one_decimal() {
        assert_eq!(format_kb(0), "0.0KB");
        assert_eq!(format_kb(1536), "1.5KB");
    }

    #[test]
    fn format_change_signs() {
        assert_eq!(format_change(1000, 250), "-75.0%");
        assert_eq!(format_change(1000, 1500), "+50.0%");
        assert_eq!(format_change(0, 10), "n/a");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    // =========================================================================
    // Progress tests
    // =========================================================================

    #[test]
    fn format_started() {
        let lines = format_process_event(&ProcessEvent::Started {
            total: 3,
            output_dir: PathBuf::from("photos/resized"),
        });
        assert_eq!(lines, vec!["Found 3 images → photos/resized"]);
    }

    #[test]
    fn format_started_single_and_empty() {
        let one = format_process_event(&ProcessEvent::Started {
            total: 1,
            output_dir: PathBuf::from("out"),
        });
        assert_eq!(one, vec!["Found 1 image → out"]);

        let none = format_process_event(&ProcessEvent::Started {
            total: 0,
            output_dir: PathBuf::from("out"),
        });
        assert_eq!(none, vec!["No images found"]);
    }

    #[test]
    fn format_processed_line() {
        let lines = format_process_event(&finished(FileStatus::Processed(processed(2048, 1024))));
        assert_eq!(
            lines,
            vec!["[2/5] beach.JPG ✅ 4000x3000 → 800x600 (2.0KB → 1.0KB, -50.0%)"]
        );
    }

    #[test]
    fn format_skipped_line() {
        let lines = format_process_event(&finished(FileStatus::Skipped));
        assert_eq!(lines, vec!["[2/5] beach.JPG ⏭️  exists: resized_beach.jpg"]);
    }

    #[test]
    fn format_failed_line() {
        let lines = format_process_event(&finished(FileStatus::Failed("truncated file".into())));
        assert_eq!(lines, vec!["[2/5] beach.JPG ❌ truncated file"]);
    }

    // =========================================================================
    // Summary tests
    // =========================================================================

    #[test]
    fn format_summary_with_errors() {
        let summary = Summary::from_outcomes(vec![
            FileOutcome {
                source_path: PathBuf::from("a.jpg"),
                output_path: PathBuf::from("out/a.jpg"),
                status: FileStatus::Processed(processed(4096, 1024)),
            },
            FileOutcome {
                source_path: PathBuf::from("b.jpg"),
                output_path: PathBuf::from("out/b.jpg"),
                status: FileStatus::Failed("bad header".into()),
            },
        ]);

        assert_eq!(
            format_summary(&summary),
            vec![
                "Processed: 1",
                "Skipped: 0",
                "Failed: 1",
                "Size: 4.0KB → 1.0KB (-75.0%)",
                "Errors",
                "    b.jpg: bad header",
            ]
        );
    }

    #[test]
    fn format_summary_nothing_processed() {
        let lines = format_summary(&Summary::default());
        assert_eq!(lines, vec!["Processed: 0", "Skipped: 0", "Failed: 0"]);
    }

    // =========================================================================
    // Preset tests
    // =========================================================================

    #[test]
    fn format_presets_lists_everything() {
        let lines = format_presets(&ResizeConfig::default());
        assert_eq!(lines[0], "Size presets");
        assert!(lines.contains(&"    hd         1920x1080".to_string()));
        assert!(lines.contains(&"    maximum  100".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("    pad      ")));
        assert_eq!(lines.last().unwrap(), "    JPEG PNG WEBP BMP GIF");
    }
}
