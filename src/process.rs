//! Batch processing.
//!
//! Discovers images under an input root and runs each one through naming,
//! the collision check, geometry planning and the codec. One
//! [`BatchProcessor`] is used per run; it owns the sequence counter and
//! produces a [`Summary`].
//!
//! ## Per-file flow
//!
//! ```text
//! source ─► output_path ─► exists && !overwrite? ─► Skipped
//!                                   │
//!                                   └─► transform_image ─► Processed | Failed
//! ```
//!
//! A codec failure is recorded against the file and the batch carries on.
//! Only run-level problems (missing input root, zero requested dimension,
//! unreadable directory tree) abort the run.
//!
//! ## Output Structure
//!
//! ```text
//! photos/                       photos/resized/
//! ├── beach.JPG          ──►    ├── resized_beach.jpg
//! ├── logo.png           ──►    ├── resized_logo.png
//! └── 2024/                     └── 2024/            (recursive only)
//!     └── june.webp      ──►        └── resized_june.webp
//! ```
//!
//! ## Parallel Processing
//!
//! With `jobs > 1` files are processed with [rayon](https://docs.rs/rayon).
//! Output names and skip decisions are made up front in discovery order, so
//! with sequential naming the counter is the file's discovery position.
//! Outcomes come back in discovery order regardless of completion order.

use crate::imaging::{CodecError, ImageCodec, ResizeRequest, transform_image};
use crate::naming::{self, NamingOptions};
use crate::scan::{self, SUPPORTED_EXTENSIONS, ScanError};
use crate::types::Dimensions;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Output directory used when none is given, relative to the input root.
pub const DEFAULT_OUTPUT_DIR: &str = "resized";

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Everything a run needs to know.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input: PathBuf,
    /// Defaults to `<input>/resized`.
    pub output: Option<PathBuf>,
    pub request: ResizeRequest,
    pub naming: NamingOptions,
    pub recursive: bool,
    pub overwrite: bool,
    /// Worker count; 1 processes files one at a time.
    pub jobs: usize,
}

impl BatchOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            request: ResizeRequest::default(),
            naming: NamingOptions::default(),
            recursive: false,
            overwrite: false,
            jobs: 1,
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.join(DEFAULT_OUTPUT_DIR))
    }
}

/// Sizes recorded for a successfully written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessedFile {
    pub original_size: Dimensions,
    pub new_size: Dimensions,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

impl ProcessedFile {
    /// Percentage of bytes saved; negative when the file grew.
    pub fn reduction_percent(&self) -> f64 {
        if self.bytes_before == 0 {
            return 0.0;
        }
        (self.bytes_before as f64 - self.bytes_after as f64) / self.bytes_before as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Processed(ProcessedFile),
    /// Destination already existed and overwrite was off.
    Skipped,
    Failed(String),
}

/// What happened to one discovered file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutcome {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    pub status: FileStatus,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, FileStatus::Processed(_))
    }

    pub fn filename(&self) -> String {
        file_name(&self.source_path)
    }
}

/// Aggregate result of a run. Every list is in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub found: usize,
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// `(filename, message)` for each failure.
    pub errors: Vec<(String, String)>,
    pub outcomes: Vec<FileOutcome>,
}

impl Summary {
    pub fn from_outcomes(outcomes: Vec<FileOutcome>) -> Self {
        let mut summary = Summary {
            found: outcomes.len(),
            ..Summary::default()
        };
        for outcome in &outcomes {
            match &outcome.status {
                FileStatus::Processed(_) => summary.processed += 1,
                FileStatus::Skipped => summary.skipped += 1,
                FileStatus::Failed(message) => {
                    summary.failed += 1;
                    summary.errors.push((outcome.filename(), message.clone()));
                }
            }
        }
        summary.outcomes = outcomes;
        summary
    }

    /// Total bytes of processed sources and of what was written for them.
    pub fn byte_totals(&self) -> (u64, u64) {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.status {
                FileStatus::Processed(p) => Some((p.bytes_before, p.bytes_after)),
                _ => None,
            })
            .fold((0, 0), |(b, a), (pb, pa)| (b + pb, a + pa))
    }
}

/// Progress events sent while a run is underway.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Started {
        total: usize,
        output_dir: PathBuf,
    },
    /// `index` is 1-based discovery position.
    FileFinished {
        index: usize,
        total: usize,
        filename: String,
        outcome: FileOutcome,
    },
}

/// Runs one batch. Consumed by [`BatchProcessor::run`].
pub struct BatchProcessor<'a, C: ImageCodec> {
    codec: &'a C,
    options: BatchOptions,
    counter: u32,
}

impl<'a, C: ImageCodec> BatchProcessor<'a, C> {
    /// Naming always follows the request's output format.
    pub fn new(codec: &'a C, mut options: BatchOptions) -> Self {
        options.naming.output_format = options.request.output_format;
        Self {
            codec,
            options,
            counter: 1,
        }
    }

    pub fn run(mut self, events: Option<Sender<ProcessEvent>>) -> Result<Summary, ProcessError> {
        self.validate()?;

        let output_root = self.options.output_dir();
        scan::ensure_dir(&output_root)?;
        let exclude = scan::nested_output(&self.options.input, &output_root);
        let files = scan::list_matching(
            &self.options.input,
            SUPPORTED_EXTENSIONS,
            self.options.recursive,
            exclude.as_deref(),
        )?;

        let total = files.len();
        info!(
            input = %self.options.input.display(),
            output = %output_root.display(),
            total,
            jobs = self.options.jobs,
            "starting batch"
        );
        send(
            events.as_ref(),
            ProcessEvent::Started {
                total,
                output_dir: output_root.clone(),
            },
        );

        let outcomes = if self.options.jobs > 1 && total > 1 {
            self.run_parallel(&files, &output_root, events.as_ref())?
        } else {
            self.run_sequential(&files, &output_root, events.as_ref())
        };

        let summary = Summary::from_outcomes(outcomes);
        info!(
            processed = summary.processed,
            failed = summary.failed,
            skipped = summary.skipped,
            "batch finished"
        );
        Ok(summary)
    }

    fn validate(&self) -> Result<(), ProcessError> {
        let request = &self.options.request;
        if request.width == Some(0) || request.height == Some(0) {
            return Err(ProcessError::InvalidRequest(
                "width and height must be greater than zero".into(),
            ));
        }
        if !self.options.input.is_dir() {
            return Err(ScanError::NotADirectory(self.options.input.clone()).into());
        }
        Ok(())
    }

    fn destination_dir(&self, output_root: &Path, source: &Path) -> PathBuf {
        if self.options.recursive {
            output_root.join(scan::relative_dir(&self.options.input, source))
        } else {
            output_root.to_path_buf()
        }
    }

    fn run_sequential(
        &mut self,
        files: &[PathBuf],
        output_root: &Path,
        events: Option<&Sender<ProcessEvent>>,
    ) -> Vec<FileOutcome> {
        let total = files.len();
        let mut outcomes = Vec::with_capacity(total);

        for (i, source) in files.iter().enumerate() {
            let dir = self.destination_dir(output_root, source);
            let dest = naming::output_path(source, &dir, &self.options.naming, Some(self.counter));

            let status = if !self.options.overwrite && scan::exists(&dest) {
                debug!(dest = %dest.display(), "destination exists, skipping");
                FileStatus::Skipped
            } else {
                let status = process_file(self.codec, source, &dest, &self.options.request);
                if matches!(status, FileStatus::Processed(_)) {
                    self.counter += 1;
                }
                status
            };

            let outcome = FileOutcome {
                source_path: source.clone(),
                output_path: dest,
                status,
            };
            notify(events, i + 1, total, &outcome);
            outcomes.push(outcome);
        }

        outcomes
    }

    fn run_parallel(
        &self,
        files: &[PathBuf],
        output_root: &Path,
        events: Option<&Sender<ProcessEvent>>,
    ) -> Result<Vec<FileOutcome>, ProcessError> {
        let total = files.len();

        // Names and skips are fixed before any work starts. A destination
        // claimed by an earlier file is skipped for later ones.
        let mut claimed = HashSet::new();
        let planned: Vec<(&PathBuf, PathBuf, bool)> = files
            .iter()
            .enumerate()
            .map(|(i, source)| {
                let dir = self.destination_dir(output_root, source);
                let dest =
                    naming::output_path(source, &dir, &self.options.naming, Some(i as u32 + 1));
                let skip = (!self.options.overwrite && scan::exists(&dest))
                    || !claimed.insert(dest.clone());
                (source, dest, skip)
            })
            .collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.jobs)
            .build()?;

        let outcomes: Vec<FileOutcome> = pool.install(|| {
            planned
                .into_par_iter()
                .enumerate()
                .map(|(i, (source, dest, skip))| {
                    let status = if skip {
                        debug!(dest = %dest.display(), "destination exists, skipping");
                        FileStatus::Skipped
                    } else {
                        process_file(self.codec, source, &dest, &self.options.request)
                    };
                    let outcome = FileOutcome {
                        source_path: source.clone(),
                        output_path: dest,
                        status,
                    };
                    notify(events, i + 1, total, &outcome);
                    outcome
                })
                .collect()
        });

        Ok(outcomes)
    }
}

/// Transform one file and turn the result into a status.
fn process_file<C: ImageCodec>(
    codec: &C,
    source: &Path,
    dest: &Path,
    request: &ResizeRequest,
) -> FileStatus {
    match transform_file(codec, source, dest, request) {
        Ok(processed) => {
            debug!(
                source = %source.display(),
                dest = %dest.display(),
                from = %processed.original_size,
                to = %processed.new_size,
                "processed"
            );
            FileStatus::Processed(processed)
        }
        Err(e) => {
            warn!(source = %source.display(), error = %e, "failed to process");
            FileStatus::Failed(e.to_string())
        }
    }
}

fn transform_file<C: ImageCodec>(
    codec: &C,
    source: &Path,
    dest: &Path,
    request: &ResizeRequest,
) -> Result<ProcessedFile, CodecError> {
    let bytes_before = scan::file_size(source)?;
    if let Some(parent) = dest.parent() {
        scan::ensure_dir(parent)?;
    }
    let report = transform_image(codec, source, dest, request)?;
    let bytes_after = scan::file_size(dest)?;

    Ok(ProcessedFile {
        original_size: report.original_size,
        new_size: report.new_size,
        bytes_before,
        bytes_after,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn notify(events: Option<&Sender<ProcessEvent>>, index: usize, total: usize, outcome: &FileOutcome) {
    send(
        events,
        ProcessEvent::FileFinished {
            index,
            total,
            filename: outcome.filename(),
            outcome: outcome.clone(),
        },
    );
}

fn send(events: Option<&Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is listening.
        tx.send(event).ok();
    }
}
