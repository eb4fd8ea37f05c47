//! # Bulk Resize
//!
//! Batch-resize, rename, and re-encode every image in a directory tree.
//! Point it at a folder, pick a size and an aspect mode, and each image is
//! written next to the others under `<input>/resized` with a predictable
//! name.
//!
//! # Architecture
//!
//! ```text
//! scan ─► naming ─► collision check ─► plan ─► codec ─► Summary
//!  files    output     skip or go        geometry  decode/crop/
//!           path                                   resize/pad/encode
//! ```
//!
//! The geometry is a pure function of the source size and the request, and
//! the codec sits behind the [`imaging::ImageCodec`] trait, so the whole
//! batch can be exercised in tests without encoding a single pixel.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Discovery: walks the input root, lists images by extension |
//! | [`naming`] | `<prefix><stem><suffix>[_NNNN].<ext>` output names |
//! | [`imaging`] | Geometry planning, the codec trait, and the `image`-crate codec |
//! | [`process`] | The batch: collision policy, per-file outcomes, progress events |
//! | [`config`] | `resize.toml` loading, validation, presets |
//! | [`types`] | Shared value types (`Dimensions`, `AspectMode`, `OutputFormat`) |
//! | [`output`] | CLI output formatting for progress, summaries, presets |
//!
//! # Design Decisions
//!
//! ## Aspect Modes
//!
//! | Mode | Result |
//! |------|--------|
//! | `fit` | Shrinks to fit inside the box; never enlarges |
//! | `fill` | Center-crops to the box aspect, then scales to the exact box |
//! | `stretch` | Scales to the exact box, ignoring aspect |
//! | `pad` | Fits, then centers on a white canvas of the exact box |
//!
//! ## Failures Stay Local
//!
//! A file that cannot be decoded or encoded is recorded in the [`process::Summary`]
//! with the codec's message, and the batch moves on. Only problems with the
//! run itself (missing input, zero-sized request) are errors.
//!
//! ## Re-runs Are Cheap
//!
//! Existing outputs are skipped unless overwrite is on, so running the same
//! command twice writes nothing the second time.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;
pub mod types;
