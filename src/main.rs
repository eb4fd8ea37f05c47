use bulk_resize::config::{self, ResizeConfig};
use bulk_resize::imaging::{Quality, ResizeRequest, RustCodec};
use bulk_resize::naming::NamingOptions;
use bulk_resize::process::{BatchOptions, BatchProcessor};
use bulk_resize::output;
use bulk_resize::types::{AspectMode, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Flags shared by every command that runs a batch.
#[derive(clap::Args, Clone)]
struct BatchArgs {
    /// Directory of images to process
    input: PathBuf,

    /// Output directory [default: <INPUT>/resized]
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// JPEG quality (1-100). WEBP is written lossless and ignores it
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    quality: Option<u32>,

    /// Named quality level (see `presets`)
    #[arg(long, conflicts_with = "quality")]
    quality_preset: Option<String>,

    /// Text placed before each output name
    #[arg(long)]
    prefix: Option<String>,

    /// Text placed after each output name
    #[arg(long)]
    suffix: Option<String>,

    /// Append _0001, _0002, ... to output names
    #[arg(long)]
    sequential: bool,

    /// Descend into subdirectories, mirroring them in the output
    #[arg(long, short)]
    recursive: bool,

    /// Replace outputs that already exist instead of skipping them
    #[arg(long)]
    overwrite: bool,

    /// Drop EXIF metadata from JPEG, PNG and WEBP output
    #[arg(long)]
    no_metadata: bool,

    /// Number of files to process in parallel
    #[arg(long, short)]
    jobs: Option<usize>,

    /// Write the run summary as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(clap::Args, Clone)]
struct ResizeArgs {
    #[command(flatten)]
    batch: BatchArgs,

    /// Target width in pixels
    #[arg(long, short = 'W', value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,

    /// Target height in pixels
    #[arg(long, short = 'H', value_parser = clap::value_parser!(u32).range(1..))]
    height: Option<u32>,

    /// Named size (see `presets`)
    #[arg(long, conflicts_with_all = ["width", "height"])]
    preset: Option<String>,

    /// fit | fill | stretch | pad
    #[arg(long, short)]
    mode: Option<AspectMode>,

    /// JPEG | PNG | WEBP | BMP | GIF [default: keep source format]
    #[arg(long, short)]
    format: Option<OutputFormat>,
}

#[derive(clap::Args, Clone)]
struct ConvertArgs {
    #[command(flatten)]
    batch: BatchArgs,

    /// JPEG | PNG | WEBP | BMP | GIF
    #[arg(long, short)]
    format: OutputFormat,
}

#[derive(Parser)]
#[command(name = "bulk-resize")]
#[command(about = "Batch-resize, rename and re-encode images")]
#[command(long_about = "\
Batch-resize, rename and re-encode images

Every image in INPUT (jpg, jpeg, png, gif, bmp, tiff, webp, ico) is written
to the output directory as <prefix><name><suffix>[_0001].<ext>.

Aspect modes:
  fit      shrink to fit inside the box (never enlarges)
  fill     center-crop to the box, then scale to it exactly
  stretch  scale to the box exactly, may distort
  pad      fit, then center on a white canvas of the box size

Settings are read from resize.toml in INPUT (or --config), and flags
override them. Run 'bulk-resize gen-config' for a documented example.")]
#[command(version)]
struct Cli {
    /// Config file [default: <INPUT>/resize.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize every image in a directory
    Resize(ResizeArgs),
    /// Re-encode every image in a directory without resizing
    Convert(ConvertArgs),
    /// List size presets, quality presets, modes and formats
    Presets,
    /// Print a stock resize.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Resize(args) => {
            let config = load_config(cli.config.as_deref(), &args.batch.input)?;
            let d = &config.defaults;
            let (width, height) = match &args.preset {
                Some(name) => {
                    let size = config
                        .preset(name)
                        .ok_or_else(|| format!("unknown preset '{name}'"))?;
                    (Some(size.width), Some(size.height))
                }
                None if args.width.is_some() || args.height.is_some() => (args.width, args.height),
                None => (d.width, d.height),
            };
            let request = ResizeRequest {
                width,
                height,
                mode: args.mode.unwrap_or(d.mode),
                quality: resolve_quality(&config, &args.batch)?,
                output_format: args.format.or(d.format),
                preserve_metadata: d.preserve_metadata && !args.batch.no_metadata,
            };
            run_batch(&config, &args.batch, request)?;
        }
        Command::Convert(args) => {
            let config = load_config(cli.config.as_deref(), &args.batch.input)?;
            let request = ResizeRequest {
                width: None,
                height: None,
                mode: AspectMode::Fit,
                quality: resolve_quality(&config, &args.batch)?,
                output_format: Some(args.format),
                preserve_metadata: config.defaults.preserve_metadata && !args.batch.no_metadata,
            };
            run_batch(&config, &args.batch, request)?;
        }
        Command::Presets => {
            let config = load_config(cli.config.as_deref(), Path::new("."))?;
            output::print_presets(&config);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// An explicit `--config` must exist; otherwise `resize.toml` in `dir` is optional.
fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<ResizeConfig, config::ConfigError> {
    match explicit {
        Some(path) => config::load_config_file(path),
        None => config::load_config(dir),
    }
}

fn resolve_quality(config: &ResizeConfig, args: &BatchArgs) -> Result<Quality, String> {
    if let Some(q) = args.quality {
        return Ok(Quality::new(q));
    }
    match &args.quality_preset {
        Some(name) => config
            .quality_preset(name)
            .ok_or_else(|| format!("unknown quality preset '{name}'")),
        None => Ok(Quality::new(config.defaults.quality)),
    }
}

fn run_batch(
    config: &ResizeConfig,
    args: &BatchArgs,
    request: ResizeRequest,
) -> Result<(), Box<dyn std::error::Error>> {
    let d = &config.defaults;
    let options = BatchOptions {
        input: args.input.clone(),
        output: args.output.clone(),
        naming: NamingOptions {
            prefix: args.prefix.clone().unwrap_or_else(|| d.prefix.clone()),
            suffix: args.suffix.clone().unwrap_or_else(|| d.suffix.clone()),
            sequential: args.sequential,
            output_format: request.output_format,
        },
        request,
        recursive: args.recursive,
        overwrite: args.overwrite,
        jobs: config::effective_jobs(args.jobs.or(config.processing.jobs)),
    };

    let codec = RustCodec::new();
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    let summary = BatchProcessor::new(&codec, options).run(Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    let summary = summary?;

    println!();
    output::print_summary(&summary);

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)?;
    }

    Ok(())
}
