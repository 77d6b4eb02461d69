// ============================================================================
// PhotoSmith CLI - headless batch filtering via command-line arguments
// ============================================================================
//
// Usage examples:
//   photosmith -i photo.png -f grayscale -f frame:gold -o framed.png
//   photosmith -i photo.jpg -f blur:30 -f "tint:#704214,0.4" -o out.jpg -q 85
//   photosmith -i "shots/*.jpg" -f edges --output-dir processed/ --format png
//   photosmith -i a.png --merge b.png --merge-mode resize -o blended.png
//
// Filters run in the order given, each one through the document so the log
// records exactly what was applied.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::canvas::Image;
use crate::config::EngineConfig;
use crate::io::{SaveFormat, load_image};
use crate::ops::catalog::Filter;
use crate::ops::progress::{LogSink, ProgressSink, StatusSink};
use crate::ops::transform::MergeMode;
use crate::project::{Document, FilterStatus};
use crate::{log_info, log_warn};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// PhotoSmith headless image filter.
#[derive(Parser, Debug)]
#[command(
    name = "photosmith",
    version,
    about = "PhotoSmith headless batch image filter",
    long_about = "Apply a chain of filters to image files without opening an editor.\n\
                  Reads and writes PNG, JPEG, WEBP, BMP, TGA and TIFF.\n\n\
                  Filters use the form name[:arg,arg...], for example:\n  \
                  grayscale, blur:40, rotate:90, flip:horizontal, frame:gold,\n  \
                  border:12,#ff8800, resize:640x480, tint:#8040c0,0.5, crop:0,0,100,80"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Filter to apply; repeat to build a chain.
    #[arg(short, long = "filter", value_name = "NAME[:ARGS]")]
    pub filters: Vec<String>,

    /// Image averaged into every input before the filter chain runs.
    #[arg(long, value_name = "FILE")]
    pub merge: Option<PathBuf>,

    /// How --merge handles size differences: overlap or resize.
    #[arg(long, default_value = "overlap", value_name = "MODE")]
    pub merge_mode: String,

    /// Output file path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: png, jpeg, webp, bmp, tga, tiff.
    /// When omitted, the format is inferred from --output's extension, defaulting to png.
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// JPEG quality (1–100). Overrides the config file.
    #[arg(short, long, value_name = "1-100")]
    pub quality: Option<u8>,

    /// Engine config file (JSON).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Fixed seed for the TV/CRT noise.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Report progress every N rows for every filter.
    #[arg(long, value_name = "N")]
    pub progress_interval: Option<u32>,

    /// Print filter status lines, progress and per-file timing.
    #[arg(short, long)]
    pub verbose: bool,
}

// ============================================================================
// Console sinks
// ============================================================================

/// Prints status lines and a percentage when verbose; always mirrors into
/// the session log.
struct ConsoleSink {
    verbose: bool,
}

impl StatusSink for ConsoleSink {
    fn message(&mut self, text: &str) {
        LogSink.message(text);
        if self.verbose {
            println!("  {}", text);
        }
    }
}

impl ProgressSink for ConsoleSink {
    fn report(&mut self, current: u32, total: u32) {
        if self.verbose && total > 0 {
            print!("\r  {:>3}%", current as u64 * 100 / total as u64);
            if current == total {
                println!();
            }
            let _ = std::io::stdout().flush();
        }
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    if run_batch(args) { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// `true` when every input was processed and saved.
fn run_batch(args: CliArgs) -> bool {
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return false;
    }

    let target = match OutputTarget::from_args(args.output.as_deref(), args.output_dir.as_deref()) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {}", e);
            return false;
        }
    };
    if inputs.len() > 1 && matches!(target, OutputTarget::File(_)) {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return false;
    }

    let config = match build_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            return false;
        }
    };

    let save_format = match parse_format(args.format.as_deref(), args.output.as_deref()) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {}", e);
            return false;
        }
    };

    // Parse the whole chain up front so a typo fails before any file is touched.
    let mut chain = Vec::with_capacity(args.filters.len());
    for text in &args.filters {
        match text.parse::<Filter>() {
            Ok(f) => chain.push(f),
            Err(e) => {
                eprintln!("error: bad filter '{}': {}", text, e);
                return false;
            }
        }
    }

    let merge_mode: MergeMode = match args.merge_mode.parse() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {}", e);
            return false;
        }
    };
    let merge_image: Option<Image> = match &args.merge {
        Some(path) => match load_image(path) {
            Ok(img) => Some(img),
            Err(e) => {
                eprintln!("error: could not load merge image '{}': {}", path.display(), e);
                return false;
            }
        },
        None => None,
    };

    if let Some(dir) = &args.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "error: could not create output directory '{}': {}",
                dir.display(),
                e
            );
            return false;
        }
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }

        let file_start = Instant::now();

        let output_path = match target.path_for(input_path, save_format) {
            Some(p) => p,
            None => {
                eprintln!(
                    "  error: cannot determine output path for '{}'.",
                    input_path.display()
                );
                any_failure = true;
                continue;
            }
        };

        let job = FileJob {
            input: input_path,
            output: &output_path,
            chain: &chain,
            merge: merge_image.as_ref().map(|img| (img, merge_mode)),
            format: save_format,
            config: &config,
            verbose: args.verbose,
        };

        match run_one(job) {
            Ok(()) => {
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                eprintln!("  error: {}", e);
                log_warn!("{}: {}", input_path.display(), e);
                any_failure = true;
            }
        }
    }

    !any_failure
}

// ============================================================================
// Per-file processing pipeline
// ============================================================================

struct FileJob<'a> {
    input: &'a Path,
    output: &'a Path,
    chain: &'a [Filter],
    merge: Option<(&'a Image, MergeMode)>,
    format: SaveFormat,
    config: &'a EngineConfig,
    verbose: bool,
}

fn run_one(job: FileJob<'_>) -> Result<(), String> {
    // -- Step 1: Load ----------------------------------------------------
    let mut doc = Document::open(job.input, job.config.clone())
        .map_err(|e| format!("load failed: {}", e))?;

    // -- Step 2: Merge (optional) ----------------------------------------
    if let Some((other, mode)) = job.merge {
        let sink = ConsoleSink { verbose: job.verbose };
        if let FilterStatus::Failed(e) = doc.merge(other, mode, sink) {
            return Err(format!("merge failed: {}", e));
        }
    }

    // -- Step 3: Filter chain --------------------------------------------
    for filter in job.chain {
        let progress = ConsoleSink { verbose: job.verbose };
        let status = ConsoleSink { verbose: job.verbose };
        match doc.apply(filter, progress, status) {
            FilterStatus::Completed => {}
            FilterStatus::Cancelled => return Err(format!("{} was cancelled", filter)),
            FilterStatus::Failed(e) => return Err(format!("{} failed: {}", filter, e)),
        }
    }

    // -- Step 4: Save ----------------------------------------------------
    doc.save(job.output, job.format)
        .map_err(|e| format!("save failed: {}", e))?;

    log_info!(
        "{} -> {} [{}]",
        job.input.display(),
        job.output.display(),
        doc.history().undo_history().join(" <- ")
    );
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Config file first, then individual flags on top.
fn build_config(args: &CliArgs) -> Result<EngineConfig, String> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path).map_err(|e| e.to_string())?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.tv_seed = Some(seed);
    }
    if let Some(interval) = args.progress_interval {
        config.progress_interval = Some(interval);
    }
    if let Some(q) = args.quality {
        config.jpeg_quality = q.clamp(1, 100);
    }
    Ok(config)
}

/// Every input the patterns name, in first-seen order without repeats.
/// An existing path is taken literally even if it contains glob syntax.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    patterns
        .iter()
        .flat_map(|pattern| expand_pattern(pattern))
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

fn expand_pattern(pattern: &str) -> Vec<PathBuf> {
    let literal = PathBuf::from(pattern);
    if literal.is_file() {
        return vec![literal];
    }
    let files: Vec<PathBuf> = match glob::glob(pattern) {
        Ok(paths) => paths.filter_map(Result::ok).filter(|p| p.is_file()).collect(),
        Err(e) => {
            eprintln!("warning: skipping '{}': {}", pattern, e);
            return Vec::new();
        }
    };
    if files.is_empty() {
        eprintln!("warning: '{}' matched no files.", pattern);
        log_warn!("input pattern '{}' matched nothing", pattern);
    }
    files
}

/// Choose the [`SaveFormat`] from the `--format` string or infer it from the
/// output file extension. Defaults to PNG when neither is given; an explicit
/// but unknown `--format` is an error.
fn parse_format(format_arg: Option<&str>, output: Option<&Path>) -> Result<SaveFormat, String> {
    if let Some(f) = format_arg {
        return f.parse().map_err(|e: crate::io::IoError| e.to_string());
    }
    Ok(output.and_then(SaveFormat::from_path).unwrap_or_default())
}

/// Where results are written.
#[derive(Debug, PartialEq)]
enum OutputTarget {
    /// `--output`: one explicit file.
    File(PathBuf),
    /// `--output-dir`: `<dir>/<input stem>.<ext>`.
    Dir(PathBuf),
    /// Neither flag: next to the input, renamed to the output format.
    BesideInput,
}

impl OutputTarget {
    fn from_args(output: Option<&Path>, output_dir: Option<&Path>) -> Result<Self, String> {
        match (output, output_dir) {
            (Some(_), Some(_)) => Err("--output and --output-dir are mutually exclusive.".to_string()),
            (Some(file), None) => Ok(OutputTarget::File(file.to_path_buf())),
            (None, Some(dir)) => Ok(OutputTarget::Dir(dir.to_path_buf())),
            (None, None) => Ok(OutputTarget::BesideInput),
        }
    }

    /// `None` only for inputs without a file name. Never returns `input`
    /// itself: a collision gets an `_out` suffix.
    fn path_for(&self, input: &Path, format: SaveFormat) -> Option<PathBuf> {
        let stem = input.file_stem()?.to_string_lossy();
        let file_name = format!("{}.{}", stem, format.extension());
        match self {
            OutputTarget::File(path) => Some(path.clone()),
            OutputTarget::Dir(dir) => Some(dir.join(file_name)),
            OutputTarget::BesideInput => {
                let sibling = input.with_file_name(file_name);
                if sibling == input {
                    Some(input.with_file_name(format!("{}_out.{}", stem, format.extension())))
                } else {
                    Some(sibling)
                }
            }
        }
    }
}
