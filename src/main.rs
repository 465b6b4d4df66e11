//! reftrim: trim alignment ends against a reference taxon.
//!
//! ## Usage
//!
//! ```bash
//! reftrim --input nexus/ --output trimmed/ \
//!         --reference gallus_gallus --target ALL \
//!         --trim-file trimmed/trim.tsv
//! ```
//!
//! Each `*.nexus` file in the input directory is trimmed against the
//! reference taxon's missing-data ends and written to the output
//! directory under the same name; `--trim-file` receives one
//! tab-separated row per trimming operation.

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use reftrim::pipeline::{self, Config, TargetMode};

/// Logging verbosity for the run.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Verbosity {
    /// Progress and diagnostics
    Info,
    /// Warnings and errors only
    Warn,
    /// Errors only
    Critical,
}

impl Verbosity {
    fn level_filter(self) -> log::LevelFilter {
        match self {
            Verbosity::Info => log::LevelFilter::Info,
            Verbosity::Warn => log::LevelFilter::Warn,
            Verbosity::Critical => log::LevelFilter::Error,
        }
    }
}

/// Trim sequences of a target taxon (or every taxon) based on the
/// missing-data ends of a reference taxon, across a directory of
/// NEXUS alignments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing the input NEXUS alignments
    #[arg(long, value_name = "DIR", value_parser = parse_existing_dir)]
    input: PathBuf,

    /// Directory in which to store the trimmed alignments
    #[arg(long, value_name = "DIR")]
    output: PathBuf,

    /// Reference taxon whose missing-data ends define the trim
    /// boundary
    #[arg(long, value_name = "TAXON")]
    reference: String,

    /// Target taxon to trim; the literal "ALL" (case-sensitive) trims
    /// every taxon
    #[arg(long, value_name = "TAXON")]
    target: String,

    /// File that will receive one tab-separated row per trimming
    /// operation
    #[arg(long, value_name = "FILE")]
    trim_file: PathBuf,

    /// Taxa to exclude from every output alignment
    #[arg(long, value_name = "TAXON", num_args = 1.., conflicts_with = "include")]
    exclude: Vec<String>,

    /// Taxa to keep; all other taxa are removed
    #[arg(long, value_name = "TAXON", num_args = 1..)]
    include: Vec<String>,

    /// Directory to hold the log file (default: log to stderr)
    #[arg(long, value_name = "DIR", value_parser = parse_existing_dir)]
    log_path: Option<PathBuf>,

    /// Logging verbosity
    #[arg(long, value_enum, default_value = "info")]
    verbosity: Verbosity,
}

/// Validates that a CLI path argument names an existing directory.
fn parse_existing_dir(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("'{}' is not a directory", value))
    }
}

/// Configures the logger once at startup: verbosity from the CLI, and
/// a log file under `--log-path` when given (stderr otherwise).
fn init_logging(verbosity: Verbosity, log_path: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(verbosity.level_filter());
    if let Some(dir) = log_path {
        let path = dir.join("reftrim.log");
        let file = File::create(&path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbosity, args.log_path.as_deref())?;
    info!("{:=^65}", " Starting reftrim ");

    fs::create_dir_all(&args.output).with_context(|| {
        format!("failed to create output directory {}", args.output.display())
    })?;

    let config = Config {
        input: args.input,
        output: args.output,
        reference: args.reference,
        target: TargetMode::from_arg(&args.target),
        exclude: args.exclude,
        include: args.include,
        trim_file: args.trim_file,
    };

    pipeline::run(&config, &mut io::stdout())?;

    info!("{:=^65}", " Completed reftrim ");
    Ok(())
}
