//! cs-structure
//!
//! Describes the classes of one C# source file as a JSON array on stdout.
//!
//! ## Usage
//!
//! ```text
//! cs-structure src/Orders/OrderService.cs
//! echo src/Orders/OrderService.cs | cs-structure --pretty
//! ```
//!
//! ## Exit codes
//!
//! - `0` - success, stdout holds the JSON array
//! - `1` - input error: no path, missing or unreadable file, bad configuration
//! - `2` - processing error during parse, analysis or serialization
//!
//! Diagnostics and logs go to stderr only.

use anyhow::{Context, Result};
use clap::Parser;
use cs_structure_extractor::{
    loader, output, ExtractError, ExtractionProfile, Extractor, ExtractorConfig, SourceFile,
};
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_INPUT_ERROR: u8 = 1;
const EXIT_PROCESSING_ERROR: u8 = 2;

/// Extract constructors, methods, properties, guard clauses and referenced in-source
/// type definitions of every class in a C# file.
#[derive(Parser, Debug)]
#[command(name = "cs-structure")]
#[command(version)]
#[command(about = "Describe the classes of a C# source file as JSON", long_about = None)]
struct Cli {
    /// C# source file. Read from stdin when omitted.
    path: Option<PathBuf>,

    /// TOML file with extractor settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Extraction profile: full or public-surface
    #[arg(long, value_name = "PROFILE")]
    profile: Option<ExtractionProfile>,

    /// Pretty-print the JSON array
    #[arg(long)]
    pretty: bool,

    /// Log debug details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version also arrive here, on stdout
            let code = if err.use_stderr() { EXIT_INPUT_ERROR } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    init_logging(cli.verbose);

    let (mut extractor, source) = match prepare(&cli) {
        Ok(prepared) => prepared,
        Err(err) if err.is_input_error() => {
            eprintln!("Error: {err}");
            return ExitCode::from(EXIT_INPUT_ERROR);
        }
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::from(EXIT_PROCESSING_ERROR);
        }
    };

    ExitCode::from(execute(&mut extractor, &source, io::stdout().lock()))
}

/// Extract and write, mapping failures and panics to the processing exit code
fn execute<W: Write>(extractor: &mut Extractor, source: &SourceFile, out: W) -> u8 {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| run(extractor, source, out)));
    match outcome {
        Ok(Ok(())) => 0,
        Ok(Err(err)) => {
            eprintln!("Error processing {}: {err:#}", source.path.display());
            EXIT_PROCESSING_ERROR
        }
        Err(payload) => {
            eprintln!(
                "Error processing {}: {}",
                source.path.display(),
                panic_message(&*payload)
            );
            EXIT_PROCESSING_ERROR
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

/// Everything that can fail before parsing starts
fn prepare(cli: &Cli) -> Result<(Extractor, SourceFile), ExtractError> {
    let mut config = match &cli.config {
        Some(path) => ExtractorConfig::load(path)?,
        None => ExtractorConfig::default(),
    };
    if let Some(profile) = cli.profile {
        config.profile = profile;
    }
    if cli.pretty {
        config.pretty = true;
    }

    let path = loader::resolve_input_path(cli.path.as_deref(), io::stdin().lock())?;
    let source = loader::load(&path)?;

    log::debug!("Extraction profile: {}", config.profile);
    let extractor = Extractor::new(config)?;
    Ok((extractor, source))
}

fn run<W: Write>(extractor: &mut Extractor, source: &SourceFile, out: W) -> Result<()> {
    let classes = extractor
        .extract(source)
        .context("failed to extract class descriptors")?;
    output::write_json(out, &classes, extractor.config().pretty)
        .context("failed to write JSON")?;
    Ok(())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unexpected panic")
}
