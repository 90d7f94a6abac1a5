//! distill CLI
//!
//! Lowers and strips source files, printing the distilled trees as JSON.
//! Options come from `.distiller.json` (or `--config`), then flags on top.

// Exclude from coverage - CLI binary tested via integration tests
#![cfg_attr(tarpaulin, ignore)]

use anyhow::{Context, Result};
use clap::Parser;
use code_distiller::{logging, DistillConfig, Distiller};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Distill source files down to their signatures.
#[derive(Parser, Debug)]
#[command(name = "distill")]
#[command(version = code_distiller::VERSION)]
#[command(about = "Distill source files into a language-agnostic IR, stripped to what matters")]
#[command(after_help = "EXAMPLES:
  # Public signatures of one file
  distill src/lib.rs

  # Everything, including private members and bodies
  distill --private --protected --internal --implementation src/*.py

  # Batch run that keeps going past bad files
  distill --continue-on-error --workers 4 -o api.json src/**/*.java
")]
struct Cli {
    /// Source files to distill
    #[arg(value_name = "FILES", required = true)]
    files: Vec<PathBuf>,

    /// Configuration file (default: ./.distiller.json when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    // ─── Visibility ───────────────────────────────────────────────────────
    /// Keep private declarations
    #[arg(long, help_heading = "Visibility")]
    private: bool,

    /// Keep protected declarations
    #[arg(long, help_heading = "Visibility")]
    protected: bool,

    /// Keep internal and package-private declarations
    #[arg(long, help_heading = "Visibility")]
    internal: bool,

    // ─── Content ──────────────────────────────────────────────────────────
    /// Keep function bodies and field initializers
    #[arg(long, help_heading = "Content")]
    implementation: bool,

    /// Keep line and block comments
    #[arg(long, help_heading = "Content")]
    comments: bool,

    /// Drop doc comments and docstrings
    #[arg(long, help_heading = "Content")]
    no_docstrings: bool,

    /// Drop imports
    #[arg(long, help_heading = "Content")]
    no_imports: bool,

    /// Drop fields
    #[arg(long, help_heading = "Content")]
    no_fields: bool,

    /// Drop functions and methods
    #[arg(long, help_heading = "Content")]
    no_methods: bool,

    /// Drop decorators, annotations and attributes
    #[arg(long, help_heading = "Content")]
    no_annotations: bool,

    // ─── Execution ────────────────────────────────────────────────────────
    /// Worker threads (0 = one per core)
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Report failing files and keep going
    #[arg(long)]
    continue_on_error: bool,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Apply flags on top of a loaded configuration
    fn apply(&self, mut config: DistillConfig) -> DistillConfig {
        let strip = &mut config.strip;
        strip.include_private |= self.private;
        strip.include_protected |= self.protected;
        strip.include_internal |= self.internal;
        strip.include_implementation |= self.implementation;
        strip.include_comments |= self.comments;
        strip.include_docstrings &= !self.no_docstrings;
        strip.include_imports &= !self.no_imports;
        strip.include_fields &= !self.no_fields;
        strip.include_methods &= !self.no_methods;
        strip.include_annotations &= !self.no_annotations;

        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        config.continue_on_error |= self.continue_on_error;
        config
    }
}

fn load_config(cli: &Cli) -> Result<DistillConfig> {
    let config = match &cli.config {
        Some(path) => DistillConfig::from_file(path)?,
        None => DistillConfig::discover(&std::env::current_dir()?)?,
    };
    Ok(cli.apply(config))
}

/// Returns whether every file was distilled
fn run(cli: Cli) -> Result<bool> {
    let config = load_config(&cli)?;
    info!(?config, "configuration resolved");

    let distiller = Distiller::new(config);
    let report = distiller.distill_paths(&cli.files)?;

    for failure in &report.failures {
        eprintln!("Error: {}: {}", failure.path.display(), failure.error);
    }

    let json = serde_json::to_string_pretty(&report.files)?;
    match &cli.output {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("writing {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }

    Ok(report.is_success())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
