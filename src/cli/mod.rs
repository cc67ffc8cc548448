//! CLI command definitions and handlers

use crate::config;
use crate::pipeline::Pipeline;
use crate::reporters;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// nutqa - static QA for shell codebases
#[derive(Parser, Debug)]
#[command(name = "nutqa")]
#[command(
    version,
    about = "Static QA for shell codebases — flags near-duplicate function names and trivial wrappers",
    long_about = "nutqa scans a shell codebase, extracts every function definition, and runs \
two corpus-wide checks: edit-distance fuzzy matching over all function names to catch \
copy-paste duplicates, and a multi-criterion classifier that flags short wrapper \
functions with no reuse or complexity to justify them.\n\n\
Configuration lives in the [qa] table of nut.toml at the scan root.",
    after_help = "\
Examples:
  nutqa .                       Check the current directory
  nutqa check . --format json   JSON output for scripting
  nutqa check . --fail-on-warn  Exit non-zero on warnings too (strict CI)
  nutqa init                    Write a commented nut.toml [qa] section"
)]
pub struct Cli {
    /// Path to repository (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (1-64)
    #[arg(long, global = true, default_value = "8", value_parser = parse_workers)]
    pub workers: usize,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan and check the codebase (default when no subcommand is given)
    Check {
        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Also fail the run on WARN findings (strict CI mode)
        #[arg(long)]
        fail_on_warn: bool,
    },

    /// Initialize a nut.toml config file with example QA settings
    Init,
}

/// Dispatch the parsed CLI
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Init) => run_init(&cli.path),
        Some(Commands::Check {
            format,
            output,
            fail_on_warn,
        }) => run_check(&cli.path, cli.workers, &format, output.as_deref(), fail_on_warn),
        None => run_check(&cli.path, cli.workers, "text", None, false),
    }
}

fn run_check(
    path: &Path,
    workers: usize,
    format: &str,
    output: Option<&Path>,
    fail_on_warn: bool,
) -> Result<()> {
    let qa_config = config::load_qa_config(path);
    let pipeline = Pipeline::new(qa_config)?.with_workers(workers);
    let report = pipeline.run(path)?;

    let rendered = reporters::report(&report, format)?;
    match output {
        Some(out_path) => {
            std::fs::write(out_path, &rendered)
                .with_context(|| format!("Failed to write {}", out_path.display()))?;
            println!("Report written to {}", out_path.display());
        }
        None => print!("{rendered}"),
    }

    let has_warns = report.counts.duplicate_warn > 0 || report.counts.wrapper_warn > 0;
    if report.should_fail || (fail_on_warn && has_warns) {
        std::process::exit(1);
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# nutqa configuration
# All keys are optional; the values shown are the defaults.

[qa]
include = ["*.sh"]
exclude = []
# Comment markers that exempt the following function from wrapper checks,
# e.g.  # @public-api  or  # @wrapper-ok
markers = []

[qa.thresholds]
min_name_length = 4
similarity_threshold = 0.85
full_fail_threshold = 0.95
strip_warn_threshold = 0.90
max_lines = 2
local_usage_threshold = 4
global_usage_threshold = 6
min_vars_for_ergonomic = 2
token_complexity_warn = 3
token_complexity_pass = 4
"#;

fn run_init(path: &Path) -> Result<()> {
    let root = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;
    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }

    let config_path = root.join("nut.toml");
    if config_path.exists() {
        println!("nut.toml already exists at {}; not overwriting", config_path.display());
        return Ok(());
    }

    std::fs::write(&config_path, SAMPLE_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Wrote {}", config_path.display());
    Ok(())
}
