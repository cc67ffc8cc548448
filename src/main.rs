//! nutqa - static QA checker for shell codebases
//!
//! A fast, local-first analyzer that flags near-duplicate function names
//! and trivial wrapper functions across a shell library.

use anyhow::Result;
use clap::Parser;
use nutqa::cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // RUST_LOG wins over --log-level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    cli::run(args)
}
