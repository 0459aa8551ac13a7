//! Builds the crosslingual split table from the raw datasets.
//!
//! The runners generate the table on first use; this binary does it eagerly
//! and overwrites any existing table.

use anyhow::Context;
use clap::Parser;
use cwi_data::{CrosslingualPreprocessor, Preprocessor};
use cwi_experiments::{init_tracing, load_config};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "preprocess", about = "Build the crosslingual split table")]
struct Cli {
    /// YAML configuration file (overrides CWI_CONFIG).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref()).context("loading configuration")?;
    let preprocessor =
        CrosslingualPreprocessor::new(&config.raw_data_dir, Arc::new(config.catalog.clone()));
    preprocessor
        .generate(&config.split_table_path)
        .with_context(|| format!("building {}", config.split_table_path.display()))?;
    println!("Split table written to: {}", config.split_table_path.display());
    Ok(())
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
