//! Trains and tests one model per dataset of a language.
//!
//! Usage:
//!   cargo run --bin run-monolingual
//!   cargo run --bin run-monolingual -- --language spanish --eval_split both
//!   cargo run --bin run-monolingual -- -l german -d --output results/german.json

use anyhow::Context;
use clap::Parser;
use cwi_core::Language;
use cwi_data::RawSplits;
use cwi_experiments::prelude::*;
use cwi_experiments::{init_tracing, load_config, parse_monolingual_language};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "run-monolingual",
    about = "Trains and tests the model for all datasets of a language."
)]
struct Cli {
    /// Language of the dataset(s): english, spanish or german.
    #[arg(short, long, default_value = "english", value_parser = parse_monolingual_language)]
    language: Language,

    /// The split of the data to use for evaluating performance.
    #[arg(short, long = "eval_split", value_enum, default_value_t = EvalSplit::Test)]
    eval_split: EvalSplit,

    /// Present a detailed performance report per label.
    #[arg(short, long = "detailed_report")]
    detailed_report: bool,

    /// YAML configuration file (overrides CWI_CONFIG).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write collected results as JSON.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref()).context("loading configuration")?;
    let provider = RawSplits::new(&config.raw_data_dir);
    let options = RunOptions {
        eval_split: cli.eval_split,
        detailed_report: cli.detailed_report,
    };

    let results = run_monolingual(&provider, &config.catalog, &config, cli.language, &options)
        .with_context(|| format!("monolingual run for {}", cli.language))?;
    print_summary_table(&results);

    if let Some(path) = cli.output {
        save_results(&results, &path)
            .with_context(|| format!("writing results to {}", path.display()))?;
        println!("Results saved to: {}", path.display());
    }
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
