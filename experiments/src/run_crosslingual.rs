//! Trains the model on all languages but one and tests on the held-out one.
//!
//! Usage:
//!   cargo run --bin run-crosslingual
//!   cargo run --bin run-crosslingual -- --language german --eval_split both

use anyhow::Context;
use clap::Parser;
use cwi_core::Language;
use cwi_data::SplitResolver;
use cwi_experiments::prelude::*;
use cwi_experiments::{init_tracing, load_config, parse_language};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "run-crosslingual",
    about = "Trains the model in all languages but one, and tests on the left out language."
)]
struct Cli {
    /// Language of the dataset(s) where to test the model.
    #[arg(short, long, default_value = "french", value_parser = parse_language)]
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
    let catalog = Arc::new(config.catalog.clone());
    let resolver = SplitResolver::from_config(&config, catalog);
    let options = RunOptions {
        eval_split: cli.eval_split,
        detailed_report: cli.detailed_report,
    };

    let results = run_crosslingual(&resolver, &config, cli.language, &options)
        .with_context(|| format!("crosslingual run held out {}", cli.language))?;
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
