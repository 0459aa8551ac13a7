//! One model per dataset: train and evaluate within a single language.

use super::{evaluate, RunOptions, RunResult};
use cwi_core::{ExperimentConfig, Language, Result, SourceCatalog};
use cwi_data::SplitProvider;
use cwi_models::MonolingualCwi;

pub const EXPERIMENT: &str = "monolingual";

/// Train and evaluate a [`MonolingualCwi`] for every dataset of `language`.
///
/// Datasets the provider has no data for, or whose training set is empty,
/// are skipped with a warning. Any other error aborts the run.
pub fn run_monolingual(
    provider: &dyn SplitProvider,
    catalog: &SourceCatalog,
    config: &ExperimentConfig,
    language: Language,
    options: &RunOptions,
) -> Result<Vec<RunResult>> {
    let sources = catalog.sources(language);
    if sources.is_empty() {
        tracing::warn!(%language, "no datasets listed for language");
    }

    let mut results = Vec::new();
    for source in sources {
        println!("\nModel for {language} - {source}.");

        let Some(split) = provider.split(language, source)? else {
            tracing::warn!(%language, source = %source, "no data found, skipping dataset");
            continue;
        };
        if split.train.is_empty() {
            tracing::warn!(%language, source = %source, "empty training set, skipping dataset");
            continue;
        }

        let mut model = MonolingualCwi::new(language, config)?;
        model.train(&split.train)?;
        results.extend(evaluate(
            &model, EXPERIMENT, language, source, &split, options,
        )?);
    }
    println!();
    Ok(results)
}
