//! Train on every language but one, test on the held-out language.

use super::{evaluate, RunOptions, RunResult};
use cwi_core::{ExperimentConfig, Language, Result};
use cwi_data::SplitResolver;
use cwi_models::CrosslingualCwi;

pub const EXPERIMENT: &str = "crosslingual";

/// Train one [`CrosslingualCwi`] for `language` and evaluate it on every
/// dataset of that language.
///
/// The training set does not depend on the held-out dataset, so it is taken
/// from the language's default source.
pub fn run_crosslingual(
    resolver: &SplitResolver,
    config: &ExperimentConfig,
    language: Language,
    options: &RunOptions,
) -> Result<Vec<RunResult>> {
    let training = resolver.resolve(language, None)?;
    let mut model = CrosslingualCwi::new(config)?;
    model.train(&training.train)?;

    let mut results = Vec::new();
    for source in resolver.catalog().sources(language) {
        let split = resolver.resolve(language, Some(source))?;
        println!("\nTesting on {language} - {source}.");
        results.extend(evaluate(
            &model, EXPERIMENT, language, source, &split, options,
        )?);
    }
    println!();
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runners::{EvalSplit, SplitKind};
    use cwi_core::{CwiError, Label, Record, SourceCatalog, Split, SplitTable};
    use std::path::Path;
    use std::sync::Arc;

    fn row(language: Language, word: &str, label: Label) -> Record {
        Record::new(language, word, format!("{word} .")).with_label(label)
    }

    fn french_table() -> SplitTable {
        let train = vec![
            row(Language::English, "cat", Label::NotComplex),
            row(Language::English, "ubiquitous", Label::Complex),
            row(Language::Spanish, "sol", Label::NotComplex),
            row(Language::Spanish, "extraordinariamente", Label::Complex),
            row(Language::German, "Haus", Label::NotComplex),
            row(Language::German, "Unabhängigkeit", Label::Complex),
        ];
        let mut table = SplitTable::new();
        table.insert(
            Language::French,
            "French",
            Split {
                train: train.into(),
                dev: Default::default(),
                test: vec![
                    row(Language::French, "chat", Label::NotComplex),
                    row(Language::French, "incompréhensible", Label::Complex),
                ]
                .into(),
            },
        );
        table
    }

    fn resolver(dir: &Path, table: SplitTable) -> SplitResolver {
        let path = dir.join("all_splits.json");
        SplitResolver::new(path, Arc::new(SourceCatalog::default()), move |out: &Path| {
            table.save(out)
        })
    }

    #[test]
    fn test_missing_dev_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver(dir.path(), french_table());
        let options = RunOptions {
            eval_split: EvalSplit::Both,
            detailed_report: false,
        };
        let results =
            run_crosslingual(&resolver, &ExperimentConfig::default(), Language::French, &options)
                .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].split, SplitKind::Test);
        assert_eq!(results[0].num_samples, 2);
        assert_eq!(results[0].language, Language::French);
    }

    #[test]
    fn test_unknown_held_out_pair() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver(dir.path(), french_table());
        let err = run_crosslingual(
            &resolver,
            &ExperimentConfig::default(),
            Language::German,
            &RunOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CwiError::KeyNotFound { .. }));
    }
}
