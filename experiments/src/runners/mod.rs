//! Experiment runners.
//!
//! Each runner trains a model, evaluates it on the requested splits of every
//! dataset of a language, prints a score report per split and collects the
//! results:
//!
//! ```text
//! Model for english - News.
//!
//! Results on Test Data
//! Macro-F1: 0.8412  Accuracy: 86.05%  (n=2095)
//! ```

pub mod crosslingual;
pub mod monolingual;

use crate::metrics::ScoreReport;
use cwi_core::{Language, RecordCollection, Result, Split};
use cwi_models::CwiClassifier;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which evaluation splits to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalSplit {
    Dev,
    Test,
    Both,
}

impl EvalSplit {
    /// Concrete splits in evaluation order.
    pub fn parts(self) -> &'static [SplitKind] {
        match self {
            Self::Dev => &[SplitKind::Dev],
            Self::Test => &[SplitKind::Test],
            Self::Both => &[SplitKind::Dev, SplitKind::Test],
        }
    }
}

/// A single evaluation split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitKind {
    Dev,
    Test,
}

impl SplitKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Dev => "Development",
            Self::Test => "Test",
        }
    }

    pub fn records(self, split: &Split) -> &RecordCollection {
        match self {
            Self::Dev => &split.dev,
            Self::Test => &split.test,
        }
    }
}

/// Options shared by both runners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub eval_split: EvalSplit,
    pub detailed_report: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            eval_split: EvalSplit::Test,
            detailed_report: false,
        }
    }
}

/// Result of evaluating one model on one split of one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// `monolingual` or `crosslingual`.
    pub experiment: String,
    /// Language of the evaluation data.
    pub language: Language,
    /// Dataset name within the language.
    pub source: String,
    pub split: SplitKind,
    pub num_samples: usize,
    pub report: ScoreReport,
    /// Timestamp of the run.
    pub timestamp: String,
}

/// Evaluate a trained model on the splits requested in `options`.
///
/// Empty splits are skipped with an info log (French, for instance, ships no
/// development data).
pub fn evaluate<C: CwiClassifier + ?Sized>(
    model: &C,
    experiment: &str,
    language: Language,
    source: &str,
    split: &Split,
    options: &RunOptions,
) -> Result<Vec<RunResult>> {
    let mut results = Vec::new();
    for &kind in options.eval_split.parts() {
        let records = kind.records(split);
        if records.is_empty() {
            tracing::info!(
                %language,
                source,
                split = kind.title(),
                "evaluation split is empty, skipping"
            );
            continue;
        }

        println!("\nResults on {} Data", kind.title());
        let predictions = model.predict(records)?;
        let gold = records.gold_labels()?;
        let report = ScoreReport::from_labels(&gold, &predictions)?;
        println!("{}", report.render(options.detailed_report));

        results.push(RunResult {
            experiment: experiment.to_string(),
            language,
            source: source.to_string(),
            split: kind,
            num_samples: records.len(),
            report,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
    }
    Ok(results)
}

/// Print one table row per result.
pub fn print_summary_table(results: &[RunResult]) {
    if results.is_empty() {
        return;
    }
    println!(
        "\n| {:<30} | {:>8} | {:>8} | {:>7} |",
        "Dataset / Split", "Macro-F1", "Acc", "Samples"
    );
    println!("|{:-<32}|{:-<10}|{:-<10}|{:-<9}|", "", "", "", "");
    for r in results {
        println!(
            "| {:<30} | {:>8.4} | {:>7.2}% | {:>7} |",
            format!("{} {} ({})", r.language, r.source, r.split.title()),
            r.report.macro_f1,
            r.report.accuracy * 100.0,
            r.num_samples
        );
    }
}

/// Save results to a JSON file, creating parent directories.
pub fn save_results(results: &[RunResult], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), count = results.len(), "saved results");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ConfusionMatrix;
    use cwi_core::{CwiError, Label, Record};
    use cwi_models::{FitSummary, ModelState};

    /// Predicts complex for targets longer than five characters.
    struct LengthRule;

    impl CwiClassifier for LengthRule {
        fn train(&mut self, _records: &RecordCollection) -> Result<FitSummary> {
            Err(CwiError::EmptyTrainingSet)
        }

        fn predict(&self, records: &RecordCollection) -> Result<Vec<Label>> {
            Ok(records
                .iter()
                .map(|r| {
                    if r.target_word.chars().count() > 5 {
                        Label::Complex
                    } else {
                        Label::NotComplex
                    }
                })
                .collect())
        }

        fn state(&self) -> ModelState {
            ModelState::Ready
        }
    }

    fn split(dev: Vec<Record>, test: Vec<Record>) -> Split {
        Split {
            train: RecordCollection::default(),
            dev: dev.into(),
            test: test.into(),
        }
    }

    fn row(word: &str, label: Label) -> Record {
        Record::new(Language::English, word, "s").with_label(label)
    }

    #[test]
    fn test_eval_split_parts() {
        assert_eq!(EvalSplit::Dev.parts(), &[SplitKind::Dev]);
        assert_eq!(EvalSplit::Both.parts(), &[SplitKind::Dev, SplitKind::Test]);
    }

    #[test]
    fn test_empty_dev_is_skipped() {
        let split = split(
            vec![],
            vec![row("cat", Label::NotComplex), row("ubiquitous", Label::Complex)],
        );
        let options = RunOptions {
            eval_split: EvalSplit::Both,
            detailed_report: false,
        };
        let results = evaluate(&LengthRule, "test", Language::English, "News", &split, &options)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].split, SplitKind::Test);
        assert_eq!(results[0].num_samples, 2);
        assert_eq!(results[0].report.accuracy, 1.0);
    }

    #[test]
    fn test_unlabeled_evaluation_data() {
        let split = split(vec![], vec![Record::new(Language::English, "cat", "s")]);
        assert!(matches!(
            evaluate(
                &LengthRule,
                "test",
                Language::English,
                "News",
                &split,
                &RunOptions::default()
            ),
            Err(CwiError::MissingLabels { row: 0 })
        ));
    }

    #[test]
    fn test_save_results() {
        let result = RunResult {
            experiment: "monolingual".to_string(),
            language: Language::Spanish,
            source: "Spanish".to_string(),
            split: SplitKind::Test,
            num_samples: 22,
            report: ScoreReport::from_confusion_matrix(&ConfusionMatrix {
                tp: 10,
                tn: 10,
                fp: 1,
                fn_: 1,
            }),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("spanish.json");
        save_results(&[result], &path).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"spanish\""));
        assert!(json.contains("macro_f1"));
        let parsed: Vec<RunResult> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0].num_samples, 22);
    }
}
