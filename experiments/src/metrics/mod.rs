//! Binary classification scores for CWI evaluation.
//!
//! - **Precision, Recall, F1** per label, with support
//! - **Accuracy** over all rows
//! - **Macro-F1**, the unweighted mean of the per-label F1 scores

use cwi_core::{CwiError, Label, Result};
use serde::{Deserialize, Serialize};

/// Confusion matrix with [`Label::Complex`] as the positive class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// Complex words predicted complex.
    pub tp: usize,
    /// Simple words predicted simple.
    pub tn: usize,
    /// Simple words predicted complex.
    pub fp: usize,
    /// Complex words predicted simple.
    pub fn_: usize,
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from aligned gold and predicted labels.
    pub fn from_labels(gold: &[Label], predicted: &[Label]) -> Result<Self> {
        if gold.len() != predicted.len() {
            return Err(CwiError::LengthMismatch {
                expected: gold.len(),
                actual: predicted.len(),
            });
        }
        let mut cm = Self::new();
        for (g, p) in gold.iter().zip(predicted) {
            cm.record(g.is_complex(), p.is_complex());
        }
        Ok(cm)
    }

    /// Record a prediction.
    pub fn record(&mut self, actual_complex: bool, predicted_complex: bool) {
        match (actual_complex, predicted_complex) {
            (true, true) => self.tp += 1,
            (false, false) => self.tn += 1,
            (false, true) => self.fp += 1,
            (true, false) => self.fn_ += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// (correct, predicted as, actually) counts for one label.
    fn counts(&self, label: Label) -> (usize, usize, usize) {
        match label {
            Label::Complex => (self.tp, self.tp + self.fp, self.tp + self.fn_),
            Label::NotComplex => (self.tn, self.tn + self.fn_, self.tn + self.fp),
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den > 0 {
        num as f64 / den as f64
    } else {
        0.0
    }
}

/// Scores for one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: Label,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl LabelScore {
    fn from_confusion_matrix(cm: &ConfusionMatrix, label: Label) -> Self {
        let (correct, predicted, actual) = cm.counts(label);
        let precision = ratio(correct, predicted);
        let recall = ratio(correct, actual);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            label,
            precision,
            recall,
            f1,
            support: actual,
        }
    }
}

/// Evaluation of one prediction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub accuracy: f64,
    pub macro_f1: f64,
    /// `not_complex` first, then `complex`.
    pub per_label: Vec<LabelScore>,
    pub confusion_matrix: ConfusionMatrix,
}

impl ScoreReport {
    pub fn from_confusion_matrix(cm: &ConfusionMatrix) -> Self {
        let per_label: Vec<LabelScore> = [Label::NotComplex, Label::Complex]
            .into_iter()
            .map(|label| LabelScore::from_confusion_matrix(cm, label))
            .collect();
        let macro_f1 = per_label.iter().map(|s| s.f1).sum::<f64>() / per_label.len() as f64;
        Self {
            accuracy: ratio(cm.tp + cm.tn, cm.total()),
            macro_f1,
            per_label,
            confusion_matrix: cm.clone(),
        }
    }

    pub fn from_labels(gold: &[Label], predicted: &[Label]) -> Result<Self> {
        Ok(Self::from_confusion_matrix(&ConfusionMatrix::from_labels(
            gold, predicted,
        )?))
    }

    pub fn num_samples(&self) -> usize {
        self.confusion_matrix.total()
    }

    pub fn label(&self, label: Label) -> Option<&LabelScore> {
        self.per_label.iter().find(|s| s.label == label)
    }

    /// One summary line, plus a per-label table when `detailed`.
    pub fn render(&self, detailed: bool) -> String {
        let summary = format!(
            "Macro-F1: {:.4}  Accuracy: {:.2}%  (n={})",
            self.macro_f1,
            self.accuracy * 100.0,
            self.num_samples()
        );
        if !detailed {
            return summary;
        }

        let mut out = String::new();
        out.push_str(&format!(
            "| {:<12} | {:>9} | {:>9} | {:>9} | {:>7} |\n",
            "Label", "Precision", "Recall", "F1", "Support"
        ));
        out.push_str(&format!(
            "|{:-<14}|{:-<11}|{:-<11}|{:-<11}|{:-<9}|\n",
            "", "", "", "", ""
        ));
        for s in &self.per_label {
            out.push_str(&format!(
                "| {:<12} | {:>9.4} | {:>9.4} | {:>9.4} | {:>7} |\n",
                s.label.to_string(),
                s.precision,
                s.recall,
                s.f1,
                s.support
            ));
        }
        out.push_str(&summary);
        out
    }
}

/// Score `predicted` against `gold` and render the report.
///
/// # Errors
///
/// Returns [`CwiError::LengthMismatch`] if the sequences differ in length.
pub fn report_binary_score(gold: &[Label], predicted: &[Label], detailed: bool) -> Result<String> {
    Ok(ScoreReport::from_labels(gold, predicted)?.render(detailed))
}
