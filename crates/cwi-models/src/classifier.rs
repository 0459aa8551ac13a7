//! Binary logistic regression trained with candle.
//!
//! # Architecture
//!
//! ```text
//! Input (n_features) → standardise → Linear(2) → Softmax
//! ```
//!
//! Weights start at zero and are trained with AdamW on cross-entropy over
//! seeded mini-batches, so a fixed seed gives identical parameters.

use crate::batch::BatchIterator;
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{Init, Linear, Module, Optimizer, VarBuilder, VarMap};
use cwi_core::{ClassifierConfig, CwiError, Label, Result};
use cwi_features::FeatureMatrix;
use serde::{Deserialize, Serialize};

/// Number of output classes (not complex, complex).
const NUM_CLASSES: usize = 2;

/// Scales below this are treated as constant columns.
const MIN_SCALE: f64 = 1e-12;

fn model_err(context: &'static str) -> impl Fn(candle_core::Error) -> CwiError {
    move |e| CwiError::Model(format!("{context}: {e}"))
}

/// Learned parameters of a fitted [`LogisticRegression`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    /// Per-column means subtracted before the linear layer.
    pub means: Vec<f32>,
    /// Per-column scales; 1 for constant columns.
    pub scales: Vec<f32>,
    /// `[2][n_features]`, class 0 row first.
    pub weight: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

impl LogisticParams {
    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    fn validate(&self) -> Result<()> {
        let n = self.n_features();
        let consistent = self.scales.len() == n
            && self.weight.len() == NUM_CLASSES
            && self.weight.iter().all(|row| row.len() == n)
            && self.bias.len() == NUM_CLASSES;
        if consistent {
            Ok(())
        } else {
            Err(CwiError::Model(
                "inconsistent classifier parameter shapes".to_string(),
            ))
        }
    }
}

/// Outcome of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSummary {
    pub rows: usize,
    pub n_features: usize,
    pub epochs: usize,
    pub final_loss: f64,
}

/// Logistic regression over a fixed-width feature matrix.
pub struct LogisticRegression {
    config: ClassifierConfig,
    device: Device,
    params: Option<LogisticParams>,
}

impl LogisticRegression {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            device: Device::Cpu,
            params: None,
        }
    }

    /// Restore a classifier fitted elsewhere.
    pub fn from_params(config: ClassifierConfig, params: LogisticParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            config,
            device: Device::Cpu,
            params: Some(params),
        })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn params(&self) -> Option<&LogisticParams> {
        self.params.as_ref()
    }

    pub fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    /// Column count fixed at fit time.
    pub fn n_features(&self) -> Option<usize> {
        self.params.as_ref().map(LogisticParams::n_features)
    }

    /// Fit on `x` with one label per row, replacing any previous fit.
    pub fn fit(&mut self, x: &FeatureMatrix, labels: &[Label]) -> Result<FitSummary> {
        let (rows, cols) = (x.rows(), x.cols());
        if rows == 0 {
            return Err(CwiError::EmptyTrainingSet);
        }
        if labels.len() != rows {
            return Err(CwiError::LengthMismatch {
                expected: rows,
                actual: labels.len(),
            });
        }
        if cols == 0 {
            return Err(CwiError::Model("feature matrix has no columns".to_string()));
        }

        let (means, scales) = column_stats(x);
        let inputs = standardize(x, &means, &scales, &self.device)
            .map_err(model_err("failed to build input tensor"))?;
        let label_ids: Vec<i64> = labels.iter().map(|l| l.as_index() as i64).collect();
        let targets = Tensor::new(label_ids.as_slice(), &self.device)
            .map_err(model_err("failed to build label tensor"))?;

        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &self.device);
        let weight = vb
            .get_with_hints((NUM_CLASSES, cols), "weight", Init::Const(0.0))
            .map_err(model_err("failed to create weight"))?;
        let bias = vb
            .get_with_hints(NUM_CLASSES, "bias", Init::Const(0.0))
            .map_err(model_err("failed to create bias"))?;
        let linear = Linear::new(weight.clone(), Some(bias.clone()));

        let mut optimizer = candle_nn::AdamW::new(
            varmap.all_vars(),
            candle_nn::ParamsAdamW {
                lr: self.config.learning_rate,
                weight_decay: self.config.weight_decay,
                ..Default::default()
            },
        )
        .map_err(model_err("failed to create optimizer"))?;

        let mut batches = BatchIterator::new(inputs, targets, rows, self.config.batch_size);
        let mut previous_loss = f64::MAX;
        let mut final_loss = 0.0;
        let mut epochs = 0;

        for epoch in 0..self.config.epochs {
            batches.reshuffle(self.config.seed, epoch);
            let mut epoch_loss = 0.0;
            let mut batch_count = 0usize;

            while let Some((batch_inputs, batch_labels)) = batches
                .next_batch()
                .map_err(model_err("failed to draw batch"))?
            {
                let logits = linear
                    .forward(&batch_inputs)
                    .map_err(model_err("forward pass failed"))?;
                let loss = candle_nn::loss::cross_entropy(&logits, &batch_labels)
                    .map_err(model_err("loss computation failed"))?;
                optimizer
                    .backward_step(&loss)
                    .map_err(model_err("backward step failed"))?;
                epoch_loss += loss
                    .to_scalar::<f32>()
                    .map_err(model_err("loss scalar failed"))? as f64;
                batch_count += 1;
            }

            final_loss = epoch_loss / batch_count.max(1) as f64;
            epochs = epoch + 1;
            tracing::trace!(epoch = epochs, loss = final_loss, "classifier epoch");

            if self.config.tolerance > 0.0
                && (previous_loss - final_loss).abs() < self.config.tolerance
            {
                tracing::debug!(epoch = epochs, loss = final_loss, "classifier converged");
                break;
            }
            previous_loss = final_loss;
        }

        let weight = weight
            .to_vec2::<f32>()
            .map_err(model_err("failed to read weight"))?;
        let bias = bias
            .to_vec1::<f32>()
            .map_err(model_err("failed to read bias"))?;
        self.params = Some(LogisticParams {
            means,
            scales,
            weight,
            bias,
        });

        Ok(FitSummary {
            rows,
            n_features: cols,
            epochs,
            final_loss,
        })
    }

    /// Probability of [`Label::Complex`] for each row.
    pub fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<f32>> {
        let params = self.params.as_ref().ok_or(CwiError::NotFitted)?;
        if x.cols() != params.n_features() {
            return Err(CwiError::FeatureMismatch {
                expected: params.n_features(),
                actual: x.cols(),
            });
        }
        if x.rows() == 0 {
            return Ok(Vec::new());
        }

        let inputs = standardize(x, &params.means, &params.scales, &self.device)
            .map_err(model_err("failed to build input tensor"))?;
        let flat: Vec<f32> = params.weight.iter().flatten().copied().collect();
        let weight = Tensor::from_vec(flat, (NUM_CLASSES, params.n_features()), &self.device)
            .map_err(model_err("failed to load weight"))?;
        let bias = Tensor::new(params.bias.as_slice(), &self.device)
            .map_err(model_err("failed to load bias"))?;
        let linear = Linear::new(weight, Some(bias));

        let logits = linear
            .forward(&inputs)
            .map_err(model_err("forward pass failed"))?;
        let probs = candle_nn::ops::softmax(&logits, D::Minus1)
            .map_err(model_err("softmax failed"))?;
        let probs: Vec<Vec<f32>> = probs
            .to_vec2()
            .map_err(model_err("failed to extract probabilities"))?;

        // Class 0 = not complex, class 1 = complex
        Ok(probs
            .into_iter()
            .map(|p| p.get(1).copied().unwrap_or(0.5))
            .collect())
    }

    /// One label per row. Ties go to [`Label::NotComplex`].
    pub fn predict(&self, x: &FeatureMatrix) -> Result<Vec<Label>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| {
                if p > 0.5 {
                    Label::Complex
                } else {
                    Label::NotComplex
                }
            })
            .collect())
    }
}

fn column_stats(x: &FeatureMatrix) -> (Vec<f32>, Vec<f32>) {
    let (rows, cols) = (x.rows(), x.cols());
    let mut sums = vec![0.0f64; cols];
    for r in 0..rows {
        for (c, v) in x.row(r).iter().enumerate() {
            sums[c] += f64::from(*v);
        }
    }
    let means: Vec<f64> = sums.iter().map(|s| s / rows as f64).collect();

    let mut squares = vec![0.0f64; cols];
    for r in 0..rows {
        for (c, v) in x.row(r).iter().enumerate() {
            let d = f64::from(*v) - means[c];
            squares[c] += d * d;
        }
    }
    let scales = squares
        .iter()
        .map(|s| {
            let std = (s / rows as f64).sqrt();
            if std < MIN_SCALE {
                1.0
            } else {
                std as f32
            }
        })
        .collect();
    (means.into_iter().map(|m| m as f32).collect(), scales)
}

fn standardize(
    x: &FeatureMatrix,
    means: &[f32],
    scales: &[f32],
    device: &Device,
) -> candle_core::Result<Tensor> {
    let mut data = Vec::with_capacity(x.rows() * x.cols());
    for r in 0..x.rows() {
        for ((v, m), s) in x.row(r).iter().zip(means).zip(scales) {
            data.push((v - m) / s);
        }
    }
    Tensor::from_vec(data, (x.rows(), x.cols()), device)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (FeatureMatrix, Vec<Label>) {
        let x = FeatureMatrix::from_rows(&[
            vec![0.0, 1.0],
            vec![1.0, 1.0],
            vec![2.0, 1.0],
            vec![8.0, 1.0],
            vec![9.0, 1.0],
            vec![10.0, 1.0],
        ])
        .unwrap();
        let y = vec![
            Label::NotComplex,
            Label::NotComplex,
            Label::NotComplex,
            Label::Complex,
            Label::Complex,
            Label::Complex,
        ];
        (x, y)
    }

    #[test]
    fn test_fits_separable_data() {
        let (x, y) = separable();
        let mut clf = LogisticRegression::new(ClassifierConfig::default());
        let summary = clf.fit(&x, &y).unwrap();
        assert_eq!(summary.rows, 6);
        assert_eq!(summary.n_features, 2);
        assert!(summary.epochs > 0);
        assert_eq!(clf.predict(&x).unwrap(), y);

        let probe = FeatureMatrix::from_rows(&[vec![0.5, 1.0], vec![9.5, 1.0]]).unwrap();
        let probs = clf.predict_proba(&probe).unwrap();
        assert!(probs[0] < 0.5);
        assert!(probs[1] > 0.5);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y) = separable();
        let mut a = LogisticRegression::new(ClassifierConfig::default());
        let mut b = LogisticRegression::new(ClassifierConfig::default());
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.params(), b.params());
    }

    #[test]
    fn test_predict_before_fit() {
        let (x, _) = separable();
        let clf = LogisticRegression::new(ClassifierConfig::default());
        assert!(matches!(clf.predict(&x), Err(CwiError::NotFitted)));
    }

    #[test]
    fn test_width_mismatch() {
        let (x, y) = separable();
        let mut clf = LogisticRegression::new(ClassifierConfig::default());
        clf.fit(&x, &y).unwrap();
        let narrow = FeatureMatrix::from_rows(&[vec![1.0]]).unwrap();
        assert!(matches!(
            clf.predict(&narrow),
            Err(CwiError::FeatureMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        let mut clf = LogisticRegression::new(ClassifierConfig::default());
        assert!(matches!(
            clf.fit(&FeatureMatrix::zeros(0, 3), &[]),
            Err(CwiError::EmptyTrainingSet)
        ));
        let (x, _) = separable();
        assert!(matches!(
            clf.fit(&x, &[Label::Complex]),
            Err(CwiError::LengthMismatch { .. })
        ));
        assert!(!clf.is_fitted());
    }

    #[test]
    fn test_empty_prediction_batch() {
        let (x, y) = separable();
        let mut clf = LogisticRegression::new(ClassifierConfig::default());
        clf.fit(&x, &y).unwrap();
        assert!(clf.predict(&FeatureMatrix::zeros(0, 2)).unwrap().is_empty());
    }

    #[test]
    fn test_restore_from_params() {
        let (x, y) = separable();
        let mut clf = LogisticRegression::new(ClassifierConfig::default());
        clf.fit(&x, &y).unwrap();
        let params = clf.params().unwrap().clone();

        let restored = LogisticRegression::from_params(ClassifierConfig::default(), params.clone())
            .unwrap();
        assert_eq!(restored.predict_proba(&x).unwrap(), clf.predict_proba(&x).unwrap());

        let mut broken = params;
        broken.bias.pop();
        assert!(LogisticRegression::from_params(ClassifierConfig::default(), broken).is_err());
    }
}
