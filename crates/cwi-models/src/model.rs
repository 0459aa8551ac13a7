//! Feature pipeline + classifier with a train/predict contract.
//!
//! A [`CwiModel`] owns exactly one [`FeaturePipeline`] and one
//! [`LogisticRegression`] bound to that pipeline's column space. Training is
//! all-or-nothing: a failed `train` leaves the previous state untouched.

use crate::classifier::{FitSummary, LogisticParams, LogisticRegression};
use cwi_core::{ClassifierConfig, CwiError, ExperimentConfig, Label, RecordCollection, Result};
use cwi_features::{FeatureMatrix, FeaturePipeline, FeatureRegistry, LanguageBinding};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lifecycle of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// Built but never trained.
    Constructed,
    /// Trained in this process.
    Trained,
    /// Restored from a snapshot.
    Ready,
}

impl ModelState {
    pub fn can_predict(self) -> bool {
        matches!(self, Self::Trained | Self::Ready)
    }
}

/// Which feature group list a model was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelVariant {
    Monolingual,
    Crosslingual,
}

impl ModelVariant {
    pub fn groups(self, config: &ExperimentConfig) -> &[String] {
        match self {
            Self::Monolingual => &config.features.monolingual_groups,
            Self::Crosslingual => &config.features.crosslingual_groups,
        }
    }
}

/// The train/predict contract shared by both classifier wrappers.
pub trait CwiClassifier {
    /// Fit pipeline and classifier on labeled records.
    fn train(&mut self, records: &RecordCollection) -> Result<FitSummary>;

    /// One label per record, in input order.
    fn predict(&self, records: &RecordCollection) -> Result<Vec<Label>>;

    fn state(&self) -> ModelState;
}

/// Learned vocabulary of one feature group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupVocabulary {
    pub group: String,
    pub features: Vec<String>,
}

/// Everything needed to rebuild a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub variant: ModelVariant,
    pub binding: LanguageBinding,
    pub refit_on_predict: bool,
    pub classifier: ClassifierConfig,
    pub groups: Vec<GroupVocabulary>,
    pub params: LogisticParams,
}

impl ModelSnapshot {
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

pub struct CwiModel {
    variant: ModelVariant,
    pipeline: FeaturePipeline,
    classifier: LogisticRegression,
    refit_on_predict: bool,
    state: ModelState,
}

impl CwiModel {
    pub fn new(
        variant: ModelVariant,
        pipeline: FeaturePipeline,
        classifier: ClassifierConfig,
        refit_on_predict: bool,
    ) -> Self {
        Self {
            variant,
            pipeline,
            classifier: LogisticRegression::new(classifier),
            refit_on_predict,
            state: ModelState::Constructed,
        }
    }

    /// Build the pipeline for `variant` from the configured group list.
    pub fn from_config(
        variant: ModelVariant,
        binding: LanguageBinding,
        config: &ExperimentConfig,
        registry: &FeatureRegistry,
    ) -> Result<Self> {
        let pipeline = registry.build(binding, variant.groups(config))?;
        Ok(Self::new(
            variant,
            pipeline,
            config.classifier.clone(),
            config.refit_on_predict,
        ))
    }

    pub fn variant(&self) -> ModelVariant {
        self.variant
    }

    pub fn binding(&self) -> LanguageBinding {
        self.pipeline.binding()
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.classifier
    }

    pub fn refit_on_predict(&self) -> bool {
        self.refit_on_predict
    }

    /// Fit a fresh pipeline and classifier on `records`.
    ///
    /// # Errors
    ///
    /// [`CwiError::EmptyTrainingSet`] for an empty collection,
    /// [`CwiError::MissingLabels`] if any record lacks a gold label, and any
    /// feature extraction or model error. On error the model is unchanged.
    pub fn train(&mut self, records: &RecordCollection) -> Result<FitSummary> {
        if records.is_empty() {
            return Err(CwiError::EmptyTrainingSet);
        }
        let labels = records.gold_labels()?;

        let mut pipeline = self.pipeline.fresh();
        let x = pipeline.fit_transform(records)?;
        let mut classifier = LogisticRegression::new(self.classifier.config().clone());
        let summary = classifier.fit(&x, &labels)?;

        self.pipeline = pipeline;
        self.classifier = classifier;
        self.state = ModelState::Trained;
        tracing::info!(
            variant = ?self.variant,
            rows = summary.rows,
            features = summary.n_features,
            epochs = summary.epochs,
            loss = summary.final_loss,
            "trained model"
        );
        Ok(summary)
    }

    fn features(&self, records: &RecordCollection) -> Result<FeatureMatrix> {
        if self.refit_on_predict {
            let mut pipeline = self.pipeline.fresh();
            pipeline.fit_transform(records)
        } else {
            self.pipeline.transform(records)
        }
    }

    pub fn predict(&self, records: &RecordCollection) -> Result<Vec<Label>> {
        if !self.state.can_predict() {
            return Err(CwiError::NotFitted);
        }
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let x = self.features(records)?;
        self.classifier.predict(&x)
    }

    /// Probability of [`Label::Complex`] per record.
    pub fn predict_proba(&self, records: &RecordCollection) -> Result<Vec<f32>> {
        if !self.state.can_predict() {
            return Err(CwiError::NotFitted);
        }
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let x = self.features(records)?;
        self.classifier.predict_proba(&x)
    }

    pub fn snapshot(&self) -> Result<ModelSnapshot> {
        let params = match (self.state.can_predict(), self.classifier.params()) {
            (true, Some(params)) => params.clone(),
            _ => return Err(CwiError::NotFitted),
        };
        let groups = self
            .pipeline
            .vocabularies()
            .into_iter()
            .map(|(group, features)| GroupVocabulary { group, features })
            .collect();
        Ok(ModelSnapshot {
            variant: self.variant,
            binding: self.pipeline.binding(),
            refit_on_predict: self.refit_on_predict,
            classifier: self.classifier.config().clone(),
            groups,
            params,
        })
    }

    /// Rebuild a model in the [`ModelState::Ready`] state.
    pub fn from_snapshot(snapshot: ModelSnapshot, registry: &FeatureRegistry) -> Result<Self> {
        let names: Vec<String> = snapshot.groups.iter().map(|g| g.group.clone()).collect();
        let mut pipeline = registry.build(snapshot.binding, &names)?;
        pipeline.restore(
            snapshot
                .groups
                .into_iter()
                .map(|g| (g.group, g.features))
                .collect(),
        )?;
        if pipeline.n_features() != snapshot.params.n_features() {
            return Err(CwiError::FeatureMismatch {
                expected: snapshot.params.n_features(),
                actual: pipeline.n_features(),
            });
        }
        let classifier = LogisticRegression::from_params(snapshot.classifier, snapshot.params)?;
        Ok(Self {
            variant: snapshot.variant,
            pipeline,
            classifier,
            refit_on_predict: snapshot.refit_on_predict,
            state: ModelState::Ready,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.snapshot()?.save(path)?;
        tracing::info!(path = %path.display(), "saved model snapshot");
        Ok(())
    }

    pub fn load(path: &Path, registry: &FeatureRegistry) -> Result<Self> {
        Self::from_snapshot(ModelSnapshot::load(path)?, registry)
    }
}

impl CwiClassifier for CwiModel {
    fn train(&mut self, records: &RecordCollection) -> Result<FitSummary> {
        CwiModel::train(self, records)
    }

    fn predict(&self, records: &RecordCollection) -> Result<Vec<Label>> {
        CwiModel::predict(self, records)
    }

    fn state(&self) -> ModelState {
        self.state
    }
}
