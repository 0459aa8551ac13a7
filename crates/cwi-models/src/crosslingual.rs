//! Crosslingual complex word classifier.

use crate::classifier::FitSummary;
use crate::model::{CwiClassifier, CwiModel, ModelState, ModelVariant};
use cwi_core::{CwiError, ExperimentConfig, Label, RecordCollection, Result};
use cwi_features::{FeatureRegistry, LanguageBinding};
use std::path::Path;

/// Classifier trained on some languages and applied to another.
///
/// Extractors read each record's own `language` field, so one model serves
/// any mix of languages.
pub struct CrosslingualCwi {
    model: CwiModel,
}

impl CrosslingualCwi {
    pub fn new(config: &ExperimentConfig) -> Result<Self> {
        Self::with_registry(config, &FeatureRegistry::standard())
    }

    pub fn with_registry(config: &ExperimentConfig, registry: &FeatureRegistry) -> Result<Self> {
        let model = CwiModel::from_config(
            ModelVariant::Crosslingual,
            LanguageBinding::FromData,
            config,
            registry,
        )?;
        Ok(Self { model })
    }

    pub fn model(&self) -> &CwiModel {
        &self.model
    }

    pub fn train(&mut self, records: &RecordCollection) -> Result<FitSummary> {
        let languages = records.languages();
        tracing::debug!(?languages, rows = records.len(), "crosslingual training set");
        self.model.train(records)
    }

    pub fn predict(&self, records: &RecordCollection) -> Result<Vec<Label>> {
        self.model.predict(records)
    }

    pub fn predict_proba(&self, records: &RecordCollection) -> Result<Vec<f32>> {
        self.model.predict_proba(records)
    }

    pub fn state(&self) -> ModelState {
        self.model.state()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.model.save(path)
    }

    pub fn load(path: &Path, registry: &FeatureRegistry) -> Result<Self> {
        let model = CwiModel::load(path, registry)?;
        if model.variant() != ModelVariant::Crosslingual || model.binding() != LanguageBinding::FromData
        {
            return Err(CwiError::Config(format!(
                "{} does not hold a crosslingual model",
                path.display()
            )));
        }
        Ok(Self { model })
    }
}

impl CwiClassifier for CrosslingualCwi {
    fn train(&mut self, records: &RecordCollection) -> Result<FitSummary> {
        CrosslingualCwi::train(self, records)
    }

    fn predict(&self, records: &RecordCollection) -> Result<Vec<Label>> {
        CrosslingualCwi::predict(self, records)
    }

    fn state(&self) -> ModelState {
        CrosslingualCwi::state(self)
    }
}
