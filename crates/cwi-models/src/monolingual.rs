//! Single-language complex word classifier.

use crate::classifier::FitSummary;
use crate::model::{CwiClassifier, CwiModel, ModelState, ModelVariant};
use cwi_core::{CwiError, ExperimentConfig, Label, Language, RecordCollection, Result};
use cwi_features::{FeatureRegistry, LanguageBinding};
use std::path::Path;

/// Classifier bound to one language.
///
/// Language-dependent extractors use the bound language for every record.
/// Records of another language are still processed, with a warning.
pub struct MonolingualCwi {
    language: Language,
    model: CwiModel,
}

impl MonolingualCwi {
    pub fn new(language: Language, config: &ExperimentConfig) -> Result<Self> {
        Self::with_registry(language, config, &FeatureRegistry::standard())
    }

    pub fn with_registry(
        language: Language,
        config: &ExperimentConfig,
        registry: &FeatureRegistry,
    ) -> Result<Self> {
        let model = CwiModel::from_config(
            ModelVariant::Monolingual,
            LanguageBinding::Fixed(language),
            config,
            registry,
        )?;
        Ok(Self { language, model })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn model(&self) -> &CwiModel {
        &self.model
    }

    fn warn_foreign(&self, records: &RecordCollection, stage: &str) {
        let foreign = records
            .iter()
            .filter(|r| r.language != self.language)
            .count();
        if foreign > 0 {
            tracing::warn!(
                language = %self.language,
                foreign,
                stage,
                "records in another language passed to a monolingual model"
            );
        }
    }

    pub fn train(&mut self, records: &RecordCollection) -> Result<FitSummary> {
        self.warn_foreign(records, "train");
        self.model.train(records)
    }

    pub fn predict(&self, records: &RecordCollection) -> Result<Vec<Label>> {
        self.warn_foreign(records, "predict");
        self.model.predict(records)
    }

    pub fn predict_proba(&self, records: &RecordCollection) -> Result<Vec<f32>> {
        self.warn_foreign(records, "predict");
        self.model.predict_proba(records)
    }

    pub fn state(&self) -> ModelState {
        self.model.state()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.model.save(path)
    }

    /// Restore a saved monolingual model.
    ///
    /// # Errors
    ///
    /// Returns [`CwiError::Config`] if the snapshot is not a monolingual
    /// model bound to a fixed language.
    pub fn load(path: &Path, registry: &FeatureRegistry) -> Result<Self> {
        let model = CwiModel::load(path, registry)?;
        match (model.variant(), model.binding()) {
            (ModelVariant::Monolingual, LanguageBinding::Fixed(language)) => {
                Ok(Self { language, model })
            }
            (variant, binding) => Err(CwiError::Config(format!(
                "{} holds a {variant:?} model bound {binding:?}, not a monolingual one",
                path.display()
            ))),
        }
    }
}

impl CwiClassifier for MonolingualCwi {
    fn train(&mut self, records: &RecordCollection) -> Result<FitSummary> {
        MonolingualCwi::train(self, records)
    }

    fn predict(&self, records: &RecordCollection) -> Result<Vec<Label>> {
        MonolingualCwi::predict(self, records)
    }

    fn state(&self) -> ModelState {
        MonolingualCwi::state(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cwi_core::{ParseAnnotation, ParsedToken, Record};

    fn token(text: &str, pos: &str, dep: &str, head: usize, offset: usize) -> ParsedToken {
        ParsedToken {
            text: text.to_string(),
            lemma: text.to_lowercase(),
            pos: pos.to_string(),
            tag: String::new(),
            dep: dep.to_string(),
            head,
            offset,
        }
    }

    /// "The {word} sat." parsed with the word as subject.
    fn record(word: &str, label: Label) -> Record {
        let sentence = format!("The {word} sat.");
        let sat = 5 + word.len();
        let ann = ParseAnnotation {
            tokens: vec![
                token("The", "DET", "det", 1, 0),
                token(word, "NOUN", "nsubj", 2, 4),
                token("sat", "VERB", "ROOT", 2, sat),
                token(".", "PUNCT", "punct", 2, sat + 3),
            ],
        };
        Record::new(Language::English, word, sentence)
            .with_offsets(4, 4 + word.len())
            .with_annotation(ann)
            .with_label(label)
    }

    fn training() -> RecordCollection {
        vec![
            record("cat", Label::NotComplex),
            record("dog", Label::NotComplex),
            record("man", Label::NotComplex),
            record("ubiquitous", Label::Complex),
            record("perspicacious", Label::Complex),
            record("obsequious", Label::Complex),
        ]
        .into()
    }

    #[test]
    fn test_full_feature_set_trains_and_predicts() {
        let mut cwi = MonolingualCwi::new(Language::English, &ExperimentConfig::default()).unwrap();
        assert_eq!(cwi.state(), ModelState::Constructed);
        cwi.train(&training()).unwrap();
        assert_eq!(cwi.state(), ModelState::Trained);

        let labels = cwi.predict(&training()).unwrap();
        assert_eq!(labels.len(), 6);
        assert_eq!(labels, training().gold_labels().unwrap());
    }

    #[test]
    fn test_predict_before_train() {
        let cwi = MonolingualCwi::new(Language::English, &ExperimentConfig::default()).unwrap();
        assert!(matches!(cwi.predict(&training()), Err(CwiError::NotFitted)));
    }

    #[test]
    fn test_unlabeled_training_data() {
        let mut cwi = MonolingualCwi::new(Language::English, &ExperimentConfig::default()).unwrap();
        let mut rows = training();
        rows.push(Record::new(Language::English, "tree", "The tree."));
        assert!(matches!(
            cwi.train(&rows),
            Err(CwiError::MissingLabels { row: 6 })
        ));
        assert_eq!(cwi.state(), ModelState::Constructed);
    }

    #[test]
    fn test_missing_annotation_aborts_training() {
        let mut cwi = MonolingualCwi::new(Language::English, &ExperimentConfig::default()).unwrap();
        let mut rows = training();
        rows.push(Record::new(Language::English, "tree", "The tree.").with_label(Label::NotComplex));
        match cwi.train(&rows) {
            Err(CwiError::FeatureExtraction { group, row, .. }) => {
                assert_eq!(group, "spacy_features");
                assert_eq!(row, 6);
            }
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("training should fail without an annotation"),
        }
    }

    #[test]
    fn test_foreign_records_are_not_rejected() {
        let mut cwi = MonolingualCwi::new(Language::English, &ExperimentConfig::default()).unwrap();
        cwi.train(&training()).unwrap();
        let mut german = record("Katze", Label::NotComplex);
        german.language = Language::German;
        let labels = cwi.predict(&vec![german].into()).unwrap();
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn test_save_and_load() {
        let mut cwi = MonolingualCwi::new(Language::English, &ExperimentConfig::default()).unwrap();
        cwi.train(&training()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("english.json");
        cwi.save(&path).unwrap();

        let restored = MonolingualCwi::load(&path, &FeatureRegistry::standard()).unwrap();
        assert_eq!(restored.language(), Language::English);
        assert_eq!(restored.state(), ModelState::Ready);
        assert_eq!(
            restored.predict(&training()).unwrap(),
            cwi.predict(&training()).unwrap()
        );
    }
}
