//! Name-keyed lookup table of feature-group factories.

use crate::extractor::{SentenceFeatureExtractor, SyntacticFeatureExtractor, WordFeatureExtractor};
use crate::pipeline::{CountGroup, DictGroup, FeatureGroup, FeaturePipeline};
use crate::selector::{Field, Selector};
use cwi_core::{CwiError, Language, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Where language-dependent extractors get the language from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageBinding {
    /// One language for the whole model.
    Fixed(Language),
    /// The `language` field of each record. The language also becomes a
    /// categorical feature.
    FromData,
}

/// Builds a fresh, unfitted group named by its first argument.
pub type GroupFactory = fn(&str, LanguageBinding) -> Box<dyn FeatureGroup>;

pub const WORD_FEATURES: &str = "word_features";
pub const SENT_FEATURES: &str = "sent_features";
pub const BAG_OF_WORDS: &str = "bag_of_words";
pub const SPACY_FEATURES: &str = "spacy_features";

fn word_features(name: &str, binding: LanguageBinding) -> Box<dyn FeatureGroup> {
    Box::new(DictGroup::new(
        name,
        Selector::new(&[Field::Language, Field::TargetWord]),
        WordFeatureExtractor::new(binding),
    ))
}

fn sent_features(name: &str, binding: LanguageBinding) -> Box<dyn FeatureGroup> {
    Box::new(DictGroup::new(
        name,
        Selector::new(&[Field::Language, Field::TargetWord, Field::Sentence]),
        SentenceFeatureExtractor::new(binding),
    ))
}

fn bag_of_words(name: &str, _binding: LanguageBinding) -> Box<dyn FeatureGroup> {
    Box::new(CountGroup::new(
        name,
        Selector::new(&[Field::Language, Field::TargetWord]),
        Field::TargetWord,
    ))
}

fn spacy_features(name: &str, binding: LanguageBinding) -> Box<dyn FeatureGroup> {
    Box::new(DictGroup::new(
        name,
        Selector::new(&[Field::Language, Field::TargetWord, Field::Spacy, Field::Sentence]),
        SyntacticFeatureExtractor::new(binding),
    ))
}

/// Maps group names to factories.
#[derive(Clone)]
pub struct FeatureRegistry {
    factories: BTreeMap<String, GroupFactory>,
}

impl std::fmt::Debug for FeatureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl FeatureRegistry {
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// The built-in groups: `word_features`, `sent_features`,
    /// `bag_of_words` and `spacy_features`.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(WORD_FEATURES, word_features);
        registry.register(SENT_FEATURES, sent_features);
        registry.register(BAG_OF_WORDS, bag_of_words);
        registry.register(SPACY_FEATURES, spacy_features);
        registry
    }

    /// Add or replace a group factory.
    pub fn register(&mut self, name: impl Into<String>, factory: GroupFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Build an unfitted pipeline from group names, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`CwiError::Config`] if `groups` is empty, names an unknown
    /// group, or repeats a group.
    pub fn build(&self, binding: LanguageBinding, groups: &[String]) -> Result<FeaturePipeline> {
        if groups.is_empty() {
            return Err(CwiError::Config(
                "feature pipeline needs at least one group".to_string(),
            ));
        }
        let mut seen = BTreeSet::new();
        let mut factories = Vec::with_capacity(groups.len());
        for name in groups {
            if !seen.insert(name.as_str()) {
                return Err(CwiError::Config(format!("feature group '{name}' listed twice")));
            }
            let factory = self.factories.get(name).ok_or_else(|| {
                CwiError::Config(format!(
                    "unknown feature group '{name}' (known: {})",
                    self.names().collect::<Vec<_>>().join(", ")
                ))
            })?;
            factories.push((name.clone(), *factory));
        }
        Ok(FeaturePipeline::new(binding, factories))
    }
}
