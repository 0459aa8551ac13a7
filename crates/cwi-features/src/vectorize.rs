//! Vectorizers.
//!
//! Both vectorizers learn a vocabulary at fit time and map it to columns in
//! sorted name order. At transform time features outside the vocabulary are
//! dropped, so the column space never changes after fitting.

use crate::extractor::{FeatureDict, FeatureValue};
use crate::matrix::FeatureMatrix;
use cwi_core::{CwiError, Result};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// Runs of two or more word characters.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token regex"));

fn vocabulary_from(names: impl IntoIterator<Item = String>) -> BTreeMap<String, usize> {
    let sorted: BTreeSet<String> = names.into_iter().collect();
    sorted
        .into_iter()
        .enumerate()
        .map(|(col, name)| (name, col))
        .collect()
}

fn names_of(vocabulary: &BTreeMap<String, usize>) -> Vec<String> {
    // BTreeMap iterates in key order, which is also column order.
    vocabulary.keys().cloned().collect()
}

/// One-hot / pass-through vectorizer over feature dictionaries.
///
/// Numeric features map to a column named after the key. Categorical
/// features map to one column per observed `key=value`.
#[derive(Debug, Clone, Default)]
pub struct DictVectorizer {
    vocabulary: Option<BTreeMap<String, usize>>,
}

impl DictVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a vectorizer fitted elsewhere from its feature names.
    pub fn from_feature_names(names: Vec<String>) -> Self {
        Self {
            vocabulary: Some(vocabulary_from(names)),
        }
    }

    fn column_name(key: &str, value: &FeatureValue) -> String {
        match value {
            FeatureValue::Number(_) => key.to_string(),
            FeatureValue::Category(v) => format!("{key}={v}"),
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    pub fn fit(&mut self, dicts: &[FeatureDict]) {
        let names = dicts
            .iter()
            .flat_map(|d| d.iter().map(|(k, v)| Self::column_name(k, v)));
        self.vocabulary = Some(vocabulary_from(names));
    }

    pub fn transform(&self, dicts: &[FeatureDict]) -> Result<FeatureMatrix> {
        let vocabulary = self.vocabulary.as_ref().ok_or(CwiError::NotFitted)?;
        let mut matrix = FeatureMatrix::zeros(dicts.len(), vocabulary.len());
        for (row, dict) in dicts.iter().enumerate() {
            for (key, value) in dict {
                let Some(&col) = vocabulary.get(&Self::column_name(key, value)) else {
                    continue;
                };
                let x = match value {
                    FeatureValue::Number(v) if v.is_finite() => *v as f32,
                    FeatureValue::Number(_) => 0.0,
                    FeatureValue::Category(_) => 1.0,
                };
                matrix.set(row, col, x);
            }
        }
        Ok(matrix)
    }

    pub fn fit_transform(&mut self, dicts: &[FeatureDict]) -> Result<FeatureMatrix> {
        self.fit(dicts);
        self.transform(dicts)
    }

    /// Column names in column order; empty before fitting.
    pub fn feature_names(&self) -> Vec<String> {
        self.vocabulary.as_ref().map(names_of).unwrap_or_default()
    }
}

/// Token-count vectorizer over raw text.
#[derive(Debug, Clone, Default)]
pub struct CountVectorizer {
    vocabulary: Option<BTreeMap<String, usize>>,
}

impl CountVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_feature_names(names: Vec<String>) -> Self {
        Self {
            vocabulary: Some(vocabulary_from(names)),
        }
    }

    /// Lowercased tokens of `text`.
    pub fn tokenize(text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        TOKEN_RE
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    pub fn fit(&mut self, texts: &[&str]) {
        let names = texts.iter().flat_map(|t| Self::tokenize(t));
        self.vocabulary = Some(vocabulary_from(names));
    }

    pub fn transform(&self, texts: &[&str]) -> Result<FeatureMatrix> {
        let vocabulary = self.vocabulary.as_ref().ok_or(CwiError::NotFitted)?;
        let mut matrix = FeatureMatrix::zeros(texts.len(), vocabulary.len());
        for (row, text) in texts.iter().enumerate() {
            for token in Self::tokenize(text) {
                if let Some(&col) = vocabulary.get(&token) {
                    matrix.add(row, col, 1.0);
                }
            }
        }
        Ok(matrix)
    }

    pub fn fit_transform(&mut self, texts: &[&str]) -> Result<FeatureMatrix> {
        self.fit(texts);
        self.transform(texts)
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.vocabulary.as_ref().map(names_of).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(pairs: &[(&str, FeatureValue)]) -> FeatureDict {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_dict_vectorizer_sorted_columns() {
        let dicts = vec![
            dict(&[
                ("length", FeatureValue::Number(3.0)),
                ("pos", FeatureValue::Category("NOUN".into())),
            ]),
            dict(&[
                ("length", FeatureValue::Number(10.0)),
                ("pos", FeatureValue::Category("ADJ".into())),
            ]),
        ];
        let mut v = DictVectorizer::new();
        let m = v.fit_transform(&dicts).unwrap();
        assert_eq!(v.feature_names(), vec!["length", "pos=ADJ", "pos=NOUN"]);
        assert_eq!(m.row(0), &[3.0, 0.0, 1.0]);
        assert_eq!(m.row(1), &[10.0, 1.0, 0.0]);
    }

    #[test]
    fn test_dict_vectorizer_ignores_unseen_features() {
        let mut v = DictVectorizer::new();
        v.fit(&[dict(&[("pos", FeatureValue::Category("NOUN".into()))])]);
        let m = v
            .transform(&[dict(&[
                ("pos", FeatureValue::Category("VERB".into())),
                ("extra", FeatureValue::Number(1.0)),
            ])])
            .unwrap();
        assert_eq!(m.cols(), 1);
        assert_eq!(m.row(0), &[0.0]);
    }

    #[test]
    fn test_transform_before_fit() {
        assert!(matches!(
            DictVectorizer::new().transform(&[]),
            Err(CwiError::NotFitted)
        ));
        assert!(matches!(
            CountVectorizer::new().transform(&["x"]),
            Err(CwiError::NotFitted)
        ));
    }

    #[test]
    fn test_count_vectorizer() {
        let mut v = CountVectorizer::new();
        let m = v.fit_transform(&["Black cat", "cat cat a"]).unwrap();
        // Single-character tokens are dropped.
        assert_eq!(v.feature_names(), vec!["black", "cat"]);
        assert_eq!(m.row(0), &[1.0, 1.0]);
        assert_eq!(m.row(1), &[0.0, 2.0]);

        let unseen = v.transform(&["dog"]).unwrap();
        assert_eq!(unseen.row(0), &[0.0, 0.0]);
    }

    #[test]
    fn test_restore_from_feature_names() {
        let mut fitted = CountVectorizer::new();
        fitted.fit(&["zebra apple"]);
        let restored = CountVectorizer::from_feature_names(fitted.feature_names());
        assert_eq!(
            restored.transform(&["apple"]).unwrap(),
            fitted.transform(&["apple"]).unwrap()
        );
    }
}
