//! Feature extractors.
//!
//! An extractor turns a [`Selection`] into a named feature dictionary.
//! Numeric values become one column each; categorical values are one-hot
//! encoded by the [`DictVectorizer`](crate::vectorize::DictVectorizer).

mod sentence;
mod syntactic;
mod word;

pub use sentence::SentenceFeatureExtractor;
pub use syntactic::SyntacticFeatureExtractor;
pub use word::WordFeatureExtractor;

use crate::selector::Selection;
use std::collections::BTreeMap;

/// One extracted feature value.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<usize> for FeatureValue {
    fn from(v: usize) -> Self {
        Self::Number(v as f64)
    }
}

impl From<bool> for FeatureValue {
    fn from(v: bool) -> Self {
        Self::Number(if v { 1.0 } else { 0.0 })
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        Self::Category(v.to_string())
    }
}

/// Features of one record, keyed by name. Ordered so column layout is stable.
pub type FeatureDict = BTreeMap<String, FeatureValue>;

/// Per-record feature computation.
pub trait FeatureExtractor {
    /// Compute the features of one selected record.
    ///
    /// The error string describes what was missing or malformed; the owning
    /// group wraps it with its name and the row index.
    fn extract(&self, selection: &Selection<'_>) -> Result<FeatureDict, String>;
}

/// Split on whitespace and strip surrounding punctuation; drops empty tokens.
pub(crate) fn tokens(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| !t.is_empty())
        .collect()
}

pub(crate) fn insert(dict: &mut FeatureDict, name: &str, value: impl Into<FeatureValue>) {
    dict.insert(name.to_string(), value.into());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_strip_punctuation() {
        assert_eq!(tokens("The cat, sat. !"), vec!["The", "cat", "sat"]);
        assert!(tokens("  ").is_empty());
    }
}
