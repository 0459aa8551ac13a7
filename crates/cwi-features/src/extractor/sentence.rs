//! Sentence-level context features.

use super::{insert, tokens, FeatureDict, FeatureExtractor};
use crate::registry::LanguageBinding;
use crate::selector::Selection;

/// Features of the sentence surrounding the target.
#[derive(Debug, Clone)]
pub struct SentenceFeatureExtractor {
    binding: LanguageBinding,
}

impl SentenceFeatureExtractor {
    pub fn new(binding: LanguageBinding) -> Self {
        Self { binding }
    }
}

impl FeatureExtractor for SentenceFeatureExtractor {
    fn extract(&self, selection: &Selection<'_>) -> Result<FeatureDict, String> {
        let sentence = selection.require_sentence()?;
        let words = tokens(sentence);
        let length = sentence.chars().count();

        let mut dict = FeatureDict::new();
        insert(&mut dict, "num_tokens", words.len());
        insert(&mut dict, "length", length);
        let mean_len = if words.is_empty() {
            0.0
        } else {
            words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64
        };
        insert(&mut dict, "mean_token_length", mean_len);
        insert(
            &mut dict,
            "punctuation",
            sentence.chars().filter(|c| c.is_ascii_punctuation()).count(),
        );
        let capitalised = words
            .iter()
            .filter(|w| w.chars().next().is_some_and(char::is_uppercase))
            .count();
        let cap_ratio = if words.is_empty() {
            0.0
        } else {
            capitalised as f64 / words.len() as f64
        };
        insert(&mut dict, "capitalised_ratio", cap_ratio);

        // Offsets travel with the target word, so only present when both
        // fields were selected.
        if let Some((start, _)) = selection.offsets {
            if length > 0 {
                insert(
                    &mut dict,
                    "target_position",
                    (start.min(length) as f64) / length as f64,
                );
            }
        }

        if self.binding == LanguageBinding::FromData {
            insert(&mut dict, "language", selection.require_language()?.as_str());
        }
        Ok(dict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::FeatureValue;
    use cwi_core::Language;

    #[test]
    fn test_sentence_features() {
        let sel = Selection {
            language: Some(Language::English),
            sentence: Some("The Cat sat, quietly."),
            ..Selection::default()
        };
        let dict = SentenceFeatureExtractor::new(LanguageBinding::Fixed(Language::English))
            .extract(&sel)
            .unwrap();
        assert_eq!(dict.get("num_tokens"), Some(&FeatureValue::Number(4.0)));
        assert_eq!(dict.get("punctuation"), Some(&FeatureValue::Number(2.0)));
        assert_eq!(
            dict.get("capitalised_ratio"),
            Some(&FeatureValue::Number(0.5))
        );
        assert!(!dict.contains_key("target_position"));
    }

    #[test]
    fn test_target_position_from_offsets() {
        let sel = Selection {
            sentence: Some("0123456789"),
            offsets: Some((5, 7)),
            ..Selection::default()
        };
        let dict = SentenceFeatureExtractor::new(LanguageBinding::Fixed(Language::French))
            .extract(&sel)
            .unwrap();
        assert_eq!(
            dict.get("target_position"),
            Some(&FeatureValue::Number(0.5))
        );
    }
}
