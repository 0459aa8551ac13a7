//! Word-level lexical features of the target word or phrase.

use super::{insert, tokens, FeatureDict, FeatureExtractor};
use crate::registry::LanguageBinding;
use crate::selector::Selection;
use cwi_core::Language;

/// Lexical features of the target text.
///
/// | Feature | Meaning |
/// |---------|---------|
/// | `length` | Characters in the target |
/// | `num_tokens` | Whitespace tokens |
/// | `mean_token_length` | Average token length in characters |
/// | `vowels` | Vowel count, language-specific vowel set |
/// | `syllables` | Vowel-group count, at least one per token |
/// | `upper_ratio` | Share of uppercase letters |
/// | `has_digit`, `has_hyphen` | Binary flags |
/// | `language` | Categorical, only when bound from data |
#[derive(Debug, Clone)]
pub struct WordFeatureExtractor {
    binding: LanguageBinding,
}

impl WordFeatureExtractor {
    pub fn new(binding: LanguageBinding) -> Self {
        Self { binding }
    }
}

fn vowel_set(language: Language) -> &'static str {
    match language {
        Language::English => "aeiouy",
        Language::Spanish => "aeiouáéíóúü",
        Language::German => "aeiouyäöü",
        Language::French => "aeiouyàâæéèêëîïôœùûü",
    }
}

fn is_vowel(c: char, vowels: &str) -> bool {
    c.to_lowercase().any(|l| vowels.contains(l))
}

/// Vowel groups in `word`, counting at least one for any word with letters.
fn syllables(word: &str, vowels: &str) -> usize {
    let mut count = 0;
    let mut in_group = false;
    for c in word.chars() {
        let v = is_vowel(c, vowels);
        if v && !in_group {
            count += 1;
        }
        in_group = v;
    }
    if count == 0 && word.chars().any(char::is_alphabetic) {
        1
    } else {
        count
    }
}

impl FeatureExtractor for WordFeatureExtractor {
    fn extract(&self, selection: &Selection<'_>) -> Result<FeatureDict, String> {
        let target = selection.require_target_word()?;
        let language = match self.binding {
            LanguageBinding::Fixed(language) => language,
            LanguageBinding::FromData => selection.require_language()?,
        };
        let vowels = vowel_set(language);
        let words = tokens(target);

        let length = target.chars().count();
        let letters: Vec<char> = target.chars().filter(|c| c.is_alphabetic()).collect();
        let upper = letters.iter().filter(|c| c.is_uppercase()).count();

        let mut dict = FeatureDict::new();
        insert(&mut dict, "length", length);
        insert(&mut dict, "num_tokens", words.len());
        let mean_len = if words.is_empty() {
            0.0
        } else {
            words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64
        };
        insert(&mut dict, "mean_token_length", mean_len);
        insert(
            &mut dict,
            "vowels",
            target.chars().filter(|c| is_vowel(*c, vowels)).count(),
        );
        insert(
            &mut dict,
            "syllables",
            words.iter().map(|w| syllables(w, vowels)).sum::<usize>(),
        );
        let upper_ratio = if letters.is_empty() {
            0.0
        } else {
            upper as f64 / letters.len() as f64
        };
        insert(&mut dict, "upper_ratio", upper_ratio);
        insert(&mut dict, "has_digit", target.chars().any(|c| c.is_numeric()));
        insert(&mut dict, "has_hyphen", target.contains('-'));

        if self.binding == LanguageBinding::FromData {
            insert(&mut dict, "language", language.as_str());
        }
        Ok(dict)
    }
}
