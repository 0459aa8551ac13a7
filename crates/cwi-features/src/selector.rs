//! Field selection.
//!
//! A [`Selector`] names the record fields a feature group depends on and
//! checks that each is present and well formed before extraction runs.

use cwi_core::{Language, ParseAnnotation, Record};

/// A record field a feature group can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Language,
    TargetWord,
    Sentence,
    Spacy,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Self::Language => "language",
            Self::TargetWord => "target_word",
            Self::Sentence => "sentence",
            Self::Spacy => "spacy",
        }
    }
}

/// Fields picked from one record. Unselected fields are `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selection<'a> {
    pub language: Option<Language>,
    pub target_word: Option<&'a str>,
    pub sentence: Option<&'a str>,
    pub spacy: Option<&'a ParseAnnotation>,
    /// Target offsets, carried along with the target word when known.
    pub offsets: Option<(usize, usize)>,
}

impl<'a> Selection<'a> {
    pub fn require_language(&self) -> Result<Language, String> {
        self.language.ok_or_else(|| not_selected(Field::Language))
    }

    pub fn require_target_word(&self) -> Result<&'a str, String> {
        self.target_word.ok_or_else(|| not_selected(Field::TargetWord))
    }

    pub fn require_sentence(&self) -> Result<&'a str, String> {
        self.sentence.ok_or_else(|| not_selected(Field::Sentence))
    }

    pub fn require_spacy(&self) -> Result<&'a ParseAnnotation, String> {
        self.spacy.ok_or_else(|| not_selected(Field::Spacy))
    }
}

fn not_selected(field: Field) -> String {
    format!("field '{}' was not selected", field.name())
}

/// Ordered list of required fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    fields: Vec<Field>,
}

impl Selector {
    pub fn new(fields: &[Field]) -> Self {
        Self {
            fields: fields.to_vec(),
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Pick the selected fields from `record`.
    ///
    /// Text fields must be non-blank; `spacy` must be present.
    pub fn select<'a>(&self, record: &'a Record) -> Result<Selection<'a>, String> {
        let mut selection = Selection::default();
        for field in &self.fields {
            match field {
                Field::Language => selection.language = Some(record.language),
                Field::TargetWord => {
                    if record.target_word.trim().is_empty() {
                        return Err("field 'target_word' is empty".to_string());
                    }
                    selection.target_word = Some(record.target_word.as_str());
                    selection.offsets = record.start_offset.zip(record.end_offset);
                }
                Field::Sentence => {
                    if record.sentence.trim().is_empty() {
                        return Err("field 'sentence' is empty".to_string());
                    }
                    selection.sentence = Some(record.sentence.as_str());
                }
                Field::Spacy => {
                    let ann = record
                        .spacy
                        .as_ref()
                        .ok_or_else(|| "field 'spacy' is missing".to_string())?;
                    if ann.tokens.is_empty() {
                        return Err("field 'spacy' has no tokens".to_string());
                    }
                    selection.spacy = Some(ann);
                }
            }
        }
        Ok(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_only_requested_fields() {
        let record = Record::new(Language::English, "cat", "The cat sat.").with_offsets(4, 7);
        let sel = Selector::new(&[Field::Language, Field::TargetWord])
            .select(&record)
            .unwrap();
        assert_eq!(sel.language, Some(Language::English));
        assert_eq!(sel.target_word, Some("cat"));
        assert_eq!(sel.offsets, Some((4, 7)));
        assert!(sel.sentence.is_none());
        assert!(sel.require_sentence().is_err());
    }

    #[test]
    fn test_missing_spacy_is_rejected() {
        let record = Record::new(Language::English, "cat", "The cat sat.");
        let err = Selector::new(&[Field::TargetWord, Field::Spacy])
            .select(&record)
            .unwrap_err();
        assert!(err.contains("spacy"));
    }

    #[test]
    fn test_blank_target_is_rejected() {
        let record = Record::new(Language::German, "  ", "Ein Satz.");
        assert!(Selector::new(&[Field::TargetWord]).select(&record).is_err());
    }
}
