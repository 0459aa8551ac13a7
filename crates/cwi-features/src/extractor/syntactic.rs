//! Parse-derived syntactic features.

use super::{insert, FeatureDict, FeatureExtractor};
use crate::registry::LanguageBinding;
use crate::selector::Selection;
use cwi_core::ParseAnnotation;

/// Features of the target's syntactic head in the sentence parse.
///
/// The target is located by its character offsets when available, falling
/// back to a case-insensitive token match. A target that cannot be located
/// in the parse is an extraction error.
#[derive(Debug, Clone)]
pub struct SyntacticFeatureExtractor {
    binding: LanguageBinding,
}

impl SyntacticFeatureExtractor {
    pub fn new(binding: LanguageBinding) -> Self {
        Self { binding }
    }
}

/// The token of `span` whose head lies outside the span, else the first.
fn span_head(ann: &ParseAnnotation, span: &[usize]) -> usize {
    span.iter()
        .copied()
        .find(|&i| {
            let head = ann.tokens[i].head;
            head == i || !span.contains(&head)
        })
        .unwrap_or(span[0])
}

impl FeatureExtractor for SyntacticFeatureExtractor {
    fn extract(&self, selection: &Selection<'_>) -> Result<FeatureDict, String> {
        let target = selection.require_target_word()?;
        let ann = selection.require_spacy()?;

        let mut span = match selection.offsets {
            Some((start, end)) => ann.tokens_in_span(start, end),
            None => Vec::new(),
        };
        if span.is_empty() {
            span = ann.find_phrase(target);
        }
        if span.is_empty() {
            return Err(format!("target '{target}' not found in parse"));
        }

        let head = span_head(ann, &span);
        let token = &ann.tokens[head];
        let head_pos = if token.head == head {
            "ROOT"
        } else {
            ann.tokens
                .get(token.head)
                .map_or("ROOT", |t| t.pos.as_str())
        };
        let children = ann
            .tokens
            .iter()
            .enumerate()
            .filter(|(i, t)| *i != head && t.head == head)
            .count();

        let mut dict = FeatureDict::new();
        insert(&mut dict, "pos", token.pos.as_str());
        if !token.tag.is_empty() {
            insert(&mut dict, "tag", token.tag.as_str());
        }
        insert(&mut dict, "dep", token.dep.as_str());
        insert(&mut dict, "head_pos", head_pos);
        insert(&mut dict, "span_tokens", span.len());
        insert(&mut dict, "depth", ann.depth(head));
        insert(&mut dict, "children", children);

        if self.binding == LanguageBinding::FromData {
            insert(&mut dict, "language", selection.require_language()?.as_str());
        }
        Ok(dict)
    }
}
