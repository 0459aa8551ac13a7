//! Feature groups and the feature union.

use crate::extractor::{FeatureDict, FeatureExtractor};
use crate::matrix::FeatureMatrix;
use crate::registry::{GroupFactory, LanguageBinding};
use crate::selector::{Field, Selector};
use crate::vectorize::{CountVectorizer, DictVectorizer};
use cwi_core::{CwiError, Record, RecordCollection, Result};

/// A selection → extraction → vectorization stage producing one block of
/// columns.
pub trait FeatureGroup {
    fn name(&self) -> &str;

    fn selector(&self) -> &Selector;

    /// Learn the vocabulary from `records` and return their block.
    fn fit_transform(&mut self, records: &[Record]) -> Result<FeatureMatrix>;

    /// Block for `records` using the learned vocabulary.
    fn transform(&self, records: &[Record]) -> Result<FeatureMatrix>;

    fn is_fitted(&self) -> bool;

    /// Column names of this block in column order.
    fn feature_names(&self) -> Vec<String>;

    /// Reinstate a vocabulary previously returned by `feature_names`.
    fn restore(&mut self, feature_names: Vec<String>);
}

fn extraction_error(group: &str, row: usize, reason: String) -> CwiError {
    CwiError::FeatureExtraction {
        group: group.to_string(),
        row,
        reason,
    }
}

/// Group that extracts a feature dictionary per record and one-hot encodes it.
pub struct DictGroup {
    name: String,
    selector: Selector,
    extractor: Box<dyn FeatureExtractor>,
    vectorizer: DictVectorizer,
}

impl DictGroup {
    pub fn new(
        name: impl Into<String>,
        selector: Selector,
        extractor: impl FeatureExtractor + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            selector,
            extractor: Box::new(extractor),
            vectorizer: DictVectorizer::new(),
        }
    }

    fn extract_all(&self, records: &[Record]) -> Result<Vec<FeatureDict>> {
        records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                let selection = self
                    .selector
                    .select(record)
                    .map_err(|reason| extraction_error(&self.name, row, reason))?;
                self.extractor
                    .extract(&selection)
                    .map_err(|reason| extraction_error(&self.name, row, reason))
            })
            .collect()
    }
}

impl FeatureGroup for DictGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn selector(&self) -> &Selector {
        &self.selector
    }

    fn fit_transform(&mut self, records: &[Record]) -> Result<FeatureMatrix> {
        let dicts = self.extract_all(records)?;
        self.vectorizer.fit_transform(&dicts)
    }

    fn transform(&self, records: &[Record]) -> Result<FeatureMatrix> {
        if !self.vectorizer.is_fitted() {
            return Err(CwiError::NotFitted);
        }
        let dicts = self.extract_all(records)?;
        self.vectorizer.transform(&dicts)
    }

    fn is_fitted(&self) -> bool {
        self.vectorizer.is_fitted()
    }

    fn feature_names(&self) -> Vec<String> {
        self.vectorizer.feature_names()
    }

    fn restore(&mut self, feature_names: Vec<String>) {
        self.vectorizer = DictVectorizer::from_feature_names(feature_names);
    }
}

/// Bag-of-words group: token counts over one text field.
pub struct CountGroup {
    name: String,
    selector: Selector,
    field: Field,
    vectorizer: CountVectorizer,
}

impl CountGroup {
    /// `field` must be [`Field::TargetWord`] or [`Field::Sentence`] and must
    /// be part of `selector`.
    pub fn new(name: impl Into<String>, selector: Selector, field: Field) -> Self {
        Self {
            name: name.into(),
            selector,
            field,
            vectorizer: CountVectorizer::new(),
        }
    }

    fn texts<'a>(&self, records: &'a [Record]) -> Result<Vec<&'a str>> {
        records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                let selection = self
                    .selector
                    .select(record)
                    .map_err(|reason| extraction_error(&self.name, row, reason))?;
                let text = match self.field {
                    Field::TargetWord => selection.require_target_word(),
                    Field::Sentence => selection.require_sentence(),
                    other => Err(format!("field '{}' is not text", other.name())),
                };
                text.map_err(|reason| extraction_error(&self.name, row, reason))
            })
            .collect()
    }
}

impl FeatureGroup for CountGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn selector(&self) -> &Selector {
        &self.selector
    }

    fn fit_transform(&mut self, records: &[Record]) -> Result<FeatureMatrix> {
        let texts = self.texts(records)?;
        self.vectorizer.fit_transform(&texts)
    }

    fn transform(&self, records: &[Record]) -> Result<FeatureMatrix> {
        if !self.vectorizer.is_fitted() {
            return Err(CwiError::NotFitted);
        }
        let texts = self.texts(records)?;
        self.vectorizer.transform(&texts)
    }

    fn is_fitted(&self) -> bool {
        self.vectorizer.is_fitted()
    }

    fn feature_names(&self) -> Vec<String> {
        self.vectorizer.feature_names()
    }

    fn restore(&mut self, feature_names: Vec<String>) {
        self.vectorizer = CountVectorizer::from_feature_names(feature_names);
    }
}

/// Named feature groups merged column-wise.
///
/// Columns are laid out group by group in declared order, each group's
/// columns in sorted name order.
pub struct FeaturePipeline {
    binding: LanguageBinding,
    factories: Vec<(String, GroupFactory)>,
    groups: Vec<Box<dyn FeatureGroup>>,
    fitted: bool,
}

impl std::fmt::Debug for FeaturePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeaturePipeline")
            .field("binding", &self.binding)
            .field("groups", &self.group_names())
            .field("fitted", &self.fitted)
            .finish()
    }
}

impl FeaturePipeline {
    /// Instantiate every group from its factory. Use
    /// [`FeatureRegistry::build`](crate::registry::FeatureRegistry::build)
    /// to resolve factories by name.
    pub fn new(binding: LanguageBinding, factories: Vec<(String, GroupFactory)>) -> Self {
        let groups = factories
            .iter()
            .map(|(name, factory)| factory(name.as_str(), binding))
            .collect();
        Self {
            binding,
            factories,
            groups,
            fitted: false,
        }
    }

    /// An unfitted pipeline with the same groups and binding.
    pub fn fresh(&self) -> Self {
        Self::new(self.binding, self.factories.clone())
    }

    pub fn binding(&self) -> LanguageBinding {
        self.binding
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name()).collect()
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Fit every group on `records` and return the union matrix.
    ///
    /// The first failing group aborts the whole fit; no partial matrix is
    /// returned and the pipeline stays unfitted.
    pub fn fit_transform(&mut self, records: &RecordCollection) -> Result<FeatureMatrix> {
        self.fitted = false;
        let mut blocks = Vec::with_capacity(self.groups.len());
        for group in &mut self.groups {
            let block = group.fit_transform(records.records())?;
            tracing::debug!(group = group.name(), columns = block.cols(), "fitted feature group");
            blocks.push(block);
        }
        let matrix = FeatureMatrix::hstack(records.len(), &blocks)?;
        self.fitted = true;
        Ok(matrix)
    }

    /// Union matrix of `records` in the fitted column space.
    pub fn transform(&self, records: &RecordCollection) -> Result<FeatureMatrix> {
        if !self.fitted {
            return Err(CwiError::NotFitted);
        }
        let blocks = self
            .groups
            .iter()
            .map(|g| g.transform(records.records()))
            .collect::<Result<Vec<_>>>()?;
        FeatureMatrix::hstack(records.len(), &blocks)
    }

    pub fn n_features(&self) -> usize {
        self.groups.iter().map(|g| g.feature_names().len()).sum()
    }

    /// Column names prefixed with their group: `"{group}__{feature}"`.
    pub fn feature_names(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|g| {
                g.feature_names()
                    .into_iter()
                    .map(move |n| format!("{}__{}", g.name(), n))
            })
            .collect()
    }

    /// Learned vocabulary of each group, in group order.
    pub fn vocabularies(&self) -> Vec<(String, Vec<String>)> {
        self.groups
            .iter()
            .map(|g| (g.name().to_string(), g.feature_names()))
            .collect()
    }

    /// Reinstate vocabularies captured by [`FeaturePipeline::vocabularies`].
    ///
    /// # Errors
    ///
    /// Returns [`CwiError::Config`] if the group names do not match this
    /// pipeline's groups in order.
    pub fn restore(&mut self, vocabularies: Vec<(String, Vec<String>)>) -> Result<()> {
        let expected: Vec<String> = self.group_names().iter().map(|n| n.to_string()).collect();
        let actual: Vec<String> = vocabularies.iter().map(|(n, _)| n.clone()).collect();
        if expected != actual {
            return Err(CwiError::Config(format!(
                "feature groups {actual:?} do not match pipeline groups {expected:?}"
            )));
        }
        for (group, (_, names)) in self.groups.iter_mut().zip(vocabularies) {
            group.restore(names);
        }
        self.fitted = true;
        Ok(())
    }
}
