//! Core types, configuration, and errors for the CWI pipeline
//!
//! This crate contains the data model shared by every stage of the Complex
//! Word Identification pipeline: languages and labels, annotated records,
//! record collections with column access, train/dev/test splits, the
//! crosslingual split table, and the catalog of known dataset sources.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Languages and labels
// ---------------------------------------------------------------------------

/// Language of a record or dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Spanish,
    German,
    French,
}

impl Language {
    /// Every supported language, in catalog order.
    pub const ALL: [Language; 4] = [
        Language::English,
        Language::Spanish,
        Language::German,
        Language::French,
    ];

    /// Lowercase name used in file layouts and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Spanish => "spanish",
            Self::German => "german",
            Self::French => "french",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = CwiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" => Ok(Self::English),
            "spanish" => Ok(Self::Spanish),
            "german" => Ok(Self::German),
            "french" => Ok(Self::French),
            other => Err(CwiError::Parse(format!("unknown language '{other}'"))),
        }
    }
}

/// Binary gold label of a target word or phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    NotComplex,
    Complex,
}

impl Label {
    /// Class index used by the classifier (0 = not complex, 1 = complex).
    pub fn as_index(self) -> usize {
        match self {
            Self::NotComplex => 0,
            Self::Complex => 1,
        }
    }

    /// Inverse of [`Label::as_index`]. Any non-zero index is complex.
    pub fn from_index(index: usize) -> Self {
        if index == 0 {
            Self::NotComplex
        } else {
            Self::Complex
        }
    }

    #[must_use]
    pub fn is_complex(self) -> bool {
        self == Self::Complex
    }

    /// Parse the `0`/`1` encoding used by the raw shared-task files.
    pub fn parse_binary(s: &str) -> Result<Self> {
        match s.trim() {
            "0" => Ok(Self::NotComplex),
            "1" => Ok(Self::Complex),
            other => Err(CwiError::Parse(format!("invalid binary label '{other}'"))),
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotComplex => write!(f, "not_complex"),
            Self::Complex => write!(f, "complex"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse annotations
// ---------------------------------------------------------------------------

/// One token of a dependency parse (spaCy-style).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedToken {
    /// Surface form.
    pub text: String,
    #[serde(default)]
    pub lemma: String,
    /// Coarse part-of-speech tag.
    pub pos: String,
    /// Fine-grained tag.
    #[serde(default)]
    pub tag: String,
    /// Dependency relation to the head.
    pub dep: String,
    /// Index of the head token. The root points at itself.
    pub head: usize,
    /// Character offset of the token in the sentence.
    #[serde(default)]
    pub offset: usize,
}

/// Pre-computed parse of a record's sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseAnnotation {
    pub tokens: Vec<ParsedToken>,
}

impl ParseAnnotation {
    /// Indices of tokens whose start offset falls inside `[start, end)`.
    pub fn tokens_in_span(&self, start: usize, end: usize) -> Vec<usize> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.offset >= start && t.offset < end)
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of the first token run whose texts match `phrase`
    /// word by word, ignoring case.
    pub fn find_phrase(&self, phrase: &str) -> Vec<usize> {
        let words: Vec<String> = phrase.split_whitespace().map(str::to_lowercase).collect();
        if words.is_empty() || words.len() > self.tokens.len() {
            return Vec::new();
        }
        (0..=self.tokens.len() - words.len())
            .find(|&start| {
                words
                    .iter()
                    .enumerate()
                    .all(|(k, w)| self.tokens[start + k].text.to_lowercase() == *w)
            })
            .map(|start| (start..start + words.len()).collect())
            .unwrap_or_default()
    }

    /// Number of head hops from token `index` to the root.
    ///
    /// Malformed heads (out of range, cycles) stop the walk.
    pub fn depth(&self, index: usize) -> usize {
        let mut depth = 0;
        let mut current = index;
        while let Some(token) = self.tokens.get(current) {
            if token.head == current || token.head >= self.tokens.len() {
                break;
            }
            current = token.head;
            depth += 1;
            if depth > self.tokens.len() {
                break;
            }
        }
        depth
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One classification instance: a target word or phrase in its sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier from the source corpus, when it has one.
    #[serde(default)]
    pub id: Option<String>,
    pub language: Language,
    pub target_word: String,
    pub sentence: String,
    /// Character offset where the target starts in the sentence.
    #[serde(default)]
    pub start_offset: Option<usize>,
    /// Character offset where the target ends in the sentence.
    #[serde(default)]
    pub end_offset: Option<usize>,
    /// Dependency parse of the sentence.
    #[serde(default)]
    pub spacy: Option<ParseAnnotation>,
    /// Gold label, present only where supervision exists.
    #[serde(default)]
    pub gold_label: Option<Label>,
}

impl Record {
    /// Create an unlabeled record without offsets or annotation.
    pub fn new(
        language: Language,
        target_word: impl Into<String>,
        sentence: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            language,
            target_word: target_word.into(),
            sentence: sentence.into(),
            start_offset: None,
            end_offset: None,
            spacy: None,
            gold_label: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.gold_label = Some(label);
        self
    }

    pub fn with_offsets(mut self, start: usize, end: usize) -> Self {
        self.start_offset = Some(start);
        self.end_offset = Some(end);
        self
    }

    pub fn with_annotation(mut self, annotation: ParseAnnotation) -> Self {
        self.spacy = Some(annotation);
        self
    }
}

/// Ordered sequence of records with column-wise access.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordCollection {
    records: Vec<Record>,
}

impl RecordCollection {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Append all records of `other`, preserving order.
    pub fn extend_from(&mut self, other: &RecordCollection) {
        self.records.extend(other.records.iter().cloned());
    }

    /// The `gold_label` column.
    ///
    /// # Errors
    ///
    /// Returns [`CwiError::MissingLabels`] naming the first unlabeled row.
    pub fn gold_labels(&self) -> Result<Vec<Label>> {
        self.records
            .iter()
            .enumerate()
            .map(|(row, r)| r.gold_label.ok_or(CwiError::MissingLabels { row }))
            .collect()
    }

    /// The `target_word` column.
    pub fn target_words(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.target_word.as_str()).collect()
    }

    /// The `sentence` column.
    pub fn sentences(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.sentence.as_str()).collect()
    }

    /// The `language` column.
    pub fn languages(&self) -> Vec<Language> {
        self.records.iter().map(|r| r.language).collect()
    }
}

impl From<Vec<Record>> for RecordCollection {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<Record> for RecordCollection {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordCollection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ---------------------------------------------------------------------------
// Splits
// ---------------------------------------------------------------------------

/// Train/dev/test partition for one language and source.
///
/// `dev` may be empty; some sources ship no development data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Split {
    #[serde(default)]
    pub train: RecordCollection,
    #[serde(default)]
    pub dev: RecordCollection,
    #[serde(default)]
    pub test: RecordCollection,
}

impl Split {
    /// A split can be used for an experiment when it has both training and
    /// test data.
    pub fn is_usable(&self) -> bool {
        !self.train.is_empty() && !self.test.is_empty()
    }
}

/// Persisted crosslingual splits, keyed by held-out language, then source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SplitTable {
    splits: BTreeMap<Language, BTreeMap<String, Split>>,
}

impl SplitTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, language: Language, source: impl Into<String>, split: Split) {
        self.splits
            .entry(language)
            .or_default()
            .insert(source.into(), split);
    }

    pub fn get(&self, language: Language, source: &str) -> Option<&Split> {
        self.splits.get(&language).and_then(|s| s.get(source))
    }

    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.splits.keys().copied()
    }

    pub fn sources(&self, language: Language) -> Vec<&str> {
        self.splits
            .get(&language)
            .map(|s| s.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Total number of (language, source) entries.
    pub fn len(&self) -> usize {
        self.splits.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read a table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the table as JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Source catalog
// ---------------------------------------------------------------------------

/// Ordered list of known dataset sources per language.
///
/// The first source of a language is its default source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceCatalog {
    sources: BTreeMap<Language, Vec<String>>,
}

impl SourceCatalog {
    pub fn new(sources: BTreeMap<Language, Vec<String>>) -> Self {
        Self { sources }
    }

    /// Sources of `language` in declared order. Empty for unknown languages.
    pub fn sources(&self, language: Language) -> &[String] {
        self.sources
            .get(&language)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First declared source of `language`.
    ///
    /// # Errors
    ///
    /// Returns [`CwiError::KeyNotFound`] if the language has no sources.
    pub fn default_source(&self, language: Language) -> Result<&str> {
        self.sources(language)
            .first()
            .map(String::as_str)
            .ok_or_else(|| CwiError::KeyNotFound {
                language,
                dataset: "<default>".to_string(),
            })
    }

    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.sources.keys().copied()
    }

    pub fn contains(&self, language: Language, source: &str) -> bool {
        self.sources(language).iter().any(|s| s == source)
    }
}

impl Default for SourceCatalog {
    fn default() -> Self {
        let mut sources = BTreeMap::new();
        sources.insert(
            Language::English,
            vec![
                "News".to_string(),
                "WikiNews".to_string(),
                "Wikipedia".to_string(),
            ],
        );
        sources.insert(Language::Spanish, vec!["Spanish".to_string()]);
        sources.insert(Language::German, vec!["German".to_string()]);
        sources.insert(Language::French, vec!["French".to_string()]);
        Self { sources }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Hyperparameters of the linear classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// AdamW learning rate.
    pub learning_rate: f64,
    /// AdamW decoupled weight decay (L2 regularisation).
    pub weight_decay: f64,
    /// Number of passes over the training matrix.
    pub epochs: usize,
    /// Mini-batch size.
    pub batch_size: usize,
    /// Seed for the per-epoch batch shuffle.
    pub seed: u64,
    /// Stop early once the epoch loss improves by less than this.
    /// Zero disables early stopping.
    pub tolerance: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            weight_decay: 1e-4,
            epochs: 100,
            batch_size: 256,
            seed: 0,
            tolerance: 1e-6,
        }
    }
}

/// Feature groups enabled per model variant, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub monolingual_groups: Vec<String>,
    pub crosslingual_groups: Vec<String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            monolingual_groups: vec![
                "word_features".to_string(),
                "sent_features".to_string(),
                "bag_of_words".to_string(),
                "spacy_features".to_string(),
            ],
            crosslingual_groups: vec!["word_features".to_string()],
        }
    }
}

/// Top-level configuration for preprocessing, training, and evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Directory holding `{language}/{Source}_{Train|Dev|Test}.tsv`.
    pub raw_data_dir: PathBuf,
    /// Location of the persisted crosslingual split table.
    pub split_table_path: PathBuf,
    pub catalog: SourceCatalog,
    pub features: FeatureConfig,
    pub classifier: ClassifierConfig,
    /// Fit a fresh pipeline on every prediction batch instead of reusing
    /// the vocabulary learned at training time.
    pub refit_on_predict: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            raw_data_dir: PathBuf::from("data/raw"),
            split_table_path: PathBuf::from("data/processed/all_splits.json"),
            catalog: SourceCatalog::default(),
            features: FeatureConfig::default(),
            classifier: ClassifierConfig::default(),
            refit_on_predict: false,
        }
    }
}

impl ExperimentConfig {
    /// Load a configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the YAML is invalid, or
    /// the resulting configuration fails [`ExperimentConfig::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CwiError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate a configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| CwiError::Config(format!("Failed to parse config YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let c = &self.classifier;
        if c.epochs == 0 {
            return Err(CwiError::Config("classifier.epochs must be > 0".to_string()));
        }
        if c.batch_size == 0 {
            return Err(CwiError::Config(
                "classifier.batch_size must be > 0".to_string(),
            ));
        }
        if c.learning_rate.is_nan() || c.learning_rate <= 0.0 {
            return Err(CwiError::Config(
                "classifier.learning_rate must be positive".to_string(),
            ));
        }
        if self.features.monolingual_groups.is_empty()
            || self.features.crosslingual_groups.is_empty()
        {
            return Err(CwiError::Config(
                "at least one feature group is required per variant".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Core error types.
#[derive(thiserror::Error, Debug)]
pub enum CwiError {
    /// No split table exists and generating one failed.
    #[error("Split table unavailable at {}", .path.display())]
    DataUnavailable {
        /// Where the table was expected.
        path: PathBuf,
    },

    /// The requested language/dataset combination does not exist.
    #[error("No split for {language}/{dataset}")]
    KeyNotFound { language: Language, dataset: String },

    /// A feature group's required input is missing or malformed.
    #[error("Feature group '{group}' failed on row {row}: {reason}")]
    FeatureExtraction {
        group: String,
        row: usize,
        reason: String,
    },

    /// Training data without gold labels.
    #[error("Row {row} has no gold label")]
    MissingLabels { row: usize },

    /// Prediction or transform before fitting.
    #[error("Model is not fitted; call train first")]
    NotFitted,

    /// A feature matrix whose width differs from the fitted one.
    #[error("Feature matrix has {actual} columns, model was fit on {expected}")]
    FeatureMismatch { expected: usize, actual: usize },

    /// Training attempted on an empty collection.
    #[error("Training set is empty")]
    EmptyTrainingSet,

    /// Two sequences that must align row by row do not.
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Malformed input text (labels, languages, raw rows).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Tensor or optimiser failure inside the classifier.
    #[error("Model error: {0}")]
    Model(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization / deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias for `std::result::Result<T, CwiError>`.
pub type Result<T> = std::result::Result<T, CwiError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
