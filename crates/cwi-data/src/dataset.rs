//! Raw dataset loading.
//!
//! Reads the shared-task layout `{raw_dir}/{language}/{Source}_{Part}.tsv`.
//! Files are tab separated without a header:
//!
//! | Column | Content |
//! |--------|---------|
//! | 0 | HIT id |
//! | 1 | Sentence |
//! | 2, 3 | Start / end character offset of the target |
//! | 4 | Target word or phrase |
//! | 5, 6 | Native / non-native annotator counts |
//! | 7, 8 | Native / non-native "complex" votes |
//! | 9 | Binary gold label |
//! | 10 | Probabilistic gold label |
//!
//! Columns 5 onwards are absent from unlabeled files.
//!
//! Dependency parses live next to the TSV in `{Source}_{Part}.spacy.jsonl`,
//! one JSON [`ParseAnnotation`] per TSV row. Without that file records carry
//! no annotation.

use crate::splits::SplitProvider;
use cwi_core::{
    CwiError, Label, Language, ParseAnnotation, Record, RecordCollection, Result, Split,
};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Minimum number of columns a row must carry.
const MIN_COLUMNS: usize = 5;

/// Column holding the binary gold label.
const LABEL_COLUMN: usize = 9;

/// One partition of a raw dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPart {
    Train,
    Dev,
    Test,
}

impl SplitPart {
    fn file_suffix(self) -> &'static str {
        match self {
            Self::Train => "Train",
            Self::Dev => "Dev",
            Self::Test => "Test",
        }
    }
}

/// One named dataset of one language.
#[derive(Debug, Clone)]
pub struct Dataset {
    raw_dir: PathBuf,
    language: Language,
    name: String,
}

impl Dataset {
    pub fn new(raw_dir: impl Into<PathBuf>, language: Language, name: impl Into<String>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            language,
            name: name.into(),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location of the file backing `part`.
    pub fn path_for(&self, part: SplitPart) -> PathBuf {
        self.raw_dir
            .join(self.language.as_str())
            .join(format!("{}_{}.tsv", self.name, part.file_suffix()))
    }

    /// Location of the parse annotations for `part`.
    pub fn annotation_path_for(&self, part: SplitPart) -> PathBuf {
        self.raw_dir
            .join(self.language.as_str())
            .join(format!("{}_{}.spacy.jsonl", self.name, part.file_suffix()))
    }

    /// Load `part`, or `None` when its file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_part(&self, part: SplitPart) -> Result<Option<RecordCollection>> {
        let path = self.path_for(part);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "raw file absent");
            return Ok(None);
        }
        let file = std::fs::File::open(&path)?;
        let mut records = parse_tsv(file, self.language).map_err(|e| match e {
            CwiError::Parse(msg) => CwiError::Parse(format!("{}: {msg}", path.display())),
            other => other,
        })?;

        let ann_path = self.annotation_path_for(part);
        if ann_path.exists() {
            let annotations = parse_annotations(std::fs::File::open(&ann_path)?)
                .map_err(|e| CwiError::Parse(format!("{}: {e}", ann_path.display())))?;
            records = attach_annotations(records, annotations)
                .map_err(|e| CwiError::Parse(format!("{}: {e}", ann_path.display())))?;
        }
        tracing::debug!(
            path = %path.display(),
            rows = records.len(),
            "loaded raw file"
        );
        Ok(Some(records))
    }

    pub fn train_set(&self) -> Result<Option<RecordCollection>> {
        self.load_part(SplitPart::Train)
    }

    pub fn dev_set(&self) -> Result<Option<RecordCollection>> {
        self.load_part(SplitPart::Dev)
    }

    pub fn test_set(&self) -> Result<Option<RecordCollection>> {
        self.load_part(SplitPart::Test)
    }

    /// Assemble a [`Split`] from the three files.
    ///
    /// Returns `None` unless both train and test exist. A missing dev file
    /// yields an empty `dev` collection.
    pub fn load_split(&self) -> Result<Option<Split>> {
        let Some(train) = self.train_set()? else {
            return Ok(None);
        };
        let Some(test) = self.test_set()? else {
            return Ok(None);
        };
        let dev = self.dev_set()?.unwrap_or_default();
        Ok(Some(Split { train, dev, test }))
    }
}

/// Parse shared-task TSV rows into records of `language`.
///
/// # Errors
///
/// Returns [`CwiError::Parse`] for short rows or malformed offsets/labels.
pub fn parse_tsv<R: Read>(reader: R, language: Language) -> Result<RecordCollection> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut records = RecordCollection::default();
    for (line, row) in rdr.records().enumerate() {
        let row = row.map_err(|e| CwiError::Parse(format!("line {}: {e}", line + 1)))?;
        if row.len() < MIN_COLUMNS {
            return Err(CwiError::Parse(format!(
                "line {}: expected at least {MIN_COLUMNS} columns, got {}",
                line + 1,
                row.len()
            )));
        }

        let offset = |idx: usize| -> Result<usize> {
            row[idx].trim().parse().map_err(|_| {
                CwiError::Parse(format!(
                    "line {}: invalid offset '{}'",
                    line + 1,
                    &row[idx]
                ))
            })
        };

        let mut record = Record::new(language, &row[4], &row[1])
            .with_id(&row[0])
            .with_offsets(offset(2)?, offset(3)?);

        if let Some(raw) = row.get(LABEL_COLUMN).filter(|s| !s.trim().is_empty()) {
            let label = Label::parse_binary(raw)
                .map_err(|e| CwiError::Parse(format!("line {}: {e}", line + 1)))?;
            record = record.with_label(label);
        }
        records.push(record);
    }
    Ok(records)
}

/// Parse one JSON annotation per non-blank line.
pub fn parse_annotations<R: Read>(reader: R) -> Result<Vec<ParseAnnotation>> {
    let mut annotations = Vec::new();
    for (line, text) in BufReader::new(reader).lines().enumerate() {
        let text = text?;
        if text.trim().is_empty() {
            continue;
        }
        let annotation = serde_json::from_str(&text)
            .map_err(|e| CwiError::Parse(format!("line {}: {e}", line + 1)))?;
        annotations.push(annotation);
    }
    Ok(annotations)
}

fn attach_annotations(
    records: RecordCollection,
    annotations: Vec<ParseAnnotation>,
) -> std::result::Result<RecordCollection, String> {
    if records.len() != annotations.len() {
        return Err(format!(
            "{} annotations for {} rows",
            annotations.len(),
            records.len()
        ));
    }
    Ok(records
        .records()
        .iter()
        .cloned()
        .zip(annotations)
        .map(|(record, ann)| record.with_annotation(ann))
        .collect())
}

/// [`SplitProvider`] reading monolingual splits straight from raw files.
#[derive(Debug, Clone)]
pub struct RawSplits {
    raw_dir: PathBuf,
}

impl RawSplits {
    pub fn new(raw_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
        }
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }
}

impl SplitProvider for RawSplits {
    fn split(&self, language: Language, source: &str) -> Result<Option<Split>> {
        Dataset::new(&self.raw_dir, language, source).load_split()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELED: &str = "3Z8\tThe cat sat on the mat.\t4\t7\tcat\t10\t10\t0\t0\t0\t0.0\n\
                           3Z9\tA ubiquitous notion.\t2\t12\tubiquitous\t10\t10\t6\t8\t1\t0.7\n";

    fn write_file(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_parse_labeled_rows() {
        let records = parse_tsv(LABELED.as_bytes(), Language::English).unwrap();
        assert_eq!(records.len(), 2);
        let first = &records.records()[0];
        assert_eq!(first.id.as_deref(), Some("3Z8"));
        assert_eq!(first.target_word, "cat");
        assert_eq!(first.start_offset, Some(4));
        assert_eq!(first.end_offset, Some(7));
        assert_eq!(
            records.gold_labels().unwrap(),
            vec![Label::NotComplex, Label::Complex]
        );
    }

    #[test]
    fn test_parse_unlabeled_rows() {
        let records =
            parse_tsv("1\tLe chat.\t3\t7\tchat\n".as_bytes(), Language::French).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records.records()[0].gold_label.is_none());
        assert_eq!(records.records()[0].language, Language::French);
    }

    #[test]
    fn test_parse_rejects_short_rows() {
        let result = parse_tsv("1\tsentence\t0\n".as_bytes(), Language::English);
        assert!(matches!(result, Err(CwiError::Parse(_))));
    }

    #[test]
    fn test_parse_rejects_bad_offset() {
        let result = parse_tsv("1\ts\tx\t3\tcat\n".as_bytes(), Language::English);
        assert!(matches!(result, Err(CwiError::Parse(_))));
    }

    #[test]
    fn test_dataset_missing_files_are_none() {
        let dir = tempfile::tempdir().unwrap();
        let ds = Dataset::new(dir.path(), Language::German, "German");
        assert!(ds.train_set().unwrap().is_none());
        assert!(ds.load_split().unwrap().is_none());
    }

    #[test]
    fn test_dataset_split_without_dev() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "english/News_Train.tsv", LABELED);
        write_file(dir.path(), "english/News_Test.tsv", LABELED);

        let split = RawSplits::new(dir.path())
            .split(Language::English, "News")
            .unwrap()
            .unwrap();
        assert_eq!(split.train.len(), 2);
        assert!(split.dev.is_empty());
        assert!(split.is_usable());
    }

    #[test]
    fn test_dataset_path_layout() {
        let ds = Dataset::new("data/raw", Language::Spanish, "Spanish");
        assert_eq!(
            ds.path_for(SplitPart::Dev),
            PathBuf::from("data/raw/spanish/Spanish_Dev.tsv")
        );
    }

    #[test]
    fn test_annotations_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "english/News_Train.tsv", LABELED);
        let cat = r#"{"tokens":[{"text":"The","pos":"DET","dep":"det","head":1,"offset":0},{"text":"cat","pos":"NOUN","dep":"ROOT","head":1,"offset":4}]}"#;
        let idea = r#"{"tokens":[{"text":"ubiquitous","pos":"ADJ","dep":"ROOT","head":0,"offset":2}]}"#;
        write_file(
            dir.path(),
            "english/News_Train.spacy.jsonl",
            &format!("{cat}\n{idea}\n"),
        );

        let ds = Dataset::new(dir.path(), Language::English, "News");
        let records = ds.train_set().unwrap().unwrap();
        let ann = records.records()[0].spacy.as_ref().unwrap();
        assert_eq!(ann.tokens[1].pos, "NOUN");
        assert_eq!(records.records()[1].spacy.as_ref().unwrap().tokens.len(), 1);
    }

    #[test]
    fn test_annotation_count_must_match_rows() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "english/News_Test.tsv", LABELED);
        write_file(
            dir.path(),
            "english/News_Test.spacy.jsonl",
            "{\"tokens\":[]}\n",
        );
        let ds = Dataset::new(dir.path(), Language::English, "News");
        assert!(matches!(ds.test_set(), Err(CwiError::Parse(_))));
    }
}
