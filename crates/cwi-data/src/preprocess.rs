//! Crosslingual split-table generation.
//!
//! For every held-out language `L` and every source `S` of `L`, the table
//! stores:
//!
//! - `train`: the training sets of every dataset of every language except
//!   `L`, concatenated in catalog order
//! - `dev` / `test`: the development and test sets of `L/S` (empty when the
//!   source ships none)

use crate::dataset::Dataset;
use cwi_core::{Language, RecordCollection, Result, SourceCatalog, Split, SplitTable};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Produces the persisted split table on demand.
pub trait Preprocessor {
    /// Build the table and write it to `output`.
    fn generate(&self, output: &Path) -> Result<()>;
}

impl<F> Preprocessor for F
where
    F: Fn(&Path) -> Result<()>,
{
    fn generate(&self, output: &Path) -> Result<()> {
        self(output)
    }
}

/// Builds the crosslingual table from raw shared-task files.
#[derive(Debug, Clone)]
pub struct CrosslingualPreprocessor {
    raw_dir: PathBuf,
    catalog: Arc<SourceCatalog>,
}

/// Raw partitions of one dataset, loaded once.
#[derive(Default)]
struct LoadedDataset {
    train: Option<RecordCollection>,
    dev: Option<RecordCollection>,
    test: Option<RecordCollection>,
}

impl CrosslingualPreprocessor {
    pub fn new(raw_dir: impl Into<PathBuf>, catalog: Arc<SourceCatalog>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            catalog,
        }
    }

    /// Build the split table in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if any existing raw file fails to parse.
    pub fn build_table(&self) -> Result<SplitTable> {
        let mut loaded: BTreeMap<(Language, String), LoadedDataset> = BTreeMap::new();
        for language in self.catalog.languages() {
            for source in self.catalog.sources(language) {
                let ds = Dataset::new(&self.raw_dir, language, source.as_str());
                let entry = LoadedDataset {
                    train: ds.train_set()?,
                    dev: ds.dev_set()?,
                    test: ds.test_set()?,
                };
                if entry.train.is_none() && entry.test.is_none() {
                    tracing::warn!(%language, source = %source, "no raw data found");
                }
                loaded.insert((language, source.clone()), entry);
            }
        }

        let mut table = SplitTable::new();
        for held_out in self.catalog.languages() {
            let mut train = RecordCollection::default();
            for language in self.catalog.languages().filter(|l| *l != held_out) {
                for source in self.catalog.sources(language) {
                    let key = (language, source.clone());
                    if let Some(t) = loaded.get(&key).and_then(|d| d.train.as_ref()) {
                        train.extend_from(t);
                    }
                }
            }

            for source in self.catalog.sources(held_out) {
                let data = loaded
                    .get(&(held_out, source.clone()))
                    .map(|d| (d.dev.clone(), d.test.clone()))
                    .unwrap_or_default();
                let split = Split {
                    train: train.clone(),
                    dev: data.0.unwrap_or_default(),
                    test: data.1.unwrap_or_default(),
                };
                if !split.is_usable() {
                    tracing::warn!(
                        language = %held_out,
                        source = %source,
                        train = split.train.len(),
                        test = split.test.len(),
                        "crosslingual split is missing train or test data"
                    );
                }
                tracing::debug!(
                    language = %held_out,
                    source = %source,
                    train = split.train.len(),
                    dev = split.dev.len(),
                    test = split.test.len(),
                    "built crosslingual split"
                );
                table.insert(held_out, source.as_str(), split);
            }
        }
        Ok(table)
    }
}

impl Preprocessor for CrosslingualPreprocessor {
    fn generate(&self, output: &Path) -> Result<()> {
        let table = self.build_table()?;
        table.save(output)?;
        tracing::info!(
            path = %output.display(),
            entries = table.len(),
            "wrote crosslingual split table"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cwi_core::Label;

    fn row(id: &str, target: &str, label: u8) -> String {
        format!("{id}\tThe {target} is here.\t4\t{}\t{target}\t10\t10\t0\t0\t{label}\t0.0\n", 4 + target.len())
    }

    fn write_file(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        write_file(p, "english/News_Train.tsv", &(row("e1", "cat", 0) + &row("e2", "ubiquitous", 1)));
        write_file(p, "english/News_Dev.tsv", &row("e3", "dog", 0));
        write_file(p, "english/News_Test.tsv", &row("e4", "ephemeral", 1));
        write_file(p, "spanish/Spanish_Train.tsv", &row("s1", "gato", 0));
        write_file(p, "spanish/Spanish_Test.tsv", &row("s2", "efímero", 1));
        write_file(p, "german/German_Train.tsv", &row("g1", "Katze", 0));
        write_file(p, "german/German_Test.tsv", &row("g2", "Vergänglichkeit", 1));
        write_file(p, "french/French_Test.tsv", &row("f1", "chat", 0));
        dir
    }

    fn catalog() -> Arc<SourceCatalog> {
        let mut sources = BTreeMap::new();
        sources.insert(Language::English, vec!["News".to_string()]);
        sources.insert(Language::Spanish, vec!["Spanish".to_string()]);
        sources.insert(Language::German, vec!["German".to_string()]);
        sources.insert(Language::French, vec!["French".to_string()]);
        Arc::new(SourceCatalog::new(sources))
    }

    #[test]
    fn test_train_excludes_held_out_language() {
        let dir = fixture();
        let table = CrosslingualPreprocessor::new(dir.path(), catalog())
            .build_table()
            .unwrap();

        let french = table.get(Language::French, "French").unwrap();
        assert_eq!(french.train.len(), 4);
        assert!(french
            .train
            .languages()
            .iter()
            .all(|l| *l != Language::French));
        assert!(french.dev.is_empty());
        assert_eq!(french.test.len(), 1);

        let english = table.get(Language::English, "News").unwrap();
        assert!(english
            .train
            .languages()
            .iter()
            .all(|l| *l != Language::English));
        assert_eq!(english.dev.len(), 1);
        assert_eq!(
            english.test.gold_labels().unwrap(),
            vec![Label::Complex]
        );
    }

    #[test]
    fn test_train_concatenates_in_catalog_order() {
        let dir = fixture();
        let table = CrosslingualPreprocessor::new(dir.path(), catalog())
            .build_table()
            .unwrap();
        let french = table.get(Language::French, "French").unwrap();
        assert_eq!(
            french.train.languages(),
            vec![
                Language::English,
                Language::English,
                Language::Spanish,
                Language::German
            ]
        );
    }

    #[test]
    fn test_sources_follow_declared_order() {
        let dir = fixture();
        let p = dir.path();
        write_file(p, "english/Wikipedia_Train.tsv", &row("w1", "wiki", 0));
        write_file(p, "english/News_Train.tsv", &row("n1", "news", 1));
        let catalog = cwi_core::ExperimentConfig::from_yaml_str(
            "catalog:\n  english: [Wikipedia, News]\n  french: [French]\n",
        )
        .unwrap()
        .catalog;

        let table = CrosslingualPreprocessor::new(p, Arc::new(catalog))
            .build_table()
            .unwrap();
        let french = table.get(Language::French, "French").unwrap();
        let targets: Vec<&str> = french
            .train
            .iter()
            .map(|r| r.target_word.as_str())
            .collect();
        assert_eq!(targets, vec!["wiki", "news"]);
    }

    #[test]
    fn test_generate_writes_table() {
        let dir = fixture();
        let out = dir.path().join("processed/all_splits.json");
        CrosslingualPreprocessor::new(dir.path(), catalog())
            .generate(&out)
            .unwrap();
        let table = SplitTable::load(&out).unwrap();
        assert_eq!(table.len(), 4);
    }
}
