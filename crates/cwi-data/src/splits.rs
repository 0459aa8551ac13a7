//! Split resolution.
//!
//! [`SplitResolver`] reads the persisted crosslingual split table, running
//! the injected [`Preprocessor`] once when the table does not exist yet.

use crate::preprocess::{CrosslingualPreprocessor, Preprocessor};
use cwi_core::{CwiError, ExperimentConfig, Language, Result, SourceCatalog, Split, SplitTable};
use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Anything that can hand out the split of a language/source pair.
pub trait SplitProvider {
    /// `Ok(None)` means "no data for this pair"; callers skip it.
    fn split(&self, language: Language, source: &str) -> Result<Option<Split>>;
}

impl SplitProvider for SplitTable {
    fn split(&self, language: Language, source: &str) -> Result<Option<Split>> {
        Ok(self.get(language, source).cloned())
    }
}

/// Read-only access to the crosslingual split table.
pub struct SplitResolver {
    table_path: PathBuf,
    catalog: Arc<SourceCatalog>,
    preprocessor: Box<dyn Preprocessor>,
    table: OnceCell<SplitTable>,
}

impl SplitResolver {
    pub fn new(
        table_path: impl Into<PathBuf>,
        catalog: Arc<SourceCatalog>,
        preprocessor: impl Preprocessor + 'static,
    ) -> Self {
        Self {
            table_path: table_path.into(),
            catalog,
            preprocessor: Box::new(preprocessor),
            table: OnceCell::new(),
        }
    }

    /// Resolver backed by the raw-data preprocessor described by `config`.
    pub fn from_config(config: &ExperimentConfig, catalog: Arc<SourceCatalog>) -> Self {
        let preprocessor = CrosslingualPreprocessor::new(&config.raw_data_dir, catalog.clone());
        Self::new(&config.split_table_path, catalog, preprocessor)
    }

    pub fn table_path(&self) -> &Path {
        &self.table_path
    }

    pub fn catalog(&self) -> &SourceCatalog {
        &self.catalog
    }

    /// The whole split table, generated once if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`CwiError::DataUnavailable`] if the table is absent and the
    /// preprocessor did not produce it.
    pub fn split_table(&self) -> Result<&SplitTable> {
        if let Some(table) = self.table.get() {
            return Ok(table);
        }

        if !self.table_path.exists() {
            tracing::warn!(
                path = %self.table_path.display(),
                "No crosslingual split file, generating"
            );
            if let Err(e) = self.preprocessor.generate(&self.table_path) {
                tracing::error!(error = %e, "preprocessing failed");
            }
            if !self.table_path.exists() {
                tracing::error!(
                    path = %self.table_path.display(),
                    "preprocessing did not produce a split table"
                );
                return Err(CwiError::DataUnavailable {
                    path: self.table_path.clone(),
                });
            }
        }

        let table = SplitTable::load(&self.table_path)?;
        Ok(self.table.get_or_init(|| table))
    }

    /// Train/dev/test for `language`.
    ///
    /// With `source = None` the catalog's default source is used; during
    /// training only the held-out language matters, not the source.
    ///
    /// # Errors
    ///
    /// - [`CwiError::DataUnavailable`] when no table can be obtained
    /// - [`CwiError::KeyNotFound`] when the pair is not in the table
    pub fn resolve(&self, language: Language, source: Option<&str>) -> Result<Split> {
        let table = self.split_table()?;
        let source = match source {
            Some(s) => s,
            None => self.catalog.default_source(language)?,
        };
        table
            .get(language, source)
            .cloned()
            .ok_or_else(|| CwiError::KeyNotFound {
                language,
                dataset: source.to_string(),
            })
    }
}

impl SplitProvider for SplitResolver {
    fn split(&self, language: Language, source: &str) -> Result<Option<Split>> {
        self.resolve(language, Some(source)).map(Some)
    }
}
