//! Data access for the CWI pipeline.
//!
//! # Modules
//!
//! - [`dataset`]: Loader for the raw shared-task TSV files
//! - [`preprocess`]: Builds and persists the crosslingual split table
//! - [`splits`]: Resolves train/dev/test splits, generating the table lazily

pub mod dataset;
pub mod preprocess;
pub mod splits;

pub use dataset::{Dataset, RawSplits, SplitPart};
pub use preprocess::{CrosslingualPreprocessor, Preprocessor};
pub use splits::{SplitProvider, SplitResolver};
