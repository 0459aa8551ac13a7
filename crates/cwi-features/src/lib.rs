//! Feature extraction for Complex Word Identification.
//!
//! A feature pipeline is a list of independent, named feature groups. Each
//! group selects fields from a record, extracts features from them, and
//! vectorizes the result into a block of columns. The [`FeaturePipeline`]
//! concatenates the blocks horizontally (a feature union), preserving row
//! order.
//!
//! # Modules
//!
//! - [`matrix`]: Dense row-major feature matrix and horizontal stacking
//! - [`selector`]: Field selection with presence checks
//! - [`extractor`]: Extractor trait and the word/sentence/syntactic extractors
//! - [`vectorize`]: Dictionary and count vectorizers
//! - [`pipeline`]: The [`FeatureGroup`] capability and the union pipeline
//! - [`registry`]: Name-keyed lookup table of group factories

pub mod extractor;
pub mod matrix;
pub mod pipeline;
pub mod registry;
pub mod selector;
pub mod vectorize;

pub use extractor::{FeatureDict, FeatureExtractor, FeatureValue};
pub use matrix::FeatureMatrix;
pub use pipeline::{CountGroup, DictGroup, FeatureGroup, FeaturePipeline};
pub use registry::{FeatureRegistry, LanguageBinding};
pub use selector::{Field, Selection, Selector};
pub use vectorize::{CountVectorizer, DictVectorizer};
