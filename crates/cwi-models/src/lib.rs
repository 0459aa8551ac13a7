//! Complex word classifiers.
//!
//! Both wrappers pair a feature pipeline with a logistic regression and
//! follow the same lifecycle: constructed, then trained (or restored from a
//! snapshot), then used for prediction.
//!
//! ```text
//! RecordCollection → FeaturePipeline → FeatureMatrix → LogisticRegression → Vec<Label>
//! ```
//!
//! # Modules
//!
//! - [`batch`]: Seeded mini-batch iteration
//! - [`classifier`]: Logistic regression on candle
//! - [`model`]: Shared model core, lifecycle and snapshots
//! - [`monolingual`]: Single-language wrapper
//! - [`crosslingual`]: Language-agnostic wrapper

pub mod batch;
pub mod classifier;
pub mod crosslingual;
pub mod model;
pub mod monolingual;

pub use classifier::{FitSummary, LogisticParams, LogisticRegression};
pub use crosslingual::CrosslingualCwi;
pub use model::{
    CwiClassifier, CwiModel, GroupVocabulary, ModelSnapshot, ModelState, ModelVariant,
};
pub use monolingual::MonolingualCwi;
