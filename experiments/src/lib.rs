//! CWI experiment suite
//!
//! Runs the two Complex Word Identification experiments of the CWI 2018
//! shared task layout:
//!
//! - **Monolingual**: one model per dataset, trained and tested within a
//!   language (`run-monolingual`)
//! - **Crosslingual**: one model trained on all languages but one, tested on
//!   the held-out language (`run-crosslingual`)
//!
//! # Modules
//!
//! - [`metrics`]: Confusion matrix, per-label scores and report rendering
//! - [`runners`]: Monolingual and crosslingual runners with JSON output

pub mod metrics;
pub mod runners;

use cwi_core::{ExperimentConfig, Language};
use std::path::Path;

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV: &str = "CWI_CONFIG";

/// Languages with monolingual training data.
pub const MONOLINGUAL_LANGUAGES: [Language; 3] =
    [Language::English, Language::Spanish, Language::German];

/// Re-export commonly used types for experiment binaries.
pub mod prelude {
    pub use crate::metrics::{report_binary_score, ConfusionMatrix, ScoreReport};
    pub use crate::runners::crosslingual::run_crosslingual;
    pub use crate::runners::monolingual::run_monolingual;
    pub use crate::runners::{
        print_summary_table, save_results, EvalSplit, RunOptions, RunResult,
    };
}

/// Load the experiment configuration.
///
/// Precedence: `path`, then the file named by [`CONFIG_ENV`], then defaults.
pub fn load_config(path: Option<&Path>) -> cwi_core::Result<ExperimentConfig> {
    if let Some(path) = path {
        return ExperimentConfig::load(path);
    }
    match std::env::var_os(CONFIG_ENV) {
        Some(env_path) if !env_path.is_empty() => ExperimentConfig::load(Path::new(&env_path)),
        _ => Ok(ExperimentConfig::default()),
    }
}

/// Initialise `tracing` from `RUST_LOG`, defaulting to `warn`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

/// clap value parser for `--language` in the monolingual runner.
pub fn parse_monolingual_language(s: &str) -> Result<Language, String> {
    let language: Language = s.parse().map_err(|e: cwi_core::CwiError| e.to_string())?;
    if MONOLINGUAL_LANGUAGES.contains(&language) {
        Ok(language)
    } else {
        Err(format!("no monolingual data for '{language}'"))
    }
}

/// clap value parser for `--language` in the crosslingual runner.
pub fn parse_language(s: &str) -> Result<Language, String> {
    s.parse().map_err(|e: cwi_core::CwiError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parsers() {
        assert_eq!(parse_monolingual_language("german"), Ok(Language::German));
        assert!(parse_monolingual_language("french").is_err());
        assert!(parse_monolingual_language("klingon").is_err());
        assert_eq!(parse_language("french"), Ok(Language::French));
    }

    #[test]
    fn test_explicit_config_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"refit_on_predict: true\n").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert!(config.refit_on_predict);
        assert_eq!(config.classifier, ExperimentConfig::default().classifier);
    }
}
