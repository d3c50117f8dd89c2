//! Training configuration.
//!
//! Every section has a `Default` and every field is optional in the JSON
//! file, so `{}` is a valid configuration that reproduces the defaults.
//!
//! # Examples
//!
//! ```
//! use intentport::config::TrainingConfig;
//!
//! let config = TrainingConfig::from_json(r#"{"svm": {"c": 0.5}}"#).unwrap();
//! assert_eq!(config.svm.c, 0.5);
//! assert_eq!(config.svm.max_iter, 3000);
//! assert_eq!(config.split.test_fraction, 0.2);
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IntentportError, Result};
use crate::ml::estimate::EstimateConfig;
use crate::ml::naive_bayes::NaiveBayesConfig;
use crate::ml::split::SplitConfig;
use crate::ml::svm::SvmConfig;
use crate::ml::tfidf::TfIdfConfig;

/// The only language the preprocessing pipeline supports.
pub const PORTUGUESE: &str = "portuguese";

/// Top-level configuration of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Preprocessing language.
    pub language: String,
    /// Where to load language resources from.
    pub resources: ResourceConfig,
    /// TF-IDF vectorizer settings.
    pub vectorizer: TfIdfConfig,
    /// Split planner settings.
    pub split: SplitConfig,
    /// Linear SVM settings.
    pub svm: SvmConfig,
    /// Naive Bayes comparison model settings.
    pub naive_bayes: NaiveBayesConfig,
    /// Neural network size estimate settings.
    pub estimate: EstimateConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            language: PORTUGUESE.to_string(),
            resources: ResourceConfig::default(),
            vectorizer: TfIdfConfig::default(),
            split: SplitConfig::default(),
            svm: SvmConfig::default(),
            naive_bayes: NaiveBayesConfig::default(),
            estimate: EstimateConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TrainingConfig = serde_json::from_str(json)
            .map_err(|e| IntentportError::invalid_config(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            IntentportError::invalid_config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Check every section for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        if self.language != PORTUGUESE {
            return Err(IntentportError::invalid_config(format!(
                "unsupported language '{}', only '{PORTUGUESE}' is available",
                self.language
            )));
        }
        self.vectorizer.validate()?;
        self.split.validate()?;
        self.svm.validate()?;
        self.naive_bayes.validate()?;
        self.estimate.validate()?;
        Ok(())
    }
}

/// Locations of language resources. `None` selects the built-in table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Stop word list: a JSON array of strings or one word per line.
    pub stopwords_path: Option<PathBuf>,
    /// RSLP rule tables in the JSON layout of the preprocessing artifact.
    pub stemmer_rules_path: Option<PathBuf>,
}
