//! Language resources for the preprocessing pipeline.
//!
//! Resources are loaded once, before any document is processed. A configured
//! file that cannot be read or parsed is a fatal `ResourceUnavailable` error;
//! an unconfigured resource uses the built-in table.

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::analysis::char_filter::ASCII_PUNCTUATION;
use crate::analysis::token_filter::stem::RslpRules;
use crate::analysis::token_filter::stop::DEFAULT_PORTUGUESE_STOP_WORDS;
use crate::config::ResourceConfig;
use crate::error::{IntentportError, Result};

/// Stop words, stemmer rules and punctuation set for one language.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageResources {
    stop_words: Vec<String>,
    stemmer_rules: RslpRules,
    punctuation: String,
}

impl LanguageResources {
    /// The built-in Portuguese resources.
    pub fn builtin() -> Self {
        LanguageResources::new(
            DEFAULT_PORTUGUESE_STOP_WORDS.iter().map(|w| w.to_string()),
            RslpRules::default(),
        )
    }

    /// Build resources from explicit parts. Stop words are lowercased,
    /// sorted and deduplicated.
    pub fn new<I: IntoIterator<Item = String>>(stop_words: I, stemmer_rules: RslpRules) -> Self {
        let mut stop_words: Vec<String> = stop_words
            .into_iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        stop_words.sort();
        stop_words.dedup();

        LanguageResources {
            stop_words,
            stemmer_rules,
            punctuation: ASCII_PUNCTUATION.to_string(),
        }
    }

    /// Replace the punctuation set.
    pub fn with_punctuation<S: Into<String>>(mut self, punctuation: S) -> Self {
        self.punctuation = punctuation.into();
        self
    }

    /// Load resources as described by `config`.
    pub fn load(config: &ResourceConfig) -> Result<Self> {
        let stop_words = match &config.stopwords_path {
            Some(path) => load_stop_words(path)?,
            None => DEFAULT_PORTUGUESE_STOP_WORDS
                .iter()
                .map(|w| w.to_string())
                .collect(),
        };

        let stemmer_rules = match &config.stemmer_rules_path {
            Some(path) => load_stemmer_rules(path)?,
            None => RslpRules::default(),
        };

        let resources = LanguageResources::new(stop_words, stemmer_rules);
        info!(
            "Loaded language resources: {} stop words, {} stemmer rules",
            resources.stop_words.len(),
            resources.stemmer_rules.rule_count()
        );
        Ok(resources)
    }

    /// Sorted, deduplicated stop words.
    pub fn stop_words(&self) -> &[String] {
        &self.stop_words
    }

    /// RSLP stemmer rule tables.
    pub fn stemmer_rules(&self) -> &RslpRules {
        &self.stemmer_rules
    }

    /// Characters removed before tokenization.
    pub fn punctuation(&self) -> &str {
        &self.punctuation
    }
}

impl Default for LanguageResources {
    fn default() -> Self {
        Self::builtin()
    }
}

fn load_stop_words(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| {
        IntentportError::resource_unavailable(format!(
            "cannot read stop words from {}: {e}",
            path.display()
        ))
    })?;

    let words: Vec<String> = if content.trim_start().starts_with('[') {
        serde_json::from_str(&content).map_err(|e| {
            IntentportError::resource_unavailable(format!(
                "malformed stop word list {}: {e}",
                path.display()
            ))
        })?
    } else {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect()
    };

    if words.is_empty() {
        return Err(IntentportError::resource_unavailable(format!(
            "stop word list {} is empty",
            path.display()
        )));
    }
    debug!("Read {} stop words from {}", words.len(), path.display());
    Ok(words)
}

fn load_stemmer_rules(path: &Path) -> Result<RslpRules> {
    let content = fs::read_to_string(path).map_err(|e| {
        IntentportError::resource_unavailable(format!(
            "cannot read stemmer rules from {}: {e}",
            path.display()
        ))
    })?;

    RslpRules::from_json(&content).map_err(|e| {
        IntentportError::resource_unavailable(format!(
            "malformed stemmer rules {}: {e}",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_builtin_resources() {
        let resources = LanguageResources::builtin();
        assert_eq!(resources.stop_words().len(), DEFAULT_PORTUGUESE_STOP_WORDS.len());
        assert!(resources.stop_words().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(resources.punctuation().len(), 32);
        assert_eq!(resources.stemmer_rules(), &RslpRules::default());
    }

    #[test]
    fn test_load_defaults() {
        let resources = LanguageResources::load(&ResourceConfig::default()).unwrap();
        assert_eq!(resources, LanguageResources::builtin());
    }

    #[test]
    fn test_load_stop_words_json_and_lines() {
        let dir = TempDir::new().unwrap();
        let json_path = dir.path().join("stop.json");
        fs::write(&json_path, r#"["de", "A", "de"]"#).unwrap();
        let lines_path = dir.path().join("stop.txt");
        fs::write(&lines_path, "# comment\nque\n\nde\n").unwrap();

        let config = ResourceConfig {
            stopwords_path: Some(json_path),
            stemmer_rules_path: None,
        };
        let resources = LanguageResources::load(&config).unwrap();
        assert_eq!(resources.stop_words(), ["a", "de"]);

        let config = ResourceConfig {
            stopwords_path: Some(lines_path),
            stemmer_rules_path: None,
        };
        let resources = LanguageResources::load(&config).unwrap();
        assert_eq!(resources.stop_words(), ["de", "que"]);
    }

    #[test]
    fn test_missing_resource_is_fatal() {
        let config = ResourceConfig {
            stopwords_path: Some(PathBuf::from("/nonexistent/stopwords.json")),
            stemmer_rules_path: None,
        };
        let err = LanguageResources::load(&config).unwrap_err();
        assert!(matches!(err, IntentportError::ResourceUnavailable(_)));

        let dir = TempDir::new().unwrap();
        let rules_path = dir.path().join("rules.json");
        fs::write(&rules_path, "{}").unwrap();
        let config = ResourceConfig {
            stopwords_path: None,
            stemmer_rules_path: Some(rules_path),
        };
        let err = LanguageResources::load(&config).unwrap_err();
        assert!(matches!(err, IntentportError::ResourceUnavailable(_)));
    }

    #[test]
    fn test_empty_stop_word_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "\n").unwrap();
        let config = ResourceConfig {
            stopwords_path: Some(path),
            stemmer_rules_path: None,
        };
        assert!(LanguageResources::load(&config).is_err());
    }
}
