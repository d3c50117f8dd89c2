//! Portuguese analyzer used for intent training and prediction.
//!
//! ```text
//! lowercase → strip punctuation → unicode words → stop words → remove empty → RSLP stem
//! ```
//!
//! # Examples
//!
//! ```
//! use intentport::analysis::analyzer::portuguese::PortugueseAnalyzer;
//!
//! let analyzer = PortugueseAnalyzer::new();
//! let tokens = analyzer.normalize("Quero uma cotação de planos!").unwrap();
//!
//! assert_eq!(tokens, vec!["quer", "cot", "plan"]);
//! ```

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::char_filter::{LowercaseCharFilter, PunctuationCharFilter};
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{RemoveEmptyFilter, RslpStemmer, StemFilter, StopFilter};
use crate::analysis::tokenizer::UnicodeWordTokenizer;
use crate::error::Result;
use crate::resources::LanguageResources;

/// Analyzer that turns raw Portuguese text into stemmed tokens.
#[derive(Clone)]
pub struct PortugueseAnalyzer {
    inner: PipelineAnalyzer,
}

impl PortugueseAnalyzer {
    /// Create an analyzer with the built-in resources.
    pub fn new() -> Self {
        Self::with_resources(&LanguageResources::builtin())
    }

    /// Create an analyzer from loaded language resources.
    pub fn with_resources(resources: &LanguageResources) -> Self {
        let stemmer = RslpStemmer::with_rules(resources.stemmer_rules().clone());
        let inner = PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
            .add_char_filter(Arc::new(LowercaseCharFilter::new()))
            .add_char_filter(Arc::new(PunctuationCharFilter::with_chars(
                resources.punctuation().chars(),
            )))
            .add_filter(Arc::new(StopFilter::from_words(
                resources.stop_words().iter().cloned(),
            )))
            .add_filter(Arc::new(RemoveEmptyFilter::new()))
            .add_filter(Arc::new(StemFilter::with_stemmer(Arc::new(stemmer))))
            .with_name("portuguese");

        PortugueseAnalyzer { inner }
    }

    /// Normalize `text` into its token strings.
    pub fn normalize(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|token| token.text).collect())
    }
}

impl Default for PortugueseAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for PortugueseAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "portuguese"
    }
}

impl Debug for PortugueseAnalyzer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortugueseAnalyzer")
            .field("inner", &self.inner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token_filter::stem::RslpRules;

    #[test]
    fn test_normalize_pipeline() {
        let analyzer = PortugueseAnalyzer::new();

        assert_eq!(
            analyzer.normalize("Olá! Quero um plano de saúde.").unwrap(),
            vec!["olá", "quer", "plan", "saúd"]
        );
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let analyzer = PortugueseAnalyzer::new();
        let text = "Preciso de uma cotação rapidamente";
        assert_eq!(
            analyzer.normalize(text).unwrap(),
            analyzer.normalize(text).unwrap()
        );
    }

    #[test]
    fn test_only_stop_words_and_punctuation() {
        let analyzer = PortugueseAnalyzer::new();
        assert!(analyzer.normalize("de que, o?!").unwrap().is_empty());
        assert!(analyzer.normalize("").unwrap().is_empty());
    }

    #[test]
    fn test_custom_resources() {
        let resources = LanguageResources::new(vec!["plano".to_string()], RslpRules::default());
        let analyzer = PortugueseAnalyzer::with_resources(&resources);

        // "de" is no longer a stop word, "plano" is.
        assert_eq!(
            analyzer.normalize("plano de saúde").unwrap(),
            vec!["de", "saúd"]
        );
    }

    #[test]
    fn test_analyzer_name() {
        assert_eq!(PortugueseAnalyzer::new().name(), "portuguese");
    }
}
