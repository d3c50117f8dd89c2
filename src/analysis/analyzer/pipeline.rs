//! Pipeline analyzer that combines char filters, a tokenizer and filters.
//!
//! The PipelineAnalyzer applies processing in this order:
//! 1. Char Filters: transform the raw text as a whole
//! 2. Tokenizer: splits text into tokens
//! 3. Token Filters: applied sequentially in the order they were added
//!
//! # Examples
//!
//! ```
//! use intentport::analysis::analyzer::Analyzer;
//! use intentport::analysis::analyzer::pipeline::PipelineAnalyzer;
//! use intentport::analysis::char_filter::LowercaseCharFilter;
//! use intentport::analysis::tokenizer::UnicodeWordTokenizer;
//! use intentport::analysis::token_filter::StopFilter;
//! use std::sync::Arc;
//!
//! let analyzer = PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
//!     .add_char_filter(Arc::new(LowercaseCharFilter::new()))
//!     .add_filter(Arc::new(StopFilter::from_words(vec!["um", "de"])))
//!     .with_name("custom");
//!
//! let tokens: Vec<_> = analyzer.analyze("Quero um Plano de saúde").unwrap().collect();
//!
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[0].text, "quero");
//! assert_eq!(tokens[1].text, "plano");
//! assert_eq!(tokens[2].text, "saúde");
//! ```

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use log::trace;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::char_filter::CharFilter;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// A configurable analyzer that combines a tokenizer with chains of filters.
#[derive(Clone)]
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    char_filters: Vec<Arc<dyn CharFilter>>,
    filters: Vec<Arc<dyn Filter>>,
    name: String,
}

impl PipelineAnalyzer {
    /// Create a new pipeline analyzer with the given tokenizer.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            name: format!("pipeline_{}", tokenizer.name()),
            tokenizer,
            char_filters: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Add a char filter to the pipeline.
    pub fn add_char_filter(mut self, char_filter: Arc<dyn CharFilter>) -> Self {
        self.char_filters.push(char_filter);
        self
    }

    /// Add a filter to the pipeline.
    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set a custom name for this analyzer.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// The configured name of this analyzer.
    pub fn pipeline_name(&self) -> &str {
        &self.name
    }

    /// Get the tokenizer used by this analyzer.
    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// Get the char filters used by this analyzer.
    pub fn char_filters(&self) -> &[Arc<dyn CharFilter>] {
        &self.char_filters
    }

    /// Get the filters used by this analyzer.
    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut filtered_text = text.to_string();
        for char_filter in &self.char_filters {
            filtered_text = char_filter.filter(&filtered_text);
        }
        trace!("{}: char filters produced {filtered_text:?}", self.name);

        let mut tokens = self.tokenizer.tokenize(&filtered_text)?;
        for filter in &self.filters {
            tokens = filter.filter(tokens)?;
        }

        Ok(tokens)
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}

impl Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineAnalyzer")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field(
                "char_filters",
                &self.char_filters.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::char_filter::{LowercaseCharFilter, PunctuationCharFilter};
    use crate::analysis::token::Token;
    use crate::analysis::token_filter::{RemoveEmptyFilter, StopFilter};
    use crate::analysis::tokenizer::UnicodeWordTokenizer;

    #[test]
    fn test_char_filters_run_before_tokenizer() {
        let analyzer = PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
            .add_char_filter(Arc::new(LowercaseCharFilter::new()))
            .add_char_filter(Arc::new(PunctuationCharFilter::new()));

        assert_eq!(
            analyzer.char_filters().iter().map(|c| c.name()).collect::<Vec<_>>(),
            vec!["lowercase", "punctuation"]
        );

        let tokens: Vec<Token> = analyzer.analyze("Olá, BOM-DIA!").unwrap().collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "olá");
        assert_eq!(tokens[1].text, "bomdia");
    }

    #[test]
    fn test_filters_applied_in_order() {
        let analyzer = PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
            .add_filter(Arc::new(StopFilter::from_words(vec!["de"]).remove_stopped(false)))
            .add_filter(Arc::new(RemoveEmptyFilter::new()));

        let tokens: Vec<Token> = analyzer.analyze("plano de saúde").unwrap().collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "plano");
        assert_eq!(tokens[1].text, "saúde");
    }

    #[test]
    fn test_pipeline_name() {
        let analyzer = PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()));
        assert_eq!(analyzer.pipeline_name(), "pipeline_unicode_word");
        assert_eq!(analyzer.with_name("pt").pipeline_name(), "pt");
    }
}
