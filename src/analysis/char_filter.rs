//! Character filters that transform raw text before tokenization.
//!
//! The normalization order is fixed: the whole input is lowercased first,
//! then punctuation is removed, and only then is the text split into words.

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

pub mod lowercase;
pub mod punctuation;

pub use lowercase::LowercaseCharFilter;
pub use punctuation::{ASCII_PUNCTUATION, PunctuationCharFilter};
