//! Punctuation removal char filter.
//!
//! Removes every character of a configured punctuation set. The default set
//! is the 32 ASCII punctuation characters; the set itself is exported with
//! the preprocessing artifact so another runtime can strip exactly the same
//! characters.

use std::collections::BTreeSet;

use crate::analysis::char_filter::CharFilter;

/// The default punctuation set: every ASCII punctuation character.
pub const ASCII_PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// A char filter that deletes punctuation characters.
#[derive(Clone, Debug)]
pub struct PunctuationCharFilter {
    punctuation: BTreeSet<char>,
}

impl PunctuationCharFilter {
    /// Create a filter that removes ASCII punctuation.
    pub fn new() -> Self {
        Self::with_chars(ASCII_PUNCTUATION.chars())
    }

    /// Create a filter that removes the given characters.
    pub fn with_chars<I: IntoIterator<Item = char>>(chars: I) -> Self {
        PunctuationCharFilter {
            punctuation: chars.into_iter().collect(),
        }
    }

    /// The removed characters, in code point order.
    pub fn punctuation(&self) -> String {
        self.punctuation.iter().collect()
    }

    /// Check whether a character is removed by this filter.
    pub fn is_punctuation(&self, c: char) -> bool {
        self.punctuation.contains(&c)
    }
}

impl Default for PunctuationCharFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl CharFilter for PunctuationCharFilter {
    fn filter(&self, input: &str) -> String {
        input.chars().filter(|c| !self.is_punctuation(*c)).collect()
    }

    fn name(&self) -> &'static str {
        "punctuation"
    }
}
