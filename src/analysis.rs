//! Text normalization for intent classification.
//!
//! Raw utterances pass through character filters, a tokenizer and a chain of
//! token filters. The same pipeline runs at training time and inside the
//! exported runtime, so both see identical tokens.

pub mod analyzer;
pub mod char_filter;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
