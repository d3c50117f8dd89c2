//! Error types for the intentport library.
//!
//! All errors are represented by the [`IntentportError`] enum. Fatal
//! conditions (missing language resources, missing dataset) abort a training
//! run before any document is processed; recoverable conditions
//! (`InsufficientData`, `SplitInfeasible`) are handled inside the pipeline and
//! degrade to a valid, if degenerate, artifact set.
//!
//! # Examples
//!
//! ```
//! use intentport::error::{IntentportError, Result};
//!
//! fn check_classes(count: usize) -> Result<()> {
//!     if count < 2 {
//!         return Err(IntentportError::insufficient_data("need at least two classes"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_classes(1).is_err());
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The main error type for intentport operations.
#[derive(Error, Debug)]
pub enum IntentportError {
    /// I/O errors (reading datasets, writing artifacts)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A language resource (stopword list, stemmer rules) could not be loaded.
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// The dataset file does not exist.
    #[error("Dataset not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    /// Too few classes or examples survived filtering to fit a classifier.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A split strategy cannot represent the requested partition.
    #[error("Split infeasible: {0}")]
    SplitInfeasible(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Model errors (shape mismatches, malformed artifacts)
    #[error("Model error: {0}")]
    Model(String),

    /// Invalid configuration values
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Regular expression compilation errors
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for operations that may fail with IntentportError.
pub type Result<T> = std::result::Result<T, IntentportError>;

impl IntentportError {
    /// Create a new resource unavailable error.
    pub fn resource_unavailable<S: Into<String>>(msg: S) -> Self {
        IntentportError::ResourceUnavailable(msg.into())
    }

    /// Create a new insufficient data error.
    pub fn insufficient_data<S: Into<String>>(msg: S) -> Self {
        IntentportError::InsufficientData(msg.into())
    }

    /// Create a new split infeasible error.
    pub fn split_infeasible<S: Into<String>>(msg: S) -> Self {
        IntentportError::SplitInfeasible(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        IntentportError::Analysis(msg.into())
    }

    /// Create a new model error.
    pub fn model<S: Into<String>>(msg: S) -> Self {
        IntentportError::Model(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        IntentportError::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = IntentportError::resource_unavailable("stopwords");
        assert_eq!(error.to_string(), "Resource unavailable: stopwords");

        let error = IntentportError::insufficient_data("1 class");
        assert_eq!(error.to_string(), "Insufficient data: 1 class");

        let error = IntentportError::DatasetNotFound(PathBuf::from("data.json"));
        assert_eq!(error.to_string(), "Dataset not found: data.json");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = IntentportError::from(io_error);

        match error {
            IntentportError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
