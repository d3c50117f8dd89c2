//! # intentport
//!
//! Trains a Portuguese intent classifier and exports it as plain JSON
//! artifacts that a runtime in any language can load.
//!
//! ## Features
//!
//! - Text normalization with stop words and a table-driven RSLP stemmer
//! - TF-IDF vectorization over word n-grams
//! - One-vs-rest linear SVM with a seeded dual coordinate descent solver
//! - Split planning that degrades from stratified to shuffled to training-set evaluation
//! - Entity dictionaries and a regex based entity extractor
//! - Checksummed artifact export with a reloadable runtime model

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod ml;
pub mod pipeline;
pub mod resources;

pub mod prelude {
    pub use crate::config::TrainingConfig;
    pub use crate::dataset::Dataset;
    pub use crate::error::{IntentportError, Result};
    pub use crate::export::ArtifactSet;
    pub use crate::ml::intent_classifier::{IntentClassifier, PortableIntentModel};
    pub use crate::pipeline::{Trainer, TrainingReport};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
