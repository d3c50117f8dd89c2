//! Machine learning components of the intent trainer.
//!
//! ```text
//! tokens → tfidf (fit / transform) → svm (fit / decision function)
//!                 split ─┘                 └─ metrics, naive_bayes, estimate
//! annotations → entities
//! ```

pub mod entities;
pub mod estimate;
pub mod intent_classifier;
pub mod metrics;
pub mod naive_bayes;
pub mod sparse;
pub mod split;
pub mod svm;
pub mod tfidf;
