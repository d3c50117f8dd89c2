//! Intent classifier trait definition.

use crate::error::Result;
use crate::ml::intent_classifier::types::IntentPrediction;

/// Predicts the intent of a raw utterance.
pub trait IntentClassifier: Send + Sync {
    /// Predict the intent for `text`.
    fn predict(&self, text: &str) -> Result<IntentPrediction>;

    /// Get the name of this classifier for debugging and logging.
    fn name(&self) -> &str;
}
