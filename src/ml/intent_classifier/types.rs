//! Common types for intent classification.

use serde::Serialize;

use crate::ml::entities::ExtractedEntity;

/// Decision score of one class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassScore {
    pub intent: String,
    pub score: f64,
}

/// Result of classifying one utterance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentPrediction {
    /// Highest scoring intent, `None` for a model without classes.
    pub intent: Option<String>,
    /// Scores of every class in model order.
    pub scores: Vec<ClassScore>,
    /// Normalized tokens the prediction was made from.
    pub tokens: Vec<String>,
    /// Entities found in the raw text.
    pub entities: Vec<ExtractedEntity>,
}
