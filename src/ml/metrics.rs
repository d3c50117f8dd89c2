//! Evaluation metrics.

use serde::Serialize;

/// Fraction of predictions equal to the expected label. Empty input scores 0.
pub fn accuracy<E, P>(expected: &[E], predicted: &[P]) -> f64
where
    E: AsRef<str>,
    P: AsRef<str>,
{
    let total = expected.len().min(predicted.len());
    if total == 0 {
        return 0.0;
    }
    let correct = expected
        .iter()
        .zip(predicted)
        .filter(|(e, p)| e.as_ref() == p.as_ref())
        .count();
    correct as f64 / total as f64
}

/// Held-out evaluation of one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Model name, e.g. "linear_svm".
    pub model: String,
    pub accuracy: f64,
    /// Number of evaluated examples.
    pub n_test: usize,
    /// The evaluated examples were also used for training.
    pub evaluated_on_training_set: bool,
    /// Size of the model parameters serialized as JSON.
    pub size_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        let expected = vec!["a", "b", "b", "c"];
        let predicted = vec!["a".to_string(), "b".to_string(), "c".to_string(), "c".to_string()];
        assert_eq!(accuracy(&expected, &predicted), 0.75);
    }

    #[test]
    fn test_accuracy_empty() {
        let empty: Vec<&str> = Vec::new();
        assert_eq!(accuracy(&empty, &empty), 0.0);
    }
}
