//! Multinomial Naive Bayes over TF-IDF features.
//!
//! Only trained to compare its held-out accuracy with the linear SVM; it is
//! never exported.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{IntentportError, Result};
use crate::ml::sparse::SparseVector;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaiveBayesConfig {
    /// Train and evaluate the comparison model.
    pub enabled: bool,
    /// Additive smoothing.
    pub alpha: f64,
}

impl Default for NaiveBayesConfig {
    fn default() -> Self {
        NaiveBayesConfig {
            enabled: true,
            alpha: 0.1,
        }
    }
}

impl NaiveBayesConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(IntentportError::invalid_config(format!(
                "naive_bayes.alpha must be positive, got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

/// A fitted multinomial Naive Bayes classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultinomialNb {
    classes: Vec<String>,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    /// Fit on feature vectors `x` with one label per row.
    pub fn fit(
        x: &[SparseVector],
        labels: &[String],
        num_features: usize,
        alpha: f64,
    ) -> Result<Self> {
        if x.len() != labels.len() {
            return Err(IntentportError::model(format!(
                "{} feature rows but {} labels",
                x.len(),
                labels.len()
            )));
        }
        if x.is_empty() {
            return Err(IntentportError::insufficient_data("no training examples"));
        }

        let mut per_class: BTreeMap<&str, (usize, Vec<f64>)> = BTreeMap::new();
        for (features, label) in x.iter().zip(labels) {
            let (count, totals) = per_class
                .entry(label.as_str())
                .or_insert_with(|| (0, vec![0.0; num_features]));
            *count += 1;
            features.add_scaled_to(totals, 1.0);
        }

        let n = x.len() as f64;
        let mut classes = Vec::with_capacity(per_class.len());
        let mut class_log_prior = Vec::with_capacity(per_class.len());
        let mut feature_log_prob = Vec::with_capacity(per_class.len());
        for (label, (count, totals)) in per_class {
            let denominator: f64 = totals.iter().sum::<f64>() + alpha * num_features as f64;
            classes.push(label.to_string());
            class_log_prior.push((count as f64 / n).ln());
            feature_log_prob.push(
                totals
                    .iter()
                    .map(|t| ((t + alpha) / denominator).ln())
                    .collect(),
            );
        }

        Ok(MultinomialNb {
            classes,
            class_log_prior,
            feature_log_prob,
        })
    }

    /// Most likely class; ties go to the lowest index.
    pub fn predict(&self, x: &SparseVector) -> Option<&str> {
        let mut best: Option<(usize, f64)> = None;
        for (index, (prior, log_prob)) in self
            .class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .enumerate()
        {
            let score = prior + x.dot(log_prob);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((index, score)),
            }
        }
        best.map(|(index, _)| self.classes[index].as_str())
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_predict() {
        let x = vec![
            SparseVector::from_pairs(vec![(0, 1.0)]),
            SparseVector::from_pairs(vec![(0, 0.7), (2, 0.7)]),
            SparseVector::from_pairs(vec![(1, 1.0)]),
            SparseVector::from_pairs(vec![(1, 0.7), (2, 0.7)]),
        ];
        let labels: Vec<String> = ["a", "a", "b", "b"].iter().map(|s| s.to_string()).collect();

        let model = MultinomialNb::fit(&x, &labels, 3, 0.1).unwrap();
        assert_eq!(model.classes(), &["a", "b"]);
        assert_eq!(model.predict(&x[0]), Some("a"));
        assert_eq!(model.predict(&x[3]), Some("b"));
        // Equal priors and no evidence: first class.
        assert_eq!(model.predict(&SparseVector::new()), Some("a"));
    }

    #[test]
    fn test_fit_rejects_empty() {
        assert!(MultinomialNb::fit(&[], &[], 3, 0.1).is_err());
    }
}
