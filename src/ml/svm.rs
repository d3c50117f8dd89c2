//! Linear support vector classification.
//!
//! [`LinearSvc`] trains one binary classifier per class (one-vs-rest). Each
//! binary problem is the L2-regularized squared-hinge SVM
//!
//! ```text
//! min_w  0.5 * |w|^2 + C * sum_i max(0, 1 - y_i * (w . x_i + b))^2
//! ```
//!
//! solved in the dual by coordinate descent, with the bias learned as the
//! weight of a constant feature of value `intercept_scaling`. The fitted
//! [`LinearModel`] only keeps the decision function: one coefficient row and
//! one intercept per class.

use std::collections::BTreeSet;

use log::{debug, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{IntentportError, Result};
use crate::ml::sparse::SparseVector;

/// Solver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvmConfig {
    /// Inverse regularization strength.
    pub c: f64,
    /// Maximum passes over the training set per class.
    pub max_iter: usize,
    /// Stopping tolerance on the projected gradient spread.
    pub tol: f64,
    /// Value of the constant bias feature.
    pub intercept_scaling: f64,
    /// Seed for the coordinate permutation.
    pub seed: u64,
}

impl Default for SvmConfig {
    fn default() -> Self {
        SvmConfig {
            c: 1.0,
            max_iter: 3000,
            tol: 1e-4,
            intercept_scaling: 1.0,
            seed: 42,
        }
    }
}

impl SvmConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(IntentportError::invalid_config(format!(
                "svm.c must be positive, got {}",
                self.c
            )));
        }
        if self.max_iter == 0 {
            return Err(IntentportError::invalid_config("svm.max_iter must be at least 1"));
        }
        if !(self.tol.is_finite() && self.tol > 0.0) {
            return Err(IntentportError::invalid_config(format!(
                "svm.tol must be positive, got {}",
                self.tol
            )));
        }
        if !(self.intercept_scaling.is_finite() && self.intercept_scaling > 0.0) {
            return Err(IntentportError::invalid_config(format!(
                "svm.intercept_scaling must be positive, got {}",
                self.intercept_scaling
            )));
        }
        Ok(())
    }
}

/// One-vs-rest linear SVM trainer.
#[derive(Debug, Clone, Default)]
pub struct LinearSvc {
    config: SvmConfig,
}

impl LinearSvc {
    pub fn new(config: SvmConfig) -> Self {
        LinearSvc { config }
    }

    /// Fit a model on feature vectors `x` with one label per row.
    ///
    /// Classes are the sorted distinct labels. Fails with `InsufficientData`
    /// when fewer than two examples or two classes are given.
    pub fn fit(&self, x: &[SparseVector], labels: &[String], num_features: usize) -> Result<LinearModel> {
        if x.len() != labels.len() {
            return Err(IntentportError::model(format!(
                "{} feature rows but {} labels",
                x.len(),
                labels.len()
            )));
        }
        if let Some(index) = x.iter().filter_map(SparseVector::max_index).max() {
            if index >= num_features {
                return Err(IntentportError::model(format!(
                    "feature index {index} exceeds {num_features} columns"
                )));
            }
        }

        let classes: Vec<String> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if x.len() < 2 || classes.len() < 2 {
            return Err(IntentportError::insufficient_data(format!(
                "need at least 2 examples and 2 classes, got {} examples and {} classes",
                x.len(),
                classes.len()
            )));
        }

        let sq_norms: Vec<f64> = x.iter().map(SparseVector::squared_norm).collect();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut coef = Vec::with_capacity(classes.len());
        let mut intercept = Vec::with_capacity(classes.len());

        for class in &classes {
            let y: Vec<f64> = labels
                .iter()
                .map(|label| if label == class { 1.0 } else { -1.0 })
                .collect();
            let (w, b) = self.solve_binary(class, x, &sq_norms, &y, num_features, &mut rng);
            coef.push(w);
            intercept.push(b);
        }

        Ok(LinearModel {
            classes,
            coef,
            intercept,
        })
    }

    /// Dual coordinate descent for one binary problem with labels in {-1, +1}.
    fn solve_binary(
        &self,
        class: &str,
        x: &[SparseVector],
        sq_norms: &[f64],
        y: &[f64],
        num_features: usize,
        rng: &mut StdRng,
    ) -> (Vec<f64>, f64) {
        let bias = self.config.intercept_scaling;
        let diag = 0.5 / self.config.c;
        let qd: Vec<f64> = sq_norms.iter().map(|n| n + bias * bias + diag).collect();

        let mut w = vec![0.0; num_features];
        let mut w_bias = 0.0;
        let mut alpha = vec![0.0; x.len()];
        let mut order: Vec<usize> = (0..x.len()).collect();
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.config.max_iter {
            iterations += 1;
            order.shuffle(rng);

            let mut pg_max = f64::NEG_INFINITY;
            let mut pg_min = f64::INFINITY;

            for &i in &order {
                let g = y[i] * (x[i].dot(&w) + w_bias * bias) - 1.0 + diag * alpha[i];
                let pg = if alpha[i] == 0.0 { g.min(0.0) } else { g };

                pg_max = pg_max.max(pg);
                pg_min = pg_min.min(pg);

                if pg != 0.0 {
                    let old = alpha[i];
                    alpha[i] = (old - g / qd[i]).max(0.0);
                    let step = (alpha[i] - old) * y[i];
                    x[i].add_scaled_to(&mut w, step);
                    w_bias += step * bias;
                }
            }

            if pg_max - pg_min <= self.config.tol {
                converged = true;
                break;
            }
        }

        if converged {
            debug!("Class '{class}' converged after {iterations} iterations");
        } else {
            warn!(
                "Class '{class}' did not converge within {} iterations",
                self.config.max_iter
            );
        }

        (w, w_bias * bias)
    }
}

/// A linear multiclass decision function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    classes: Vec<String>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
}

impl LinearModel {
    /// Assemble a model from exported parts, checking that there is one row
    /// and one intercept per class and that every row has `num_features`
    /// columns.
    pub fn from_parts(
        classes: Vec<String>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
        num_features: usize,
    ) -> Result<Self> {
        if coef.len() != classes.len() || intercept.len() != classes.len() {
            return Err(IntentportError::model(format!(
                "{} classes but {} coefficient rows and {} intercepts",
                classes.len(),
                coef.len(),
                intercept.len()
            )));
        }
        if let Some((row, weights)) = coef
            .iter()
            .enumerate()
            .find(|(_, weights)| weights.len() != num_features)
        {
            return Err(IntentportError::model(format!(
                "coefficient row {row} has {} columns, expected {num_features}",
                weights.len()
            )));
        }
        let distinct: BTreeSet<&String> = classes.iter().collect();
        if distinct.len() != classes.len() {
            return Err(IntentportError::model("class labels are not unique"));
        }

        Ok(LinearModel {
            classes,
            coef,
            intercept,
        })
    }

    /// A model without classes, used for degenerate training data.
    pub fn empty() -> Self {
        LinearModel {
            classes: Vec::new(),
            coef: Vec::new(),
            intercept: Vec::new(),
        }
    }

    /// `dot(w_c, x) + b_c` for every class, in class order.
    pub fn decision_function(&self, x: &SparseVector) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(weights, b)| x.dot(weights) + b)
            .collect()
    }

    /// Index of the highest scoring class; ties go to the lowest index.
    pub fn predict_index(&self, x: &SparseVector) -> Option<usize> {
        let scores = self.decision_function(x);
        let mut best: Option<(usize, f64)> = None;
        for (index, score) in scores.into_iter().enumerate() {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((index, score)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Label of the highest scoring class.
    pub fn predict(&self, x: &SparseVector) -> Option<&str> {
        self.predict_index(x).map(|index| self.classes[index].as_str())
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn coef(&self) -> &[Vec<f64>] {
        &self.coef
    }

    pub fn intercept(&self) -> &[f64] {
        &self.intercept
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
