//! Adaptive train/test split planning.
//!
//! Planning happens in two phases. [`SplitPlanner::plan`] picks a test
//! fraction and decides whether to stratify, recording every adjustment it
//! makes. [`SplitPlanner::split`] then tries the strategies in order
//! (stratified, shuffled, training-set fallback) and uses the first one whose
//! feasibility check passes.
//!
//! # Examples
//!
//! ```
//! use intentport::ml::split::{SplitPlanner, SplitStrategy};
//!
//! let labels: Vec<String> = ["a", "a", "a", "a", "a", "b", "b", "b", "b", "b"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//!
//! let partition = SplitPlanner::default().split(&labels);
//! assert_eq!(partition.strategy, SplitStrategy::Stratified);
//! assert_eq!(partition.test.len(), 2);
//! assert!(!partition.evaluated_on_training_set);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{IntentportError, Result};

/// Split planner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Requested test fraction.
    pub test_fraction: f64,
    /// Above this minimum test fraction stratification is abandoned.
    pub max_stratified_fraction: f64,
    /// Added to the minimum test fraction when it is raised.
    pub fraction_margin: f64,
    /// Test fractions at or above this are reset.
    pub max_test_fraction: f64,
    /// Test fraction used after a reset.
    pub reset_test_fraction: f64,
    /// Classes with fewer examples are dropped before training.
    pub min_class_examples: usize,
    /// Seed for the partition shuffles.
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        SplitConfig {
            test_fraction: 0.2,
            max_stratified_fraction: 0.4,
            fraction_margin: 0.01,
            max_test_fraction: 0.99,
            reset_test_fraction: 0.5,
            min_class_examples: 2,
            seed: 42,
        }
    }
}

impl SplitConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("test_fraction", self.test_fraction),
            ("max_stratified_fraction", self.max_stratified_fraction),
            ("max_test_fraction", self.max_test_fraction),
            ("reset_test_fraction", self.reset_test_fraction),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(IntentportError::invalid_config(format!(
                    "split.{name} must be in (0, 1), got {value}"
                )));
            }
        }
        if !(self.fraction_margin >= 0.0 && self.fraction_margin < 1.0) {
            return Err(IntentportError::invalid_config(format!(
                "split.fraction_margin must be in [0, 1), got {}",
                self.fraction_margin
            )));
        }
        if self.min_class_examples == 0 {
            return Err(IntentportError::invalid_config(
                "split.min_class_examples must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Test fraction and stratification decision for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitPlan {
    pub test_fraction: f64,
    pub stratify: bool,
    /// Human readable record of every change to the requested plan.
    pub adjustments: Vec<String>,
}

impl SplitPlan {
    pub fn train_fraction(&self) -> f64 {
        1.0 - self.test_fraction
    }
}

/// How a partition was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStrategy {
    /// Every class is represented in both partitions.
    Stratified,
    /// Uniform random partition.
    Shuffled,
    /// Train and test are both the full dataset.
    TrainingSetFallback,
}

impl fmt::Display for SplitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SplitStrategy::Stratified => "stratified",
            SplitStrategy::Shuffled => "shuffled",
            SplitStrategy::TrainingSetFallback => "training_set_fallback",
        };
        f.write_str(name)
    }
}

/// Example indices of the train and test partitions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
    pub strategy: SplitStrategy,
    /// The test partition is the training data, so accuracy is optimistic.
    pub evaluated_on_training_set: bool,
}

/// Class membership of a labeled dataset.
struct SplitContext<'a> {
    n_examples: usize,
    n_test: usize,
    groups: BTreeMap<&'a str, Vec<usize>>,
}

impl<'a> SplitContext<'a> {
    fn new(labels: &'a [String], test_fraction: f64) -> Self {
        let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (index, label) in labels.iter().enumerate() {
            groups.entry(label.as_str()).or_default().push(index);
        }

        SplitContext {
            n_examples: labels.len(),
            n_test: test_size(labels.len(), test_fraction),
            groups,
        }
    }

    fn n_train(&self) -> usize {
        self.n_examples - self.n_test
    }

    fn n_classes(&self) -> usize {
        self.groups.len()
    }
}

/// `ceil(test_fraction * n)`, ignoring floating point noise in the product.
fn test_size(n: usize, test_fraction: f64) -> usize {
    let size = (test_fraction * n as f64 - 1e-9).ceil();
    (size.max(0.0) as usize).min(n)
}

impl SplitStrategy {
    fn check_feasible(&self, ctx: &SplitContext<'_>) -> Result<()> {
        match self {
            SplitStrategy::Stratified => {
                if let Some((class, members)) = ctx.groups.iter().find(|(_, m)| m.len() < 2) {
                    return Err(IntentportError::split_infeasible(format!(
                        "class '{class}' has {} example(s), stratification needs 2",
                        members.len()
                    )));
                }
                if ctx.n_test < ctx.n_classes() || ctx.n_train() < ctx.n_classes() {
                    return Err(IntentportError::split_infeasible(format!(
                        "{} test and {} train examples cannot hold {} classes each",
                        ctx.n_test,
                        ctx.n_train(),
                        ctx.n_classes()
                    )));
                }
                Ok(())
            }
            SplitStrategy::Shuffled => {
                if ctx.n_test == 0 || ctx.n_train() == 0 {
                    return Err(IntentportError::split_infeasible(format!(
                        "{} test and {} train examples leave a partition empty",
                        ctx.n_test,
                        ctx.n_train()
                    )));
                }
                Ok(())
            }
            SplitStrategy::TrainingSetFallback => Ok(()),
        }
    }

    fn partition(&self, ctx: &SplitContext<'_>, rng: &mut StdRng) -> Partition {
        let (mut train, mut test) = match self {
            SplitStrategy::Stratified => stratified(ctx, rng),
            SplitStrategy::Shuffled => {
                let mut indices: Vec<usize> = (0..ctx.n_examples).collect();
                indices.shuffle(rng);
                let train = indices.split_off(ctx.n_test);
                (train, indices)
            }
            SplitStrategy::TrainingSetFallback => {
                let all: Vec<usize> = (0..ctx.n_examples).collect();
                (all.clone(), all)
            }
        };
        train.sort_unstable();
        test.sort_unstable();

        Partition {
            train,
            test,
            strategy: *self,
            evaluated_on_training_set: *self == SplitStrategy::TrainingSetFallback,
        }
    }
}

/// One test example per class, the rest by largest remainder, always
/// leaving at least one training example per class.
fn stratified(ctx: &SplitContext<'_>, rng: &mut StdRng) -> (Vec<usize>, Vec<usize>) {
    let n = ctx.n_examples as f64;
    let groups: Vec<Vec<usize>> = ctx
        .groups
        .values()
        .map(|members| {
            let mut members = members.clone();
            members.shuffle(rng);
            members
        })
        .collect();

    let mut allocation = vec![1usize; groups.len()];
    let mut remaining = ctx.n_test - groups.len();
    let capacity = |class: usize, allocated: usize| groups[class].len() - 1 - allocated;

    let mut fractions: Vec<(usize, f64)> = Vec::with_capacity(groups.len());
    for (class, members) in groups.iter().enumerate() {
        let extra = (ctx.n_test as f64 * members.len() as f64 / n - 1.0).max(0.0);
        let whole = (extra.floor() as usize)
            .min(capacity(class, allocation[class]))
            .min(remaining);
        allocation[class] += whole;
        remaining -= whole;
        fractions.push((class, extra - extra.floor()));
    }
    fractions.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    while remaining > 0 {
        let mut progressed = false;
        for &(class, _) in &fractions {
            if remaining == 0 {
                break;
            }
            if capacity(class, allocation[class]) > 0 {
                allocation[class] += 1;
                remaining -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    let mut train = Vec::with_capacity(ctx.n_train());
    let mut test = Vec::with_capacity(ctx.n_test);
    for (members, &take) in groups.iter().zip(&allocation) {
        test.extend_from_slice(&members[..take]);
        train.extend_from_slice(&members[take..]);
    }
    (train, test)
}

/// Indices of examples whose class has at least `min_count` examples, and
/// the names of the dropped classes.
pub fn retain_frequent_classes(labels: &[String], min_count: usize) -> (Vec<usize>, Vec<String>) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label.as_str()).or_insert(0) += 1;
    }

    let kept = labels
        .iter()
        .enumerate()
        .filter(|(_, label)| counts[label.as_str()] >= min_count)
        .map(|(index, _)| index)
        .collect();
    let dropped = counts
        .into_iter()
        .filter(|&(_, count)| count < min_count)
        .map(|(label, _)| label.to_string())
        .collect();
    (kept, dropped)
}

/// Plans and executes train/test splits.
#[derive(Debug, Clone, Default)]
pub struct SplitPlanner {
    config: SplitConfig,
}

impl SplitPlanner {
    pub fn new(config: SplitConfig) -> Self {
        SplitPlanner { config }
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Choose the test fraction and stratification for `n_examples`
    /// examples spread over `n_classes` classes.
    pub fn plan(&self, n_examples: usize, n_classes: usize) -> SplitPlan {
        let config = &self.config;
        let mut test_fraction = config.test_fraction;
        let mut stratify = true;
        let mut adjustments = Vec::new();

        let min_fraction = if n_examples == 0 {
            1.0
        } else {
            n_classes as f64 / n_examples as f64
        };

        if min_fraction > test_fraction && min_fraction < 1.0 {
            if min_fraction > config.max_stratified_fraction {
                stratify = false;
                adjustments.push(format!(
                    "minimum test fraction {min_fraction:.4} exceeds {}, stratification disabled",
                    config.max_stratified_fraction
                ));
            } else {
                test_fraction = min_fraction + config.fraction_margin;
                adjustments.push(format!(
                    "test fraction raised to {test_fraction:.4} so every class can be tested"
                ));
            }
        }

        if stratify && (n_examples as f64) * test_fraction < n_classes as f64 {
            stratify = false;
            adjustments.push(format!(
                "{n_examples} examples at test fraction {test_fraction:.4} cannot cover {n_classes} classes, stratification disabled"
            ));
        }

        if test_fraction >= config.max_test_fraction {
            test_fraction = config.reset_test_fraction;
            stratify = false;
            adjustments.push(format!(
                "test fraction reset to {test_fraction}, stratification disabled"
            ));
        }

        SplitPlan {
            test_fraction,
            stratify,
            adjustments,
        }
    }

    /// Plan and partition a labeled dataset. Never fails: when no proper
    /// split exists the training-set fallback is used.
    pub fn split(&self, labels: &[String]) -> Partition {
        self.split_with_plan(labels).1
    }

    /// Like [`split`](Self::split), also returning the plan that was used.
    pub fn split_with_plan(&self, labels: &[String]) -> (SplitPlan, Partition) {
        let n_classes = labels
            .iter()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .len();
        let plan = self.plan(labels.len(), n_classes);
        for adjustment in &plan.adjustments {
            info!("Split plan: {adjustment}");
        }

        let ctx = SplitContext::new(labels, plan.test_fraction);
        // Training-set evaluation is always feasible and only used when
        // nothing else is.
        let candidates: &[SplitStrategy] = if plan.stratify {
            &[SplitStrategy::Stratified, SplitStrategy::Shuffled]
        } else {
            &[SplitStrategy::Shuffled]
        };
        let strategy = candidates
            .iter()
            .copied()
            .find(|strategy| match strategy.check_feasible(&ctx) {
                Ok(()) => true,
                Err(e) => {
                    info!("Skipping {strategy} split: {e}");
                    false
                }
            })
            .unwrap_or(SplitStrategy::TrainingSetFallback);

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let partition = strategy.partition(&ctx, &mut rng);
        debug!(
            "{strategy} split: {} train, {} test",
            partition.train.len(),
            partition.test.len()
        );
        if partition.evaluated_on_training_set {
            warn!("No valid split available, evaluating on the training set");
        }
        (plan, partition)
    }
}
