//! End-to-end training run.
//!
//! ```text
//! resources → dataset → normalize → drop rare classes → split → evaluate
//!           → refit on all examples → export → reload and verify
//! ```
//!
//! Too little data is not an error for a run: when fewer than two examples
//! or two classes survive filtering, a complete but empty artifact set is
//! written and the report is flagged as degenerate.

use std::collections::BTreeSet;
use std::path::Path;

use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::analyzer::portuguese::PortugueseAnalyzer;
use crate::config::TrainingConfig;
use crate::dataset::Dataset;
use crate::error::{IntentportError, Result};
use crate::export::artifacts::{SvmArtifact, TfIdfArtifact};
use crate::export::{ArtifactSet, ExportSummary};
use crate::ml::entities::EntityDictionary;
use crate::ml::estimate::NetworkEstimate;
use crate::ml::intent_classifier::PortableIntentModel;
use crate::ml::metrics::{Evaluation, accuracy};
use crate::ml::naive_bayes::MultinomialNb;
use crate::ml::split::{Partition, SplitPlan, SplitPlanner, SplitStrategy, retain_frequent_classes};
use crate::ml::svm::{LinearModel, LinearSvc};
use crate::ml::tfidf::{TfIdfModel, TfIdfVectorizer};
use crate::resources::LanguageResources;

/// Split used for evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitSummary {
    pub plan: SplitPlan,
    pub strategy: SplitStrategy,
    pub n_train: usize,
    pub n_test: usize,
    pub evaluated_on_training_set: bool,
}

/// Everything a training run found out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    /// Examples in the dataset.
    pub n_examples: usize,
    /// Examples left after dropping rare classes.
    pub n_examples_used: usize,
    pub n_classes: usize,
    pub dropped_classes: Vec<String>,
    /// Why empty artifacts were written, if they were.
    pub degenerate: Option<String>,
    pub split: Option<SplitSummary>,
    pub evaluations: Vec<Evaluation>,
    pub vocabulary_size: usize,
    pub entity_types: usize,
    pub entity_values: usize,
    pub network_estimate: NetworkEstimate,
    /// Written files, once exported.
    pub export: Option<ExportSummary>,
    /// The reloaded artifacts reproduced every in-memory prediction.
    pub roundtrip_verified: bool,
}

/// Fitted artifacts plus the report describing how they were produced.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifacts: ArtifactSet,
    pub report: TrainingReport,
    /// Raw texts of the examples the final model was fitted on.
    pub training_texts: Vec<String>,
}

/// Runs training with one configuration.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Trainer { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train from a dataset file and export into `output_dir`.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(&self, dataset_path: P, output_dir: Q) -> Result<TrainingReport> {
        let resources = LanguageResources::load(&self.config.resources)?;
        let dataset = Dataset::from_file(dataset_path)?;

        let outcome = self.train(&dataset, resources)?;
        self.export(outcome, output_dir)
    }

    /// Write the artifacts of `outcome`, reload them and check that they
    /// reproduce the in-memory predictions on the training texts.
    pub fn export<P: AsRef<Path>>(&self, outcome: TrainingOutcome, output_dir: P) -> Result<TrainingReport> {
        let TrainingOutcome {
            artifacts,
            mut report,
            training_texts,
        } = outcome;

        let summary = artifacts.write(output_dir.as_ref())?;
        let in_memory = PortableIntentModel::from_artifacts(&artifacts)?;
        let reloaded = PortableIntentModel::load(output_dir.as_ref())?;

        for text in &training_texts {
            let expected = in_memory.predict_intent(text)?;
            let actual = reloaded.predict_intent(text)?;
            if expected != actual {
                return Err(IntentportError::model(format!(
                    "exported model predicts {actual:?} for {text:?}, trained model predicts {expected:?}"
                )));
            }
        }
        info!(
            "Verified exported model on {} training texts",
            training_texts.len()
        );

        report.export = Some(summary);
        report.roundtrip_verified = true;
        Ok(report)
    }

    /// Fit every model on `dataset` without touching the file system.
    pub fn train(&self, dataset: &Dataset, resources: LanguageResources) -> Result<TrainingOutcome> {
        let analyzer = PortugueseAnalyzer::with_resources(&resources);
        let examples = dataset.examples();
        let entities = EntityDictionary::build(dataset.annotations());

        let (kept, dropped_classes) = retain_frequent_classes(
            &examples.iter().map(|e| e.intent.clone()).collect::<Vec<_>>(),
            self.config.split.min_class_examples,
        );
        if kept.len() < examples.len() {
            info!(
                "Dropped {} examples of classes with fewer than {} examples: {:?}",
                examples.len() - kept.len(),
                self.config.split.min_class_examples,
                dropped_classes
            );
        }

        let corpus = kept
            .par_iter()
            .map(|&index| analyzer.normalize(&examples[index].text))
            .collect::<Result<Vec<_>>>()?;
        let labels: Vec<String> = kept.iter().map(|&i| examples[i].intent.clone()).collect();
        let texts: Vec<String> = kept.iter().map(|&i| examples[i].text.clone()).collect();
        let n_classes = labels.iter().collect::<BTreeSet<_>>().len();

        let mut report = TrainingReport {
            n_examples: examples.len(),
            n_examples_used: kept.len(),
            n_classes,
            dropped_classes,
            degenerate: None,
            split: None,
            evaluations: Vec::new(),
            vocabulary_size: 0,
            entity_types: entities.len(),
            entity_values: entities.num_values(),
            network_estimate: NetworkEstimate::new(0, self.config.estimate.embedding_dim, 0, 0),
            export: None,
            roundtrip_verified: false,
        };

        if let Err(e) = ensure_trainable(kept.len(), n_classes) {
            match e {
                IntentportError::InsufficientData(reason) => {
                    warn!("{reason}, writing empty artifacts");
                    report.degenerate = Some(reason);
                    let artifacts = ArtifactSet {
                        tfidf: TfIdfVectorizer::new(self.config.vectorizer.clone()).fit(&[]),
                        svm: LinearModel::empty(),
                        entities,
                        resources,
                    };
                    return Ok(TrainingOutcome {
                        artifacts,
                        report,
                        training_texts: Vec::new(),
                    });
                }
                other => return Err(other),
            }
        }

        let (plan, partition) = SplitPlanner::new(self.config.split.clone()).split_with_plan(&labels);
        report.split = Some(SplitSummary {
            n_train: partition.train.len(),
            n_test: partition.test.len(),
            strategy: partition.strategy,
            evaluated_on_training_set: partition.evaluated_on_training_set,
            plan,
        });
        report.evaluations = self.evaluate(&corpus, &labels, &partition)?;

        let vectorizer = TfIdfVectorizer::new(self.config.vectorizer.clone());
        let tfidf = vectorizer.fit(&corpus);
        let x = tfidf.transform_batch(&corpus);
        let svm = LinearSvc::new(self.config.svm.clone()).fit(&x, &labels, tfidf.num_features())?;
        info!(
            "Final model: {} classes, {} features, {} examples",
            svm.num_classes(),
            tfidf.num_features(),
            corpus.len()
        );

        report.vocabulary_size = tfidf.num_features();
        report.network_estimate = NetworkEstimate::new(
            tfidf.num_features(),
            self.config.estimate.embedding_dim,
            n_classes,
            corpus.iter().map(Vec::len).max().unwrap_or(0),
        );

        Ok(TrainingOutcome {
            artifacts: ArtifactSet {
                tfidf,
                svm,
                entities,
                resources,
            },
            report,
            training_texts: texts,
        })
    }

    /// Fit on the train partition and score on the test partition. A train
    /// partition with a single class cannot be evaluated and yields nothing.
    fn evaluate(&self, corpus: &[Vec<String>], labels: &[String], partition: &Partition) -> Result<Vec<Evaluation>> {
        let pick = |indices: &[usize]| -> (Vec<Vec<String>>, Vec<String>) {
            indices
                .iter()
                .map(|&i| (corpus[i].clone(), labels[i].clone()))
                .unzip()
        };
        let (train_corpus, train_labels) = pick(&partition.train);
        let (test_corpus, test_labels) = pick(&partition.test);

        let tfidf = TfIdfVectorizer::new(self.config.vectorizer.clone()).fit(&train_corpus);
        let x_train = tfidf.transform_batch(&train_corpus);
        let x_test = tfidf.transform_batch(&test_corpus);

        let svm = match LinearSvc::new(self.config.svm.clone()).fit(&x_train, &train_labels, tfidf.num_features()) {
            Ok(svm) => svm,
            Err(IntentportError::InsufficientData(reason)) => {
                warn!("Skipping evaluation: {reason}");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let predicted: Vec<&str> = x_test.iter().map(|x| svm.predict(x).unwrap_or_default()).collect();
        let mut evaluations = vec![Evaluation {
            model: "linear_svm".to_string(),
            accuracy: accuracy(&test_labels, &predicted),
            n_test: test_labels.len(),
            evaluated_on_training_set: partition.evaluated_on_training_set,
            size_bytes: model_size(&tfidf, &SvmArtifact::from(&svm))?,
        }];

        if self.config.naive_bayes.enabled {
            let nb = MultinomialNb::fit(
                &x_train,
                &train_labels,
                tfidf.num_features(),
                self.config.naive_bayes.alpha,
            )?;
            let predicted: Vec<&str> = x_test.iter().map(|x| nb.predict(x).unwrap_or_default()).collect();
            evaluations.push(Evaluation {
                model: "naive_bayes".to_string(),
                accuracy: accuracy(&test_labels, &predicted),
                n_test: test_labels.len(),
                evaluated_on_training_set: partition.evaluated_on_training_set,
                size_bytes: model_size(&tfidf, &nb)?,
            });
        }

        for evaluation in &evaluations {
            info!(
                "{} accuracy: {:.4} on {} examples{}",
                evaluation.model,
                evaluation.accuracy,
                evaluation.n_test,
                if evaluation.evaluated_on_training_set {
                    " (training set)"
                } else {
                    ""
                }
            );
        }
        Ok(evaluations)
    }
}

/// At least two examples and two classes are needed to fit a classifier.
fn ensure_trainable(n_examples: usize, n_classes: usize) -> Result<()> {
    if n_examples < 2 || n_classes < 2 {
        return Err(IntentportError::insufficient_data(format!(
            "{n_examples} examples in {n_classes} classes after filtering"
        )));
    }
    Ok(())
}

/// Serialized size of a vectorizer plus classifier.
fn model_size<T: Serialize>(tfidf: &TfIdfModel, classifier: &T) -> Result<usize> {
    Ok(serde_json::to_vec(&TfIdfArtifact::from(tfidf))?.len() + serde_json::to_vec(classifier)?.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{EntityAnnotation, IntentRecord};

    fn record(intent: &str, examples: &[&str]) -> IntentRecord {
        IntentRecord {
            intent: intent.to_string(),
            examples: examples.iter().map(|e| e.to_string()).collect(),
            entities: Vec::new(),
        }
    }

    fn dataset() -> Dataset {
        Dataset {
            dataset: vec![
                record(
                    "saudacao",
                    &["olá", "oi, tudo bem?", "bom dia", "boa tarde", "olá, bom dia"],
                ),
                record(
                    "cotacao",
                    &[
                        "quero uma cotação",
                        "quanto custa o plano",
                        "preço do plano de saúde",
                        "cotação de plano familiar",
                        "valores dos planos",
                    ],
                ),
                IntentRecord {
                    entities: vec![EntityAnnotation {
                        entity_type: "plano".to_string(),
                        value: "Ouro".to_string(),
                    }],
                    ..record("despedida", &["tchau"])
                },
            ],
        }
    }

    #[test]
    fn test_train_drops_singleton_class() {
        let trainer = Trainer::default();
        let outcome = trainer.train(&dataset(), LanguageResources::builtin()).unwrap();
        let report = &outcome.report;

        assert_eq!(report.n_examples, 11);
        assert_eq!(report.n_examples_used, 10);
        assert_eq!(report.n_classes, 2);
        assert_eq!(report.dropped_classes, vec!["despedida".to_string()]);
        assert!(report.degenerate.is_none());

        let split = report.split.as_ref().unwrap();
        assert_eq!(split.strategy, SplitStrategy::Stratified);
        assert_eq!(split.n_test, 2);
        assert_eq!(report.evaluations.len(), 2);

        assert_eq!(outcome.artifacts.svm.classes(), &["cotacao", "saudacao"]);
        // Entity dictionaries include annotations of dropped classes.
        assert_eq!(report.entity_types, 1);
        assert_eq!(outcome.training_texts.len(), 10);
    }

    #[test]
    fn test_train_insufficient_data_is_degenerate() {
        let data = Dataset {
            dataset: vec![record("saudacao", &["olá", "oi"]), record("cotacao", &["preço"])],
        };
        let outcome = Trainer::default()
            .train(&data, LanguageResources::builtin())
            .unwrap();

        assert!(outcome.report.degenerate.is_some());
        assert!(outcome.artifacts.tfidf.is_empty());
        assert!(outcome.artifacts.svm.is_empty());
        assert!(outcome.report.evaluations.is_empty());
    }

    #[test]
    fn test_ensure_trainable() {
        assert!(ensure_trainable(2, 2).is_ok());
        assert!(matches!(
            ensure_trainable(1, 2),
            Err(IntentportError::InsufficientData(_))
        ));
        assert!(ensure_trainable(5, 1).is_err());
    }
}
