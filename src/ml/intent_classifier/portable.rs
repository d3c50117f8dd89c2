//! Intent model reconstructed from an artifact directory.
//!
//! Nothing from training is reused: the analyzer, feature space, decision
//! function and entity extractor are all rebuilt from the exported files,
//! which makes this the reference consumer of the export format.

use std::path::Path;

use log::debug;

use crate::analysis::analyzer::portuguese::PortugueseAnalyzer;
use crate::error::Result;
use crate::export::ArtifactSet;
use crate::ml::entities::{EntityExtractor, ExtractedEntity};
use crate::ml::intent_classifier::classifier::IntentClassifier;
use crate::ml::intent_classifier::types::{ClassScore, IntentPrediction};
use crate::ml::sparse::SparseVector;
use crate::ml::svm::LinearModel;
use crate::ml::tfidf::TfIdfModel;

#[derive(Debug, Clone)]
pub struct PortableIntentModel {
    analyzer: PortugueseAnalyzer,
    tfidf: TfIdfModel,
    svm: LinearModel,
    extractor: EntityExtractor,
}

impl PortableIntentModel {
    pub fn from_artifacts(artifacts: &ArtifactSet) -> Result<Self> {
        Ok(PortableIntentModel {
            analyzer: PortugueseAnalyzer::with_resources(&artifacts.resources),
            tfidf: artifacts.tfidf.clone(),
            svm: artifacts.svm.clone(),
            extractor: EntityExtractor::new(&artifacts.entities)?,
        })
    }

    /// Load and validate an artifact directory.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::from_artifacts(&ArtifactSet::load(dir)?)
    }

    /// Normalized tokens of `text`.
    pub fn tokens(&self, text: &str) -> Result<Vec<String>> {
        self.analyzer.normalize(text)
    }

    /// Feature vector of `text`.
    pub fn features(&self, text: &str) -> Result<SparseVector> {
        Ok(self.tfidf.transform(&self.tokens(text)?))
    }

    /// Predicted intent of `text` only, without scores or entities.
    pub fn predict_intent(&self, text: &str) -> Result<Option<String>> {
        let features = self.features(text)?;
        Ok(self.svm.predict(&features).map(str::to_string))
    }

    pub fn extract_entities(&self, text: &str) -> Vec<ExtractedEntity> {
        self.extractor.extract(text)
    }

    pub fn classes(&self) -> &[String] {
        self.svm.classes()
    }
}

impl IntentClassifier for PortableIntentModel {
    fn predict(&self, text: &str) -> Result<IntentPrediction> {
        let tokens = self.tokens(text)?;
        let features = self.tfidf.transform(&tokens);
        let intent = self.svm.predict(&features).map(str::to_string);
        debug!("{text:?} -> {tokens:?} -> {intent:?}");

        let scores = self
            .svm
            .classes()
            .iter()
            .zip(self.svm.decision_function(&features))
            .map(|(intent, score)| ClassScore {
                intent: intent.clone(),
                score,
            })
            .collect();

        Ok(IntentPrediction {
            intent,
            scores,
            tokens,
            entities: self.extractor.extract(text),
        })
    }

    fn name(&self) -> &str {
        "portable_linear_svm"
    }
}
