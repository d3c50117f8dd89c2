//! On-disk layouts of the individual artifact files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::token_filter::stem::RslpRules;
use crate::error::{IntentportError, Result};
use crate::ml::svm::LinearModel;
use crate::ml::tfidf::{Norm, TfIdfConfig, TfIdfModel};
use crate::resources::LanguageResources;

/// `tfidf_model.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfIdfArtifact {
    pub vocabulary_: BTreeMap<String, usize>,
    pub idf_: Vec<f64>,
    pub ngram_range: (usize, usize),
    pub lowercase: bool,
    /// Always null: stop words are removed during preprocessing.
    pub stop_words: Option<Vec<String>>,
    pub use_idf: bool,
    pub smooth_idf: bool,
    pub sublinear_tf: bool,
    /// "l2" or null.
    pub norm: Option<String>,
}

impl From<&TfIdfModel> for TfIdfArtifact {
    fn from(model: &TfIdfModel) -> Self {
        let config = model.config();
        TfIdfArtifact {
            vocabulary_: model.vocabulary().clone(),
            idf_: model.idf().to_vec(),
            ngram_range: config.ngram_range,
            lowercase: true,
            stop_words: None,
            use_idf: true,
            smooth_idf: true,
            sublinear_tf: config.sublinear_tf,
            norm: match config.norm {
                Norm::L2 => Some("l2".to_string()),
                Norm::None => None,
            },
        }
    }
}

impl TfIdfArtifact {
    pub fn into_model(self) -> Result<TfIdfModel> {
        if !self.use_idf || !self.smooth_idf {
            return Err(IntentportError::model(
                "only smoothed idf weighting is supported",
            ));
        }
        if self.stop_words.as_ref().is_some_and(|words| !words.is_empty()) {
            return Err(IntentportError::model(
                "vectorizer stop words are not supported, stop words belong to preprocessing",
            ));
        }
        let norm = match self.norm.as_deref() {
            Some("l2") => Norm::L2,
            None => Norm::None,
            Some(other) => {
                return Err(IntentportError::model(format!("unsupported norm '{other}'")));
            }
        };

        TfIdfModel::from_parts(
            self.vocabulary_,
            self.idf_,
            TfIdfConfig {
                ngram_range: self.ngram_range,
                sublinear_tf: self.sublinear_tf,
                norm,
            },
        )
    }
}

/// `svm_model.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmArtifact {
    pub classes_: Vec<String>,
    pub coef_: Vec<Vec<f64>>,
    pub intercept_: Vec<f64>,
}

impl From<&LinearModel> for SvmArtifact {
    fn from(model: &LinearModel) -> Self {
        SvmArtifact {
            classes_: model.classes().to_vec(),
            coef_: model.coef().to_vec(),
            intercept_: model.intercept().to_vec(),
        }
    }
}

impl SvmArtifact {
    pub fn into_model(self, num_features: usize) -> Result<LinearModel> {
        LinearModel::from_parts(self.classes_, self.coef_, self.intercept_, num_features)
    }
}

/// Stemmer section of `preprocessing.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StemmerArtifact {
    pub algorithm: String,
    pub rules: RslpRules,
}

/// `preprocessing.json`: everything needed to turn raw text into tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingArtifact {
    pub language: String,
    pub lowercase: bool,
    /// Characters removed before tokenization.
    pub punctuation: String,
    pub tokenizer: String,
    pub stop_words_file: String,
    pub stemmer: StemmerArtifact,
}

pub const TOKENIZER_NAME: &str = "unicode_word";
pub const STEMMER_NAME: &str = "rslp";

impl PreprocessingArtifact {
    pub fn new(resources: &LanguageResources, stop_words_file: &str) -> Self {
        PreprocessingArtifact {
            language: crate::config::PORTUGUESE.to_string(),
            lowercase: true,
            punctuation: resources.punctuation().to_string(),
            tokenizer: TOKENIZER_NAME.to_string(),
            stop_words_file: stop_words_file.to_string(),
            stemmer: StemmerArtifact {
                algorithm: STEMMER_NAME.to_string(),
                rules: resources.stemmer_rules().clone(),
            },
        }
    }

    /// Rebuild language resources using `stop_words` from the stop word file.
    pub fn into_resources(self, stop_words: Vec<String>) -> Result<LanguageResources> {
        if self.language != crate::config::PORTUGUESE {
            return Err(IntentportError::model(format!(
                "unsupported preprocessing language '{}'",
                self.language
            )));
        }
        if !self.lowercase {
            return Err(IntentportError::model("preprocessing must lowercase text"));
        }
        if self.tokenizer != TOKENIZER_NAME {
            return Err(IntentportError::model(format!(
                "unsupported tokenizer '{}'",
                self.tokenizer
            )));
        }
        if self.stemmer.algorithm != STEMMER_NAME {
            return Err(IntentportError::model(format!(
                "unsupported stemmer '{}'",
                self.stemmer.algorithm
            )));
        }
        self.stemmer
            .rules
            .validate()
            .map_err(|e| IntentportError::model(e.to_string()))?;

        Ok(LanguageResources::new(stop_words, self.stemmer.rules).with_punctuation(self.punctuation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::tfidf::TfIdfVectorizer;

    #[test]
    fn test_tfidf_artifact_field_names() {
        let corpus = vec![vec!["ola".to_string()], vec!["bom".to_string(), "dia".to_string()]];
        let model = TfIdfVectorizer::default().fit(&corpus);
        let json = serde_json::to_value(TfIdfArtifact::from(&model)).unwrap();

        assert_eq!(json["ngram_range"], serde_json::json!([1, 2]));
        assert_eq!(json["norm"], "l2");
        assert!(json["stop_words"].is_null());
        assert_eq!(json["vocabulary_"]["bom dia"], 1);
        assert_eq!(json["idf_"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_tfidf_artifact_rejects_unsupported() {
        let corpus = vec![vec!["ola".to_string()]];
        let model = TfIdfVectorizer::default().fit(&corpus);

        let mut artifact = TfIdfArtifact::from(&model);
        artifact.norm = Some("l1".to_string());
        assert!(artifact.into_model().is_err());

        let mut artifact = TfIdfArtifact::from(&model);
        artifact.use_idf = false;
        assert!(artifact.into_model().is_err());

        let artifact = TfIdfArtifact::from(&model);
        assert_eq!(artifact.into_model().unwrap(), model);
    }

    #[test]
    fn test_preprocessing_roundtrip() {
        let resources = LanguageResources::builtin();
        let artifact = PreprocessingArtifact::new(&resources, "portuguese_stopwords.json");
        let json = serde_json::to_string(&artifact).unwrap();
        let parsed: PreprocessingArtifact = serde_json::from_str(&json).unwrap();

        let rebuilt = parsed
            .into_resources(resources.stop_words().to_vec())
            .unwrap();
        assert_eq!(rebuilt, resources);
    }

    #[test]
    fn test_preprocessing_rejects_unknown_stemmer() {
        let mut artifact =
            PreprocessingArtifact::new(&LanguageResources::builtin(), "portuguese_stopwords.json");
        artifact.stemmer.algorithm = "porter".to_string();
        assert!(artifact.into_resources(Vec::new()).is_err());
    }
}
