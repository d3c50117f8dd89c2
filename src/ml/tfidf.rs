//! TF-IDF feature space over word n-grams.
//!
//! [`TfIdfVectorizer::fit`] builds the vocabulary and IDF weights from a
//! tokenized corpus and returns an immutable [`TfIdfModel`], which maps token
//! sequences to sparse feature vectors.
//!
//! * n-grams for every `n` in `ngram_range`, tokens joined by one space
//! * vocabulary indices assigned in lexicographic order of the n-gram
//! * `idf = ln((1 + N) / (1 + df)) + 1`
//! * `weight = tf * idf`, then L2 normalization

use std::collections::BTreeMap;

use ahash::{AHashMap, AHashSet};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{IntentportError, Result};
use crate::ml::sparse::SparseVector;

/// Output vector normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    /// Scale to unit Euclidean length.
    #[default]
    L2,
    /// Leave weights as `tf * idf`.
    None,
}

/// Vectorizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfIdfConfig {
    /// Inclusive range of n-gram lengths.
    pub ngram_range: (usize, usize),
    /// Use `1 + ln(tf)` instead of the raw count.
    pub sublinear_tf: bool,
    /// Output normalization.
    pub norm: Norm,
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        TfIdfConfig {
            ngram_range: (1, 2),
            sublinear_tf: false,
            norm: Norm::L2,
        }
    }
}

impl TfIdfConfig {
    pub fn validate(&self) -> Result<()> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(IntentportError::invalid_config(format!(
                "ngram_range must satisfy 1 <= min <= max, got ({min_n}, {max_n})"
            )));
        }
        Ok(())
    }
}

/// Every n-gram of `tokens` with length in `ngram_range`, shortest first.
pub fn ngrams(tokens: &[String], ngram_range: (usize, usize)) -> Vec<String> {
    let (min_n, max_n) = ngram_range;
    let mut grams = Vec::new();
    for n in min_n.max(1)..=max_n {
        if n > tokens.len() {
            break;
        }
        grams.extend(tokens.windows(n).map(|window| window.join(" ")));
    }
    grams
}

/// Learns a [`TfIdfModel`] from a tokenized corpus.
#[derive(Debug, Clone, Default)]
pub struct TfIdfVectorizer {
    config: TfIdfConfig,
}

impl TfIdfVectorizer {
    pub fn new(config: TfIdfConfig) -> Self {
        TfIdfVectorizer { config }
    }

    /// Fit vocabulary and IDF weights on `corpus` (one token list per document).
    pub fn fit(&self, corpus: &[Vec<String>]) -> TfIdfModel {
        let n_documents = corpus.len();
        let mut document_frequency: AHashMap<String, usize> = AHashMap::new();

        for tokens in corpus {
            let unique: AHashSet<String> = ngrams(tokens, self.config.ngram_range)
                .into_iter()
                .collect();
            for gram in unique {
                *document_frequency.entry(gram).or_insert(0) += 1;
            }
        }

        let sorted: BTreeMap<String, usize> = document_frequency.into_iter().collect();
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(sorted.len());
        for (index, (gram, df)) in sorted.into_iter().enumerate() {
            idf.push(((1.0 + n_documents as f64) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(gram, index);
        }

        debug!(
            "Fitted TF-IDF on {} documents: {} features",
            n_documents,
            vocabulary.len()
        );

        TfIdfModel {
            vocabulary,
            idf,
            config: self.config.clone(),
        }
    }
}

/// A fitted, immutable TF-IDF feature space.
#[derive(Debug, Clone, PartialEq)]
pub struct TfIdfModel {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    config: TfIdfConfig,
}

impl TfIdfModel {
    /// Assemble a model from exported parts, checking that the vocabulary is
    /// a bijection onto `0..idf.len()` and every weight is positive.
    pub fn from_parts(
        vocabulary: BTreeMap<String, usize>,
        idf: Vec<f64>,
        config: TfIdfConfig,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| IntentportError::model(e.to_string()))?;

        if vocabulary.len() != idf.len() {
            return Err(IntentportError::model(format!(
                "vocabulary has {} entries but idf has {}",
                vocabulary.len(),
                idf.len()
            )));
        }

        let mut seen = vec![false; idf.len()];
        for (gram, &index) in &vocabulary {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(IntentportError::model(format!(
                        "vocabulary index {index} is assigned twice (at '{gram}')"
                    )));
                }
                None => {
                    return Err(IntentportError::model(format!(
                        "vocabulary index {index} of '{gram}' is out of range"
                    )));
                }
            }
        }

        if let Some(bad) = idf.iter().find(|w| !w.is_finite() || **w <= 0.0) {
            return Err(IntentportError::model(format!(
                "idf weights must be positive, found {bad}"
            )));
        }

        Ok(TfIdfModel {
            vocabulary,
            idf,
            config,
        })
    }

    /// Map a token sequence to its feature vector. Out-of-vocabulary n-grams
    /// are ignored, so the result may be all zero.
    pub fn transform(&self, tokens: &[String]) -> SparseVector {
        let mut counts: AHashMap<usize, f64> = AHashMap::new();
        for gram in ngrams(tokens, self.config.ngram_range) {
            if let Some(&index) = self.vocabulary.get(&gram) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let pairs = counts
            .into_iter()
            .map(|(index, tf)| {
                let tf = if self.config.sublinear_tf {
                    1.0 + tf.ln()
                } else {
                    tf
                };
                (index, tf * self.idf[index])
            })
            .collect();

        let mut vector = SparseVector::from_pairs(pairs);
        if self.config.norm == Norm::L2 {
            vector.normalize_l2();
        }
        vector
    }

    /// Transform every document of a corpus.
    pub fn transform_batch(&self, corpus: &[Vec<String>]) -> Vec<SparseVector> {
        corpus.par_iter().map(|tokens| self.transform(tokens)).collect()
    }

    /// n-gram to column index.
    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    /// IDF weight per column.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn config(&self) -> &TfIdfConfig {
        &self.config
    }

    /// Number of feature columns.
    pub fn num_features(&self) -> usize {
        self.idf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idf.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_ngrams() {
        let grams = ngrams(&tokens(&["bom", "dia", "ola"]), (1, 2));
        assert_eq!(grams, vec!["bom", "dia", "ola", "bom dia", "dia ola"]);
        assert!(ngrams(&[], (1, 2)).is_empty());
        assert_eq!(ngrams(&tokens(&["oi"]), (1, 3)), vec!["oi"]);
    }

    #[test]
    fn test_fit_vocabulary_is_lexicographic() {
        let corpus = vec![tokens(&["quer", "plan"]), tokens(&["cot", "plan"])];
        let model = TfIdfVectorizer::default().fit(&corpus);

        let grams: Vec<(&str, usize)> = model
            .vocabulary()
            .iter()
            .map(|(g, &i)| (g.as_str(), i))
            .collect();
        assert_eq!(
            grams,
            vec![
                ("cot", 0),
                ("cot plan", 1),
                ("plan", 2),
                ("quer", 3),
                ("quer plan", 4)
            ]
        );
        assert_eq!(model.idf().len(), model.vocabulary().len());

        // "plan" appears in both documents.
        assert_eq!(model.idf()[2], 1.0);
        assert!((model.idf()[0] - ((3.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
        assert!(model.idf().iter().all(|&w| w > 0.0));
    }

    #[test]
    fn test_transform_known_weights() {
        let mut vocabulary = BTreeMap::new();
        vocabulary.insert("ola".to_string(), 0);
        vocabulary.insert("bom dia".to_string(), 1);

        let raw = TfIdfModel::from_parts(
            vocabulary.clone(),
            vec![1.5, 2.0],
            TfIdfConfig {
                norm: Norm::None,
                ..TfIdfConfig::default()
            },
        )
        .unwrap();
        let v = raw.transform(&tokens(&["ola", "ola"]));
        assert_eq!(v.to_dense(2), vec![3.0, 0.0]);

        let normalized =
            TfIdfModel::from_parts(vocabulary, vec![1.5, 2.0], TfIdfConfig::default()).unwrap();
        let v = normalized.transform(&tokens(&["ola", "ola"]));
        assert_eq!(v.to_dense(2), vec![1.0, 0.0]);
    }

    #[test]
    fn test_transform_unit_norm_and_oov() {
        let corpus = vec![tokens(&["quer", "plan"]), tokens(&["cot", "plan"])];
        let model = TfIdfVectorizer::default().fit(&corpus);

        let v = model.transform(&tokens(&["quer", "cot", "plan"]));
        assert!((v.norm() - 1.0).abs() < 1e-12);

        let empty = model.transform(&tokens(&["desconhecido"]));
        assert!(empty.is_empty());
    }

    #[test]
    fn test_sublinear_tf() {
        let mut vocabulary = BTreeMap::new();
        vocabulary.insert("ola".to_string(), 0);
        let model = TfIdfModel::from_parts(
            vocabulary,
            vec![2.0],
            TfIdfConfig {
                ngram_range: (1, 1),
                sublinear_tf: true,
                norm: Norm::None,
            },
        )
        .unwrap();

        let v = model.transform(&tokens(&["ola", "ola"]));
        assert!((v.get(0) - 2.0 * (1.0 + 2.0f64.ln())).abs() < 1e-12);
    }

    #[test]
    fn test_from_parts_rejects_bad_shapes() {
        let mut vocabulary = BTreeMap::new();
        vocabulary.insert("a".to_string(), 0);
        vocabulary.insert("b".to_string(), 0);
        assert!(
            TfIdfModel::from_parts(vocabulary.clone(), vec![1.0], TfIdfConfig::default())
                .is_err()
        );
        assert!(
            TfIdfModel::from_parts(vocabulary, vec![1.0, 1.0], TfIdfConfig::default()).is_err()
        );

        let mut vocabulary = BTreeMap::new();
        vocabulary.insert("a".to_string(), 5);
        assert!(TfIdfModel::from_parts(vocabulary, vec![1.0], TfIdfConfig::default()).is_err());

        let mut vocabulary = BTreeMap::new();
        vocabulary.insert("a".to_string(), 0);
        assert!(TfIdfModel::from_parts(vocabulary, vec![0.0], TfIdfConfig::default()).is_err());
    }

    #[test]
    fn test_empty_corpus() {
        let model = TfIdfVectorizer::default().fit(&[]);
        assert!(model.is_empty());
        assert!(model.transform(&tokens(&["ola"])).is_empty());
    }
}
