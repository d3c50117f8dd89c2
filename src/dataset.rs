//! Labeled intent dataset.
//!
//! ```json
//! {"dataset": [
//!   {"intent": "cotacao",
//!    "examples": ["quero uma cotação"],
//!    "entities": [{"entity_type": "plano", "value": "Ouro"}]}
//! ]}
//! ```
//!
//! The Portuguese field names `intencao`, `exemplos_usuario`, `entidades`,
//! `tipo_entidade` and `valor_entidade` are accepted as well. Unknown fields
//! are ignored.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{IntentportError, Result};

/// A whole dataset file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub dataset: Vec<IntentRecord>,
}

/// One intent with its example utterances and entity annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRecord {
    #[serde(alias = "intencao")]
    pub intent: String,
    #[serde(alias = "exemplos_usuario")]
    pub examples: Vec<String>,
    #[serde(default, alias = "entidades", deserialize_with = "null_as_empty")]
    pub entities: Vec<EntityAnnotation>,
}

/// An entity mentioned by the examples of an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAnnotation {
    #[serde(alias = "tipo_entidade", alias = "type")]
    pub entity_type: String,
    #[serde(alias = "valor_entidade")]
    pub value: String,
}

/// `null` entity lists read as empty.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<EntityAnnotation>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<EntityAnnotation>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single labeled utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub text: String,
    pub intent: String,
    pub entities: Vec<EntityAnnotation>,
}

impl Dataset {
    /// Parse a dataset from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a dataset file. A missing file is `DatasetNotFound`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(IntentportError::DatasetNotFound(path.to_path_buf()));
        }

        let dataset = Self::from_json(&fs::read_to_string(path)?)?;
        info!(
            "Loaded {} intents with {} examples from {}",
            dataset.dataset.len(),
            dataset.num_examples(),
            path.display()
        );
        Ok(dataset)
    }

    /// Flatten into one example per utterance, in file order.
    pub fn examples(&self) -> Vec<Example> {
        self.dataset
            .iter()
            .flat_map(|record| {
                record.examples.iter().map(|text| Example {
                    text: text.clone(),
                    intent: record.intent.clone(),
                    entities: record.entities.clone(),
                })
            })
            .collect()
    }

    /// Every entity annotation in the file.
    pub fn annotations(&self) -> impl Iterator<Item = &EntityAnnotation> {
        self.dataset.iter().flat_map(|record| record.entities.iter())
    }

    pub fn num_examples(&self) -> usize {
        self.dataset.iter().map(|record| record.examples.len()).sum()
    }
}
