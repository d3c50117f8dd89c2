//! Entity dictionaries and runtime entity extraction.
//!
//! Training turns the entity annotations of a dataset into an
//! [`EntityDictionary`]: entity type to sorted, deduplicated, lowercase
//! values. At runtime an [`EntityExtractor`] finds dictionary values in raw
//! text and adds the pattern entities `idade` (age) and `email`.
//!
//! # Examples
//!
//! ```
//! use intentport::dataset::EntityAnnotation;
//! use intentport::ml::entities::{EntityDictionary, EntityExtractor};
//!
//! let annotations = vec![
//!     EntityAnnotation { entity_type: "plano".into(), value: "Ouro".into() },
//!     EntityAnnotation { entity_type: "plano".into(), value: "prata".into() },
//! ];
//! let dictionary = EntityDictionary::build(&annotations);
//! assert_eq!(dictionary.values("plano").unwrap().as_slice(), ["ouro", "prata"]);
//!
//! let extractor = EntityExtractor::new(&dictionary).unwrap();
//! let found = extractor.extract("Quero o plano OURO, tenho 34 anos");
//! assert_eq!(found[0].value, "ouro");
//! assert_eq!(found[1].entity_type, "idade");
//! assert_eq!(found[1].value, "34");
//! ```

use std::collections::{BTreeMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::dataset::EntityAnnotation;
use crate::error::Result;

/// Entity type produced by the age pattern.
pub const AGE_ENTITY: &str = "idade";
/// Entity type produced by the email pattern.
pub const EMAIL_ENTITY: &str = "email";

const AGE_PATTERN: &str = r"(?i)\b(\d{1,2})\s*(anos)?\b";
const EMAIL_PATTERN: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";

/// A sorted sequence of distinct strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SortedValues(Vec<String>);

impl SortedValues {
    /// Sort and deduplicate `values`.
    pub fn from_unsorted(mut values: Vec<String>) -> Self {
        values.sort();
        values.dedup();
        SortedValues(values)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.binary_search_by(|v| v.as_str().cmp(value)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for SortedValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<String>::deserialize(deserializer).map(SortedValues::from_unsorted)
    }
}

/// Entity type to known values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityDictionary {
    entries: BTreeMap<String, SortedValues>,
}

impl EntityDictionary {
    /// Collect the lowercase values of every annotation, grouped by type.
    /// Annotations with a blank value are skipped.
    pub fn build<'a, I>(annotations: I) -> Self
    where
        I: IntoIterator<Item = &'a EntityAnnotation>,
    {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for annotation in annotations {
            if annotation.value.trim().is_empty() {
                continue;
            }
            let value = annotation.value.to_lowercase();
            grouped
                .entry(annotation.entity_type.clone())
                .or_default()
                .push(value);
        }

        EntityDictionary {
            entries: grouped
                .into_iter()
                .map(|(entity_type, values)| (entity_type, SortedValues::from_unsorted(values)))
                .collect(),
        }
    }

    pub fn values(&self, entity_type: &str) -> Option<&SortedValues> {
        self.entries.get(entity_type)
    }

    /// Entity types with their values, in type order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SortedValues)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), v))
    }

    /// Number of entity types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of values across all types.
    pub fn num_values(&self) -> usize {
        self.entries.values().map(SortedValues::len).sum()
    }
}

/// An entity found in a text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedEntity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub value: String,
    /// The matched text.
    pub raw_match: String,
}

/// Finds dictionary and pattern entities in raw text.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    dictionary: Vec<(String, String, Regex)>,
    age: Regex,
    email: Regex,
}

impl EntityExtractor {
    /// Compile one whole-word matcher per dictionary value.
    pub fn new(dictionary: &EntityDictionary) -> Result<Self> {
        let mut matchers = Vec::with_capacity(dictionary.num_values());
        for (entity_type, values) in dictionary.iter() {
            for value in values.as_slice() {
                let pattern = format!(r"\b{}\b", regex::escape(&value.to_lowercase()));
                matchers.push((entity_type.to_string(), value.clone(), Regex::new(&pattern)?));
            }
        }

        Ok(EntityExtractor {
            dictionary: matchers,
            age: Regex::new(AGE_PATTERN)?,
            email: Regex::new(EMAIL_PATTERN)?,
        })
    }

    /// Entities in `text`: dictionary matches in type and value order, then
    /// ages, then emails. Duplicates of `(type, value)` keep the first
    /// occurrence.
    pub fn extract(&self, text: &str) -> Vec<ExtractedEntity> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let lower = text.to_lowercase();
        let mut found = Vec::new();

        for (entity_type, value, matcher) in &self.dictionary {
            if matcher.is_match(&lower) {
                found.push(ExtractedEntity {
                    entity_type: entity_type.clone(),
                    value: value.clone(),
                    raw_match: value.clone(),
                });
            }
        }

        for captures in self.age.captures_iter(text) {
            let digits = &captures[1];
            let value = digits
                .parse::<u32>()
                .map(|n| n.to_string())
                .unwrap_or_else(|_| digits.to_string());
            found.push(ExtractedEntity {
                entity_type: AGE_ENTITY.to_string(),
                value,
                raw_match: captures[0].to_string(),
            });
        }

        for m in self.email.find_iter(&lower) {
            found.push(ExtractedEntity {
                entity_type: EMAIL_ENTITY.to_string(),
                value: m.as_str().to_string(),
                raw_match: m.as_str().to_string(),
            });
        }

        let mut seen = HashSet::new();
        found.retain(|entity| seen.insert((entity.entity_type.clone(), entity.value.clone())));
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(entity_type: &str, value: &str) -> EntityAnnotation {
        EntityAnnotation {
            entity_type: entity_type.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_build_sorts_and_deduplicates() {
        let dictionary = EntityDictionary::build(&[
            annotation("plano", "Prata"),
            annotation("plano", "ouro"),
            annotation("plano", "OURO"),
            annotation("cidade", "Recife"),
            annotation("cidade", "  "),
        ]);

        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary.values("plano").unwrap().as_slice(), ["ouro", "prata"]);
        assert_eq!(dictionary.values("cidade").unwrap().as_slice(), ["recife"]);
        assert!(dictionary.values("plano").unwrap().contains("ouro"));
        assert_eq!(dictionary.num_values(), 3);

        let types: Vec<&str> = dictionary.iter().map(|(t, _)| t).collect();
        assert_eq!(types, vec!["cidade", "plano"]);
    }

    #[test]
    fn test_build_keeps_surrounding_whitespace() {
        let dictionary = EntityDictionary::build(&[
            annotation("plano", "Ouro "),
            annotation("plano", "ouro"),
            annotation("plano", "\t"),
        ]);

        assert_eq!(dictionary.values("plano").unwrap().as_slice(), ["ouro", "ouro "]);
    }

    #[test]
    fn test_build_empty() {
        let dictionary = EntityDictionary::build(&[]);
        assert!(dictionary.is_empty());
        assert_eq!(serde_json::to_string(&dictionary).unwrap(), "{}");
    }

    #[test]
    fn test_deserialize_restores_order() {
        let dictionary: EntityDictionary =
            serde_json::from_str(r#"{"plano": ["prata", "ouro", "prata"]}"#).unwrap();
        assert_eq!(dictionary.values("plano").unwrap().as_slice(), ["ouro", "prata"]);
    }

    #[test]
    fn test_extract_whole_words() {
        let dictionary = EntityDictionary::build(&[
            annotation("plano", "ouro"),
            annotation("plano", "plano familiar"),
        ]);
        let extractor = EntityExtractor::new(&dictionary).unwrap();

        let found = extractor.extract("Quero o Plano Familiar");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, "plano familiar");

        // "ouro" inside another word does not match.
        assert!(extractor.extract("tesouro").is_empty());
    }

    #[test]
    fn test_extract_patterns_and_dedup() {
        let extractor = EntityExtractor::new(&EntityDictionary::default()).unwrap();

        let found = extractor.extract("Tenho 05 anos, meu email é Joao.Silva@Exemplo.com e tenho 5 ANOS");
        let pairs: Vec<(&str, &str)> = found
            .iter()
            .map(|e| (e.entity_type.as_str(), e.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("idade", "5"), ("email", "joao.silva@exemplo.com")]
        );
        assert_eq!(found[0].raw_match, "05 anos");
    }

    #[test]
    fn test_extract_empty_text() {
        let extractor = EntityExtractor::new(&EntityDictionary::default()).unwrap();
        assert!(extractor.extract("   ").is_empty());
    }
}
