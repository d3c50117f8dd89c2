//! Portable artifact export and loading.
//!
//! A trained model is written as a directory of self-describing JSON files
//! that a different runtime can use to reproduce every prediction:
//!
//! | file | contents |
//! |---|---|
//! | `tfidf_model.json` | vocabulary, idf weights and vectorizer flags |
//! | `svm_model.json` | classes, coefficient matrix and intercepts |
//! | `entity_dictionaries.json` | entity type to sorted values |
//! | `portuguese_stopwords.json` | sorted stop word list |
//! | `preprocessing.json` | normalization steps and stemmer rule tables |
//! | `manifest.json` | crate version, timestamp, sizes and CRC32 checksums |

pub mod artifacts;
pub mod manifest;

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{IntentportError, Result};
use crate::export::artifacts::{PreprocessingArtifact, SvmArtifact, TfIdfArtifact};
use crate::export::manifest::{Manifest, ManifestEntry};
use crate::ml::entities::EntityDictionary;
use crate::ml::svm::LinearModel;
use crate::ml::tfidf::TfIdfModel;
use crate::resources::LanguageResources;

pub const TFIDF_FILE: &str = "tfidf_model.json";
pub const SVM_FILE: &str = "svm_model.json";
pub const ENTITIES_FILE: &str = "entity_dictionaries.json";
pub const STOP_WORDS_FILE: &str = "portuguese_stopwords.json";
pub const PREPROCESSING_FILE: &str = "preprocessing.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Everything a runtime needs to reproduce predictions.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSet {
    pub tfidf: TfIdfModel,
    pub svm: LinearModel,
    pub entities: EntityDictionary,
    pub resources: LanguageResources,
}

/// A written artifact file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactFile {
    pub name: String,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Result of [`ArtifactSet::write`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    pub directory: PathBuf,
    /// Every file including the manifest, in write order.
    pub files: Vec<ArtifactFile>,
}

impl ExportSummary {
    pub fn file(&self, name: &str) -> Option<&ArtifactFile> {
        self.files.iter().find(|file| file.name == name)
    }

    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|file| file.bytes).sum()
    }
}

impl ArtifactSet {
    /// Write every artifact into `dir`, creating it if needed. The manifest
    /// is written last.
    pub fn write<P: AsRef<Path>>(&self, dir: P) -> Result<ExportSummary> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let documents: Vec<(&str, Vec<u8>)> = vec![
            (TFIDF_FILE, to_json(&TfIdfArtifact::from(&self.tfidf))?),
            (SVM_FILE, to_json(&SvmArtifact::from(&self.svm))?),
            (ENTITIES_FILE, to_json(&self.entities)?),
            (STOP_WORDS_FILE, to_json(self.resources.stop_words())?),
            (
                PREPROCESSING_FILE,
                to_json(&PreprocessingArtifact::new(&self.resources, STOP_WORDS_FILE))?,
            ),
        ];

        let mut files = Vec::with_capacity(documents.len() + 1);
        let mut entries = Vec::with_capacity(documents.len());
        for (name, contents) in &documents {
            files.push(write_file(dir, name, contents)?);
            entries.push(ManifestEntry::for_contents(name, contents));
        }

        let manifest = to_json(&Manifest::new(entries))?;
        files.push(write_file(dir, MANIFEST_FILE, &manifest)?);

        info!(
            "Exported {} artifact files ({} bytes) to {}",
            files.len(),
            files.iter().map(|f| f.bytes).sum::<usize>(),
            dir.display()
        );

        Ok(ExportSummary {
            directory: dir.to_path_buf(),
            files,
        })
    }

    /// Read an artifact directory back, validating every shape.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let manifest_path = dir.join(MANIFEST_FILE);
        let manifest: Option<Manifest> = if manifest_path.is_file() {
            Some(serde_json::from_slice(&fs::read(&manifest_path)?)?)
        } else {
            warn!("{} has no {MANIFEST_FILE}, checksums are not verified", dir.display());
            None
        };

        let read = |name: &str| -> Result<Vec<u8>> {
            let path = dir.join(name);
            let contents = fs::read(&path).map_err(|e| {
                IntentportError::model(format!("cannot read artifact {}: {e}", path.display()))
            })?;
            if let Some(manifest) = &manifest {
                manifest.verify(name, &contents)?;
            }
            Ok(contents)
        };

        let tfidf = parse::<TfIdfArtifact>(TFIDF_FILE, &read(TFIDF_FILE)?)?.into_model()?;
        let svm = parse::<SvmArtifact>(SVM_FILE, &read(SVM_FILE)?)?.into_model(tfidf.num_features())?;
        let entities = parse::<EntityDictionary>(ENTITIES_FILE, &read(ENTITIES_FILE)?)?;

        let preprocessing =
            parse::<PreprocessingArtifact>(PREPROCESSING_FILE, &read(PREPROCESSING_FILE)?)?;
        let stop_words_file = preprocessing.stop_words_file.clone();
        let stop_words = parse::<Vec<String>>(&stop_words_file, &read(&stop_words_file)?)?;
        let resources = preprocessing.into_resources(stop_words)?;

        debug!(
            "Loaded artifacts from {}: {} features, {} classes, {} entity types",
            dir.display(),
            tfidf.num_features(),
            svm.num_classes(),
            entities.len()
        );

        Ok(ArtifactSet {
            tfidf,
            svm,
            entities,
            resources,
        })
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut contents = serde_json::to_vec_pretty(value)?;
    contents.push(b'\n');
    Ok(contents)
}

fn parse<T: DeserializeOwned>(name: &str, contents: &[u8]) -> Result<T> {
    serde_json::from_slice(contents)
        .map_err(|e| IntentportError::model(format!("malformed {name}: {e}")))
}

fn write_file(dir: &Path, name: &str, contents: &[u8]) -> Result<ArtifactFile> {
    let path = dir.join(name);
    fs::write(&path, contents)?;
    debug!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(ArtifactFile {
        name: name.to_string(),
        path,
        bytes: contents.len(),
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::dataset::EntityAnnotation;
    use crate::ml::sparse::SparseVector;
    use crate::ml::svm::LinearSvc;
    use crate::ml::tfidf::TfIdfVectorizer;

    fn sample_set() -> ArtifactSet {
        let corpus = vec![
            vec!["quer".to_string(), "cot".to_string()],
            vec!["cot".to_string(), "plan".to_string()],
            vec!["olá".to_string()],
            vec!["bom".to_string(), "dia".to_string()],
        ];
        let labels: Vec<String> = ["cotacao", "cotacao", "saudacao", "saudacao"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let tfidf = TfIdfVectorizer::default().fit(&corpus);
        let x: Vec<SparseVector> = tfidf.transform_batch(&corpus);
        let svm = LinearSvc::default()
            .fit(&x, &labels, tfidf.num_features())
            .unwrap();
        let entities = EntityDictionary::build(&[EntityAnnotation {
            entity_type: "plano".to_string(),
            value: "Ouro".to_string(),
        }]);

        ArtifactSet {
            tfidf,
            svm,
            entities,
            resources: LanguageResources::builtin(),
        }
    }

    #[test]
    fn test_write_and_load() {
        let dir = TempDir::new().unwrap();
        let set = sample_set();

        let summary = set.write(dir.path()).unwrap();
        assert_eq!(summary.files.len(), 6);
        for name in [
            TFIDF_FILE,
            SVM_FILE,
            ENTITIES_FILE,
            STOP_WORDS_FILE,
            PREPROCESSING_FILE,
            MANIFEST_FILE,
        ] {
            let file = summary.file(name).unwrap();
            assert_eq!(fs::metadata(&file.path).unwrap().len() as usize, file.bytes);
        }

        let loaded = ArtifactSet::load(dir.path()).unwrap();
        assert_eq!(loaded, set);
    }

    #[test]
    fn test_load_detects_tampering() {
        let dir = TempDir::new().unwrap();
        sample_set().write(dir.path()).unwrap();

        let path = dir.path().join(SVM_FILE);
        let mut svm: SvmArtifact = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        svm.intercept_[0] += 1.0;
        fs::write(&path, serde_json::to_vec(&svm).unwrap()).unwrap();

        let err = ArtifactSet::load(dir.path()).unwrap_err();
        assert!(matches!(err, IntentportError::Model(_)));
    }

    #[test]
    fn test_load_validates_shapes_without_manifest() {
        let dir = TempDir::new().unwrap();
        sample_set().write(dir.path()).unwrap();
        fs::remove_file(dir.path().join(MANIFEST_FILE)).unwrap();
        assert!(ArtifactSet::load(dir.path()).is_ok());

        let path = dir.path().join(TFIDF_FILE);
        let mut tfidf: TfIdfArtifact = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        tfidf.idf_.pop();
        fs::write(&path, serde_json::to_vec(&tfidf).unwrap()).unwrap();

        let err = ArtifactSet::load(dir.path()).unwrap_err();
        assert!(matches!(err, IntentportError::Model(_)));
    }

    #[test]
    fn test_load_missing_directory() {
        let err = ArtifactSet::load("/nonexistent/artifacts").unwrap_err();
        assert!(matches!(err, IntentportError::Model(_)));
    }
}
