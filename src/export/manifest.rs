//! Artifact manifest: crate version, creation time and per-file checksums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{IntentportError, Result};

/// Size and CRC32 of one artifact file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub file: String,
    pub bytes: usize,
    pub crc32: u32,
}

impl ManifestEntry {
    pub fn for_contents(file: &str, contents: &[u8]) -> Self {
        ManifestEntry {
            file: file.to_string(),
            bytes: contents.len(),
            crc32: crc32fast::hash(contents),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Version of the crate that wrote the artifacts.
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub files: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(files: Vec<ManifestEntry>) -> Self {
        Manifest {
            version: crate::VERSION.to_string(),
            created_at: Utc::now(),
            files,
        }
    }

    pub fn entry(&self, file: &str) -> Option<&ManifestEntry> {
        self.files.iter().find(|entry| entry.file == file)
    }

    /// Check `contents` against the recorded size and checksum of `file`.
    /// Files the manifest does not list are accepted.
    pub fn verify(&self, file: &str, contents: &[u8]) -> Result<()> {
        let Some(expected) = self.entry(file) else {
            return Ok(());
        };
        let actual = ManifestEntry::for_contents(file, contents);
        if actual.bytes != expected.bytes || actual.crc32 != expected.crc32 {
            return Err(IntentportError::model(format!(
                "{file} does not match the manifest (expected {} bytes, crc32 {:08x}; found {} bytes, crc32 {:08x})",
                expected.bytes, expected.crc32, actual.bytes, actual.crc32
            )));
        }
        Ok(())
    }
}
