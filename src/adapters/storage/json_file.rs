//! JSON file store for the output document
//!
//! Writes go to a sibling temp file first and are renamed into place, so a
//! reader never observes a partially written document.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::OutputDocument;
use crate::ports::{DocumentReader, OutputSink, SinkError};

pub const DEFAULT_OUTPUT_PATH: &str = "tokens.json";

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }

    /// Synchronous write used by the sink implementation
    pub fn save(&self, document: &OutputDocument) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SinkError::Write {
                path: parent.display().to_string(),
                reason: e.to_string(),
            })?;
        }

        let content = serde_json::to_string_pretty(document)
            .map_err(|e| SinkError::Serialization(e.to_string()))?;

        let temp = self.temp_path();
        fs::write(&temp, content).map_err(|e| SinkError::Write {
            path: temp.display().to_string(),
            reason: e.to_string(),
        })?;

        if let Err(e) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(SinkError::Write {
                path: self.display(),
                reason: e.to_string(),
            });
        }

        tracing::info!("Saved {} tokens to {}", document.len(), self.display());
        Ok(())
    }

    pub fn load(&self) -> Result<OutputDocument, SinkError> {
        let content = fs::read_to_string(&self.path).map_err(|e| SinkError::Read {
            path: self.display(),
            reason: e.to_string(),
        })?;

        let document: OutputDocument =
            serde_json::from_str(&content).map_err(|e| SinkError::Malformed {
                path: self.display(),
                reason: e.to_string(),
            })?;

        tracing::debug!("Loaded {} tokens from {}", document.len(), self.display());
        Ok(document)
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_PATH)
    }
}

#[async_trait]
impl OutputSink for JsonFileStore {
    async fn write(&self, document: &OutputDocument) -> Result<(), SinkError> {
        self.save(document)
    }
}

#[async_trait]
impl DocumentReader for JsonFileStore {
    async fn read(&self) -> Result<OutputDocument, SinkError> {
        self.load()
    }
}
