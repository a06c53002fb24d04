//! Output document persistence ports

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::OutputDocument;

/// Output persistence errors (`SinkFailure`)
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to serialize document: {0}")]
    Serialization(String),

    #[error("Failed to write document to {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Failed to read document from {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Document at {path} is malformed: {reason}")]
    Malformed { path: String, reason: String },
}

/// Persists a finished document. A document is valid only once `write` returns Ok.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutputSink: Send + Sync {
    async fn write(&self, document: &OutputDocument) -> Result<(), SinkError>;
}

/// Reads a previously persisted document
#[async_trait]
pub trait DocumentReader: Send + Sync {
    async fn read(&self) -> Result<OutputDocument, SinkError>;
}
