//! Error types for Voxdoc.

use crate::qa::QaError;
use crate::speech::SpeechError;
use crate::storage::StorageError;
use thiserror::Error;

/// Library-level error type for Voxdoc operations.
#[derive(Error, Debug)]
pub enum VoxdocError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Document QA failed: {0}")]
    DocumentQa(#[from] QaError),

    #[error("Speech synthesis failed: {0}")]
    Speech(#[from] SpeechError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl VoxdocError {
    /// Whether the error was caused by a remote collaborator (bucket, model, TTS).
    pub fn is_upstream(&self) -> bool {
        match self {
            VoxdocError::Storage(e) => !matches!(e, StorageError::Io(_)),
            VoxdocError::DocumentQa(e) => !matches!(e, QaError::Io(_)),
            VoxdocError::Speech(e) => !matches!(e, SpeechError::Io(_)),
            VoxdocError::Http(_) => true,
            _ => false,
        }
    }
}

/// Result type alias for Voxdoc operations.
pub type Result<T> = std::result::Result<T, VoxdocError>;
