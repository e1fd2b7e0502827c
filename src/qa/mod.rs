//! Document question answering.
//!
//! A [`DocumentQa`] takes a PDF and a recorded question and returns the
//! model's textual answer.

mod gemini;

pub use gemini::GeminiDocumentQa;

use async_trait::async_trait;
use std::path::Path;

/// Trait for document question answering services.
#[async_trait]
pub trait DocumentQa: Send + Sync {
    /// Answer the spoken question in `audio_path` about the PDF at `pdf_path`.
    ///
    /// `instruction` is the text prompt sent alongside both files.
    async fn answer(
        &self,
        pdf_path: &Path,
        audio_path: &Path,
        instruction: &str,
    ) -> Result<String, QaError>;
}

/// Errors raised by document QA clients.
#[derive(Debug, thiserror::Error)]
pub enum QaError {
    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("file upload failed: {0}")]
    Upload(String),
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
