//! Validation and storage of uploaded files.

use crate::error::{Result, VoxdocError};
use crate::storage::{has_extension, secure_filename, BucketClient, LocalStore, PDF_CONTENT_TYPE};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// A PDF written locally and mirrored to the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredPdf {
    pub filename: String,
    pub cloud_filename: String,
}

/// Accepts PDF and audio uploads.
pub struct UploadService {
    store: LocalStore,
    bucket: Arc<BucketClient>,
}

impl UploadService {
    pub fn new(store: LocalStore, bucket: Arc<BucketClient>) -> Self {
        Self { store, bucket }
    }

    pub fn bucket(&self) -> &BucketClient {
        &self.bucket
    }

    /// Save a PDF locally, then upload a copy under the same name.
    ///
    /// A failed bucket upload leaves the local file in place.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn store_pdf(&self, original_name: &str, bytes: &[u8]) -> Result<StoredPdf> {
        let filename = validate_upload_name(original_name, "pdf")?;
        let path = self.store.save_pdf(&filename, bytes).await?;

        let cloud_filename = match self.bucket.upload_file(&path, PDF_CONTENT_TYPE).await {
            Ok(name) => name,
            Err(e) => {
                warn!(file = %filename, error = %e, "PDF saved locally but bucket upload failed");
                return Err(e.into());
            }
        };

        info!(file = %filename, bucket = %self.bucket.name(), "Stored PDF");
        Ok(StoredPdf {
            filename,
            cloud_filename,
        })
    }

    /// Save a WAV clip locally.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn store_audio(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let filename = validate_upload_name(original_name, "wav")?;
        self.store.save_audio(&filename, bytes).await?;
        info!(file = %filename, "Stored audio");
        Ok(filename)
    }

    /// PDF names present in the bucket.
    pub async fn list_pdfs(&self) -> Result<Vec<String>> {
        Ok(self.bucket.list_pdfs().await?)
    }
}

/// Check a client filename against `ext` and return its sanitized form.
pub fn validate_upload_name(original_name: &str, ext: &str) -> Result<String> {
    if original_name.is_empty() {
        return Err(VoxdocError::InvalidInput("no selected file".to_string()));
    }
    if !has_extension(original_name, ext) {
        return Err(VoxdocError::InvalidInput("invalid file type".to_string()));
    }

    let filename = secure_filename(original_name);
    if filename.is_empty() || !has_extension(&filename, ext) {
        return Err(VoxdocError::InvalidInput("invalid file type".to_string()));
    }
    Ok(filename)
}
