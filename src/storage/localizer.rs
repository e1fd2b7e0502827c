//! Local copies of bucket PDFs.

use super::{secure_filename, BucketClient, LocalStore, StorageError};
use crate::config::CachePolicy;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Makes sure a PDF is on local disk before it is handed to the QA client.
///
/// Under [`CachePolicy::DownloadOnce`] a downloaded file is kept forever and
/// later changes to the blob are not seen. [`CachePolicy::Refresh`] fetches the
/// blob on every call and only falls back to the local copy when the bucket no
/// longer has it.
pub struct PdfLocalizer {
    store: LocalStore,
    bucket: Arc<BucketClient>,
    policy: CachePolicy,
}

impl PdfLocalizer {
    pub fn new(store: LocalStore, bucket: Arc<BucketClient>, policy: CachePolicy) -> Self {
        Self {
            store,
            bucket,
            policy,
        }
    }

    /// Path to a local copy of blob `filename`, or `None` when neither the
    /// local store nor the bucket has it.
    ///
    /// The blob is looked up under its exact name; the local copy is kept under
    /// the sanitized form of that name.
    #[instrument(skip(self), fields(policy = %self.policy))]
    pub async fn localize(&self, filename: &str) -> Result<Option<PathBuf>, StorageError> {
        let local_name = secure_filename(filename);
        if local_name.is_empty() {
            return Err(StorageError::InvalidName(filename.to_string()));
        }
        let local_path = self.store.pdf_path(&local_name);
        let is_local = self.store.has_pdf(&local_name).await?;

        match self.policy {
            CachePolicy::DownloadOnce => {
                if is_local {
                    debug!("Using local copy");
                    return Ok(Some(local_path));
                }
                if !self.bucket.exists(filename).await? {
                    return Ok(None);
                }
                self.bucket.download_to(filename, &local_path).await?;
                info!(path = %local_path.display(), "Fetched PDF from bucket");
                Ok(Some(local_path))
            }
            CachePolicy::Refresh => {
                if self.bucket.exists(filename).await? {
                    self.bucket.download_to(filename, &local_path).await?;
                    info!(path = %local_path.display(), "Refreshed PDF from bucket");
                    Ok(Some(local_path))
                } else if is_local {
                    debug!("Blob missing, using local copy");
                    Ok(Some(local_path))
                } else {
                    Ok(None)
                }
            }
        }
    }
}
