//! Upload command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::storage::{BucketClient, LocalStore};
use crate::uploads::UploadService;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Run the upload command.
pub async fn run_upload(file: &str, settings: Settings) -> Result<()> {
    let path = Settings::expand_path(file);
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let original_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let store = LocalStore::new(settings.upload_dir())?;
    let bucket = Arc::new(BucketClient::from_settings(&settings)?);
    let uploads = UploadService::new(store, bucket);

    let spinner = Output::spinner(&format!("Uploading {}...", original_name));
    match uploads.store_pdf(&original_name, &bytes).await {
        Ok(stored) => {
            spinner.finish_and_clear();
            Output::success("PDF uploaded.");
            Output::kv("Local name", &stored.filename);
            Output::kv("Bucket object", &format!("{}/{}", uploads.bucket().name(), stored.cloud_filename));
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Upload failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
