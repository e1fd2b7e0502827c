//! Remote bucket client backed by `object_store`.

use super::StorageError;
use crate::config::{BucketProvider, Settings};
use futures::TryStreamExt;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Content type recorded on uploaded PDFs.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Client for the bucket that mirrors uploaded PDFs.
pub struct BucketClient {
    inner: Arc<dyn ObjectStore>,
    name: String,
    /// Whether the backend accepts object attributes such as content type.
    attributes: bool,
}

impl BucketClient {
    /// Connect to a Google Cloud Storage bucket using credentials from the environment.
    pub fn gcs(bucket: &str) -> Result<Self, StorageError> {
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| StorageError::Config(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(store),
            name: bucket.to_string(),
            attributes: true,
        })
    }

    /// Use a directory on the local filesystem as the bucket.
    pub fn local(root: &Path, bucket: &str) -> Result<Self, StorageError> {
        std::fs::create_dir_all(root)?;
        let store = LocalFileSystem::new_with_prefix(root)
            .map_err(|e| StorageError::Config(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(store),
            name: bucket.to_string(),
            attributes: false,
        })
    }

    /// An empty bucket held in memory.
    pub fn in_memory(bucket: &str) -> Self {
        Self {
            inner: Arc::new(InMemory::new()),
            name: bucket.to_string(),
            attributes: true,
        }
    }

    /// Build the client described by the `[bucket]` settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, StorageError> {
        let bucket = &settings.bucket;
        info!(provider = %bucket.provider, bucket = %bucket.name, "Opening bucket");
        match bucket.provider {
            BucketProvider::Gcs => Self::gcs(&bucket.name),
            BucketProvider::Local => Self::local(&settings.bucket_local_path(), &bucket.name),
            BucketProvider::Memory => Ok(Self::in_memory(&bucket.name)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn object_path(name: &str) -> Result<ObjectPath, StorageError> {
        ObjectPath::parse(name).map_err(|e| StorageError::InvalidName(e.to_string()))
    }

    /// Upload a local file under its base filename and return the blob name.
    #[instrument(skip(self), fields(bucket = %self.name, path = %local_path.display()))]
    pub async fn upload_file(
        &self,
        local_path: &Path,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let blob_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::InvalidName(local_path.display().to_string()))?
            .to_string();

        let bytes = tokio::fs::read(local_path).await?;
        self.put(&blob_name, bytes, content_type).await?;
        Ok(blob_name)
    }

    /// Store `bytes` as blob `name`, replacing any existing object.
    pub async fn put(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let location = Self::object_path(name)?;
        let size = bytes.len();

        let mut opts = PutOptions::default();
        if self.attributes {
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
            opts.attributes = attributes;
        }

        self.inner
            .put_opts(&location, PutPayload::from(bytes), opts)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        debug!(blob = %name, bytes = size, "Uploaded blob");
        Ok(())
    }

    /// Whether a blob with this name exists.
    pub async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        let location = Self::object_path(name)?;
        match self.inner.head(&location).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::DownloadFailed(e.to_string())),
        }
    }

    /// Download a blob and write it to `dest`.
    #[instrument(skip(self), fields(bucket = %self.name, dest = %dest.display()))]
    pub async fn download_to(&self, name: &str, dest: &Path) -> Result<u64, StorageError> {
        let bytes = self.fetch(name).await?;
        tokio::fs::write(dest, &bytes).await?;
        debug!(blob = %name, bytes = bytes.len(), "Downloaded blob");
        Ok(bytes.len() as u64)
    }

    /// Read a blob into memory.
    pub async fn fetch(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let location = Self::object_path(name)?;
        let result = self.inner.get(&location).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => StorageError::NotFound(name.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    /// Names of every blob in the bucket.
    pub async fn list_names(&self) -> Result<Vec<String>, StorageError> {
        let objects: Vec<_> = self
            .inner
            .list(None)
            .try_collect()
            .await
            .map_err(|e| StorageError::ListFailed(e.to_string()))?;

        Ok(objects
            .into_iter()
            .map(|meta| meta.location.to_string())
            .collect())
    }

    /// Names of blobs ending in `.pdf` (any case), sorted.
    pub async fn list_pdfs(&self) -> Result<Vec<String>, StorageError> {
        let mut pdfs: Vec<String> = self
            .list_names()
            .await?
            .into_iter()
            .filter(|name| name.to_lowercase().ends_with(".pdf"))
            .collect();
        pdfs.sort();
        Ok(pdfs)
    }
}
