//! File storage for Voxdoc.
//!
//! - `local` - the upload directories on disk
//! - `bucket` - the remote bucket mirroring uploaded PDFs
//! - `localizer` - local copies of bucket PDFs
//! - `filename` - sanitization and naming rules

mod bucket;
pub mod filename;
mod local;
mod localizer;

pub use bucket::{BucketClient, PDF_CONTENT_TYPE};
pub use filename::{audio_filename, has_extension, secure_filename, AudioRole, ExchangeStamp};
pub use local::{LocalStore, StoreUsage};
pub use localizer::PdfLocalizer;

use std::io;

/// Errors raised by the local store and the bucket client.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("invalid object name: {0}")]
    InvalidName(String),
    #[error("bucket configuration failed: {0}")]
    Config(String),
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("listing failed: {0}")]
    ListFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
