//! Local upload directories.

use super::StorageError;
use std::path::{Path, PathBuf};
use tracing::debug;

const PDF_SUBDIR: &str = "pdfs";
const AUDIO_SUBDIR: &str = "audio";

/// Two flat directories holding uploaded PDFs and audio clips.
///
/// Filenames passed in must already be sanitized; the store joins them onto
/// its directories as-is.
#[derive(Debug, Clone)]
pub struct LocalStore {
    pdf_dir: PathBuf,
    audio_dir: PathBuf,
}

impl LocalStore {
    /// Open (and create if needed) the store under `root`.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref();
        let pdf_dir = root.join(PDF_SUBDIR);
        let audio_dir = root.join(AUDIO_SUBDIR);
        std::fs::create_dir_all(&pdf_dir)?;
        std::fs::create_dir_all(&audio_dir)?;
        Ok(Self { pdf_dir, audio_dir })
    }

    pub fn pdf_dir(&self) -> &Path {
        &self.pdf_dir
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    pub fn pdf_path(&self, filename: &str) -> PathBuf {
        self.pdf_dir.join(filename)
    }

    pub fn audio_path(&self, filename: &str) -> PathBuf {
        self.audio_dir.join(filename)
    }

    pub async fn has_pdf(&self, filename: &str) -> Result<bool, StorageError> {
        Ok(tokio::fs::try_exists(self.pdf_path(filename)).await?)
    }

    pub async fn has_audio(&self, filename: &str) -> Result<bool, StorageError> {
        Ok(tokio::fs::try_exists(self.audio_path(filename)).await?)
    }

    /// Write a PDF, replacing any file of the same name.
    pub async fn save_pdf(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.pdf_path(filename);
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "Saved PDF");
        Ok(path)
    }

    /// Write an audio clip, replacing any file of the same name.
    pub async fn save_audio(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.audio_path(filename);
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "Saved audio");
        Ok(path)
    }

    /// Count files and total bytes in the PDF and audio directories.
    pub fn usage(&self) -> Result<StoreUsage, StorageError> {
        let (pdf_count, pdf_bytes) = dir_usage(&self.pdf_dir)?;
        let (audio_count, audio_bytes) = dir_usage(&self.audio_dir)?;
        Ok(StoreUsage {
            pdf_count,
            pdf_bytes,
            audio_count,
            audio_bytes,
        })
    }
}

/// File counts and sizes of a [`LocalStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreUsage {
    pub pdf_count: usize,
    pub pdf_bytes: u64,
    pub audio_count: usize,
    pub audio_bytes: u64,
}

fn dir_usage(dir: &Path) -> Result<(usize, u64), StorageError> {
    let mut count = 0;
    let mut bytes = 0;
    for entry in std::fs::read_dir(dir)?.filter_map(|e| e.ok()) {
        let meta = entry.metadata()?;
        if meta.is_file() {
            count += 1;
            bytes += meta.len();
        }
    }
    Ok((count, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("uploads")).unwrap();
        assert!(store.pdf_dir().is_dir());
        assert!(store.audio_dir().is_dir());
        assert!(store.pdf_dir().ends_with("uploads/pdfs"));
        assert!(store.audio_dir().ends_with("uploads/audio"));
    }

    #[tokio::test]
    async fn test_save_and_check() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();

        assert!(!store.has_pdf("report.pdf").await.unwrap());
        let path = store.save_pdf("report.pdf", b"%PDF-1.4").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
        assert!(store.has_pdf("report.pdf").await.unwrap());

        store.save_audio("user_1.wav", b"RIFF").await.unwrap();
        assert!(store.has_audio("user_1.wav").await.unwrap());
        assert!(!store.has_pdf("user_1.wav").await.unwrap());
    }

    #[tokio::test]
    async fn test_usage() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();
        store.save_pdf("a.pdf", b"12345").await.unwrap();
        store.save_pdf("b.pdf", b"123").await.unwrap();
        store.save_audio("c.wav", b"1").await.unwrap();

        let usage = store.usage().unwrap();
        assert_eq!(
            usage,
            StoreUsage {
                pdf_count: 2,
                pdf_bytes: 8,
                audio_count: 1,
                audio_bytes: 1,
            }
        );
    }
}
