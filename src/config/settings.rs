//! Configuration settings for Voxdoc.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub bucket: BucketSettings,
    pub qa: QaSettings,
    pub speech: SpeechSettings,
    pub audio: AudioSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.voxdoc".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body, in megabytes.
    pub max_upload_mb: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_upload_mb: 50,
        }
    }
}

impl ServerSettings {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

/// How a PDF that already has a local copy is treated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Download a missing PDF once and never look at the bucket again for it.
    #[default]
    DownloadOnce,
    /// Re-download from the bucket on every access when the blob exists.
    Refresh,
}

impl std::str::FromStr for CachePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "download_once" | "once" => Ok(CachePolicy::DownloadOnce),
            "refresh" => Ok(CachePolicy::Refresh),
            _ => Err(format!("Unknown cache policy: {}", s)),
        }
    }
}

impl std::fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CachePolicy::DownloadOnce => write!(f, "download_once"),
            CachePolicy::Refresh => write!(f, "refresh"),
        }
    }
}

/// Local file storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Root of the upload tree; PDFs land in `pdfs/`, audio in `audio/`.
    pub upload_dir: String,
    /// Localization policy for PDFs fetched from the bucket.
    pub cache_policy: CachePolicy,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            upload_dir: "uploads".to_string(),
            cache_policy: CachePolicy::DownloadOnce,
        }
    }
}

/// Object storage backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BucketProvider {
    /// Google Cloud Storage, credentials taken from the environment.
    #[default]
    Gcs,
    /// A directory on the local filesystem.
    Local,
    /// Process memory; contents vanish on exit.
    Memory,
}

impl std::str::FromStr for BucketProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gcs" | "gcp" | "google" => Ok(BucketProvider::Gcs),
            "local" => Ok(BucketProvider::Local),
            "memory" => Ok(BucketProvider::Memory),
            _ => Err(format!("Unknown bucket provider: {}", s)),
        }
    }
}

impl std::fmt::Display for BucketProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BucketProvider::Gcs => write!(f, "gcs"),
            BucketProvider::Local => write!(f, "local"),
            BucketProvider::Memory => write!(f, "memory"),
        }
    }
}

/// Remote bucket settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketSettings {
    pub provider: BucketProvider,
    /// Bucket name.
    pub name: String,
    /// Root directory for the local provider.
    pub local_path: String,
}

impl Default for BucketSettings {
    fn default() -> Self {
        Self {
            provider: BucketProvider::Gcs,
            name: "pdf-chat-bucket-convai".to_string(),
            local_path: "~/.voxdoc/bucket".to_string(),
        }
    }
}

/// Document question answering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaSettings {
    /// Generative model used to answer questions.
    pub model: String,
    /// Base URL of the Gemini API.
    pub api_base: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for QaSettings {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            api_key_env: "GEMINI_API".to_string(),
            timeout_secs: 300,
        }
    }
}

/// Speech synthesis provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpeechProvider {
    /// Google Cloud Text-to-Speech (default).
    #[default]
    Google,
    /// OpenAI speech endpoint.
    OpenAI,
}

impl std::str::FromStr for SpeechProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" | "gcp" => Ok(SpeechProvider::Google),
            "openai" => Ok(SpeechProvider::OpenAI),
            _ => Err(format!("Unknown speech provider: {}", s)),
        }
    }
}

impl std::fmt::Display for SpeechProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeechProvider::Google => write!(f, "google"),
            SpeechProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Speech synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub provider: SpeechProvider,
    /// Base URL of the Google Text-to-Speech API.
    pub api_base: String,
    /// Environment variable holding the Google API key.
    pub api_key_env: String,
    pub language_code: String,
    pub ssml_gender: String,
    pub audio_encoding: String,
    /// Model for the openai provider.
    pub openai_model: String,
    /// Voice for the openai provider.
    pub openai_voice: String,
    pub timeout_secs: u64,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            provider: SpeechProvider::Google,
            api_base: "https://texttospeech.googleapis.com".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            language_code: "en-US".to_string(),
            ssml_gender: "NEUTRAL".to_string(),
            audio_encoding: "LINEAR16".to_string(),
            openai_model: "tts-1".to_string(),
            openai_voice: "alloy".to_string(),
            timeout_secs: 300,
        }
    }
}

/// Audio file naming settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct AudioSettings {
    /// Append a random suffix to per-exchange audio names so that two chats in
    /// the same second cannot overwrite each other.
    pub unique_names: bool,
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::VoxdocError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voxdoc")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded upload root.
    pub fn upload_dir(&self) -> PathBuf {
        Self::expand_path(&self.storage.upload_dir)
    }

    /// Get the expanded root of the local bucket provider.
    pub fn bucket_local_path(&self) -> PathBuf {
        Self::expand_path(&self.bucket.local_path)
    }
}
