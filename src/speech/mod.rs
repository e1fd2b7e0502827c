//! Speech synthesis for answers.
//!
//! A [`SpeechSynthesizer`] turns text into WAV bytes; [`SpeechClient`] writes
//! those bytes into the local audio directory under the exchange's name.

mod google;
mod openai;

pub use google::GoogleSpeech;
pub use openai::OpenAiSpeech;

use crate::config::{SpeechProvider, SpeechSettings};
use crate::storage::{audio_filename, AudioRole, ExchangeStamp, LocalStore};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

/// Trait for text-to-speech providers.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` and return the audio bytes.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError>;
}

/// Errors raised by speech synthesis.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("could not decode audio: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("service returned no audio")]
    EmptyAudio,
    #[error("OpenAI API error: {0}")]
    OpenAI(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the synthesizer selected by `speech.provider`.
pub fn create_synthesizer(settings: &SpeechSettings) -> Result<Arc<dyn SpeechSynthesizer>, SpeechError> {
    info!(provider = %settings.provider, "Using speech provider");
    match settings.provider {
        SpeechProvider::Google => Ok(Arc::new(GoogleSpeech::from_settings(settings)?)),
        SpeechProvider::OpenAI => Ok(Arc::new(OpenAiSpeech::from_settings(settings)?)),
    }
}

/// Synthesizes answers and stores them as `ai_<stamp>.wav`.
pub struct SpeechClient {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    store: LocalStore,
}

impl SpeechClient {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, store: LocalStore) -> Self {
        Self { synthesizer, store }
    }

    /// Speak `text` and return the filename of the written audio clip.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn speak(&self, text: &str, stamp: &ExchangeStamp) -> Result<String, SpeechError> {
        let audio = self.synthesizer.synthesize(text).await?;
        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }

        let filename = audio_filename(AudioRole::Assistant, stamp);
        let path = self.store.audio_path(&filename);
        tokio::fs::write(&path, &audio).await?;

        info!(file = %filename, bytes = audio.len(), "Wrote synthesized answer");
        Ok(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSynthesizer(Vec<u8>);

    #[async_trait]
    impl SpeechSynthesizer for FixedSynthesizer {
        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, SpeechError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_speak_writes_ai_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();
        let client = SpeechClient::new(Arc::new(FixedSynthesizer(b"RIFFdata".to_vec())), store.clone());

        let stamp = ExchangeStamp::from("20240501120000");
        let filename = client.speak("hello", &stamp).await.unwrap();

        assert_eq!(filename, "ai_20240501120000.wav");
        assert_eq!(std::fs::read(store.audio_path(&filename)).unwrap(), b"RIFFdata");
    }

    #[tokio::test]
    async fn test_speak_rejects_empty_audio() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();
        let client = SpeechClient::new(Arc::new(FixedSynthesizer(Vec::new())), store.clone());

        let result = client.speak("hello", &ExchangeStamp::from("1")).await;
        assert!(matches!(result, Err(SpeechError::EmptyAudio)));
        assert!(!store.has_audio("ai_1.wav").await.unwrap());
    }
}
