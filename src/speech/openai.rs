//! OpenAI speech backend.

use super::{SpeechError, SpeechSynthesizer};
use crate::config::SpeechSettings;
use crate::http::api_key_from_env;
use crate::openai::create_client_with_timeout;
use async_openai::types::{CreateSpeechRequestArgs, SpeechModel, SpeechResponseFormat, Voice};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

/// Synthesizes speech with the OpenAI audio API, always as WAV.
pub struct OpenAiSpeech {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    voice: String,
}

impl OpenAiSpeech {
    /// Create a client from the `[speech]` settings.
    pub fn from_settings(settings: &SpeechSettings) -> Result<Self, SpeechError> {
        if api_key_from_env(OPENAI_KEY_ENV).is_none() {
            return Err(SpeechError::MissingApiKey(OPENAI_KEY_ENV.to_string()));
        }
        Ok(Self {
            client: create_client_with_timeout(Duration::from_secs(settings.timeout_secs))?,
            model: settings.openai_model.clone(),
            voice: settings.openai_voice.clone(),
        })
    }
}

fn speech_model(name: &str) -> SpeechModel {
    match name {
        "tts-1" => SpeechModel::Tts1,
        "tts-1-hd" => SpeechModel::Tts1Hd,
        other => SpeechModel::Other(other.to_string()),
    }
}

fn voice(name: &str) -> Voice {
    match name.to_lowercase().as_str() {
        "echo" => Voice::Echo,
        "fable" => Voice::Fable,
        "onyx" => Voice::Onyx,
        "nova" => Voice::Nova,
        "shimmer" => Voice::Shimmer,
        _ => Voice::Alloy,
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    #[instrument(skip(self, text), fields(model = %self.model, voice = %self.voice))]
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let request = CreateSpeechRequestArgs::default()
            .input(text)
            .model(speech_model(&self.model))
            .voice(voice(&self.voice))
            .response_format(SpeechResponseFormat::Wav)
            .build()
            .map_err(|e| SpeechError::OpenAI(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .speech(request)
            .await
            .map_err(|e| SpeechError::OpenAI(e.to_string()))?;

        debug!(bytes = response.bytes.len(), "Synthesized speech");
        Ok(response.bytes.to_vec())
    }
}
