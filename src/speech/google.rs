//! Google Cloud Text-to-Speech backend.

use super::{SpeechError, SpeechSynthesizer};
use crate::config::SpeechSettings;
use crate::http::{api_key_from_env, build_client};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Voice parameters sent with every synthesis request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSelection {
    pub language_code: String,
    pub ssml_gender: String,
}

/// Synthesizes speech through the `text:synthesize` REST endpoint.
pub struct GoogleSpeech {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    voice: VoiceSelection,
    audio_encoding: String,
}

impl GoogleSpeech {
    /// Create a client from the `[speech]` settings, reading the key from the environment.
    pub fn from_settings(settings: &SpeechSettings) -> Result<Self, SpeechError> {
        let api_key = api_key_from_env(&settings.api_key_env)
            .ok_or_else(|| SpeechError::MissingApiKey(settings.api_key_env.clone()))?;

        let mut base = settings.api_base.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint = Url::parse(&base)
            .and_then(|b| b.join("v1/text:synthesize"))
            .map_err(|e| SpeechError::Config(format!("{}: {}", settings.api_base, e)))?;

        Ok(Self {
            http: build_client(Duration::from_secs(settings.timeout_secs))?,
            endpoint,
            api_key,
            voice: VoiceSelection {
                language_code: settings.language_code.clone(),
                ssml_gender: settings.ssml_gender.clone(),
            },
            audio_encoding: settings.audio_encoding.clone(),
        })
    }

    fn request_body<'a>(&'a self, text: &'a str) -> SynthesizeRequest<'a> {
        SynthesizeRequest {
            input: SynthesisInput { text },
            voice: &self.voice,
            audio_config: AudioConfig {
                audio_encoding: &self.audio_encoding,
            },
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleSpeech {
    #[instrument(skip(self, text), fields(language = %self.voice.language_code))]
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&self.request_body(text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SpeechError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SynthesizeResponse = response.json().await?;
        let audio = decode_audio(&body.audio_content)?;
        debug!(bytes = audio.len(), "Synthesized speech");
        Ok(audio)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: &'a VoiceSelection,
    audio_config: AudioConfig<'a>,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig<'a> {
    audio_encoding: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

fn decode_audio(content: &str) -> Result<Vec<u8>, SpeechError> {
    if content.is_empty() {
        return Err(SpeechError::EmptyAudio);
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(content)?)
}
