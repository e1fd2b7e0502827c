//! Chat exchanges: one spoken question about a PDF, one spoken answer.

use crate::config::{Prompts, Settings};
use crate::error::{Result, VoxdocError};
use crate::qa::{DocumentQa, GeminiDocumentQa};
use crate::speech::{create_synthesizer, SpeechClient};
use crate::storage::{
    audio_filename, secure_filename, AudioRole, BucketClient, ExchangeStamp, LocalStore, PdfLocalizer,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// Files and text produced by one question/answer cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatExchange {
    pub pdf_filename: String,
    pub user_audio: String,
    pub response_text: String,
    pub ai_audio: String,
}

impl ChatExchange {
    /// URL under which the synthesized answer is served.
    pub fn tts_audio_url(&self) -> String {
        format!("/audio/{}", self.ai_audio)
    }
}

/// Runs chat exchanges against the QA and speech collaborators.
pub struct ChatService {
    store: LocalStore,
    localizer: PdfLocalizer,
    qa: Arc<dyn DocumentQa>,
    speech: SpeechClient,
    prompts: Prompts,
    unique_names: bool,
}

impl ChatService {
    pub fn new(
        store: LocalStore,
        localizer: PdfLocalizer,
        qa: Arc<dyn DocumentQa>,
        speech: SpeechClient,
        prompts: Prompts,
    ) -> Self {
        Self {
            store,
            localizer,
            qa,
            speech,
            prompts,
            unique_names: false,
        }
    }

    /// Wire up the Gemini and speech clients configured in `settings`.
    pub fn from_settings(
        settings: &Settings,
        store: LocalStore,
        bucket: Arc<BucketClient>,
    ) -> Result<Self> {
        let qa = Arc::new(GeminiDocumentQa::from_settings(&settings.qa)?);
        let synthesizer = create_synthesizer(&settings.speech)?;
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let localizer = PdfLocalizer::new(store.clone(), bucket, settings.storage.cache_policy);

        Ok(Self::new(
            store.clone(),
            localizer,
            qa,
            SpeechClient::new(synthesizer, store),
            prompts,
        )
        .with_unique_names(settings.audio.unique_names))
    }

    /// Add a random suffix to exchange stamps.
    pub fn with_unique_names(mut self, unique: bool) -> Self {
        self.unique_names = unique;
        self
    }

    /// Local path of the PDF a chat refers to.
    pub async fn resolve_pdf(&self, pdf_filename: &str) -> Result<PathBuf> {
        if pdf_filename.trim().is_empty() {
            return Err(VoxdocError::InvalidInput("missing pdf filename".to_string()));
        }
        if pdf_filename.contains(['/', '\\']) || secure_filename(pdf_filename).is_empty() {
            return Err(VoxdocError::InvalidInput("invalid pdf filename".to_string()));
        }

        self.localizer
            .localize(pdf_filename)
            .await?
            .ok_or_else(|| VoxdocError::NotFound("pdf file not found".to_string()))
    }

    /// Save the question, ask the model and speak the answer.
    #[instrument(skip(self, pdf_path, audio), fields(audio_bytes = audio.len()))]
    pub async fn converse(
        &self,
        pdf_filename: &str,
        pdf_path: &Path,
        audio: &[u8],
    ) -> Result<ChatExchange> {
        if audio.is_empty() {
            return Err(VoxdocError::InvalidInput("empty audio file".to_string()));
        }

        let stamp = ExchangeStamp::now(self.unique_names);
        let user_audio = audio_filename(AudioRole::User, &stamp);
        let audio_path = self.store.save_audio(&user_audio, audio).await?;

        let instruction = self.prompts.qa_instruction(pdf_filename);
        let response_text = self.qa.answer(pdf_path, &audio_path, &instruction).await?;
        info!(response = %response_text, "Model answered");

        let ai_audio = self.speech.speak(&response_text, &stamp).await?;

        Ok(ChatExchange {
            pdf_filename: pdf_filename.to_string(),
            user_audio,
            response_text,
            ai_audio,
        })
    }

    /// Resolve the PDF and run one exchange.
    pub async fn ask(&self, pdf_filename: &str, audio: &[u8]) -> Result<ChatExchange> {
        let pdf_path = self.resolve_pdf(pdf_filename).await?;
        self.converse(pdf_filename, &pdf_path, audio).await
    }
}
