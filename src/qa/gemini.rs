//! Gemini document QA client.
//!
//! Both files go through the Gemini Files API, then a single non-streaming
//! `generateContent` call references them next to the instruction prompt.

use super::{DocumentQa, QaError};
use crate::config::QaSettings;
use crate::http::{api_key_from_env, build_client, DEFAULT_TIMEOUT_SECS};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const API_KEY_HEADER: &str = "x-goog-api-key";
const PDF_MIME: &str = "application/pdf";
const WAV_MIME: &str = "audio/wav";

/// Document QA backed by the Gemini API.
pub struct GeminiDocumentQa {
    http: reqwest::Client,
    api_base: Url,
    api_key: String,
    model: String,
}

impl GeminiDocumentQa {
    /// Create a client for the default model and endpoint.
    pub fn new(api_key: &str) -> Result<Self, QaError> {
        Self::with_config(
            DEFAULT_API_BASE,
            api_key,
            DEFAULT_MODEL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a client with custom endpoint, model and timeout.
    pub fn with_config(
        api_base: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, QaError> {
        let mut base = api_base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let api_base = Url::parse(&base).map_err(|e| QaError::Config(format!("{}: {}", api_base, e)))?;

        Ok(Self {
            http: build_client(timeout)?,
            api_base,
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// Create a client from the `[qa]` settings, reading the key from the environment.
    pub fn from_settings(settings: &QaSettings) -> Result<Self, QaError> {
        let api_key = api_key_from_env(&settings.api_key_env)
            .ok_or_else(|| QaError::MissingApiKey(settings.api_key_env.clone()))?;

        Self::with_config(
            &settings.api_base,
            &api_key,
            &settings.model,
            Duration::from_secs(settings.timeout_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, path: &str) -> Result<Url, QaError> {
        self.api_base
            .join(path)
            .map_err(|e| QaError::Config(format!("{}: {}", path, e)))
    }

    /// Upload one file with the resumable protocol and return its handle.
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn upload_file(&self, path: &Path, mime_type: &str) -> Result<UploadedFile, QaError> {
        let bytes = tokio::fs::read(path).await?;
        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        debug!(bytes = bytes.len(), "Starting upload");

        let start = self
            .http
            .post(self.endpoint("upload/v1beta/files")?)
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;
        let start = check_status(start).await?;

        let upload_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| QaError::Upload("response carried no upload URL".to_string()))?
            .to_string();

        let finish = self
            .http
            .post(upload_url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Offset", 0)
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await?;
        let mut file = check_status(finish).await?.json::<UploadResponse>().await?.file;
        if file.mime_type.is_empty() {
            file.mime_type = mime_type.to_string();
        }

        debug!(name = %file.name, uri = %file.uri, "Upload finished");
        Ok(file)
    }

    /// Issue the generation request for already uploaded files.
    async fn generate(&self, files: &[UploadedFile], instruction: &str) -> Result<String, QaError> {
        let request = build_request(files, instruction);
        let url = self.endpoint(&format!("v1beta/models/{}:generateContent", self.model))?;

        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;
        let body: Value = check_status(response).await?.json().await?;

        Ok(extract_answer(&body))
    }
}

#[async_trait]
impl DocumentQa for GeminiDocumentQa {
    #[instrument(skip(self, instruction), fields(model = %self.model))]
    async fn answer(
        &self,
        pdf_path: &Path,
        audio_path: &Path,
        instruction: &str,
    ) -> Result<String, QaError> {
        let pdf = self.upload_file(pdf_path, PDF_MIME).await?;
        let audio = self.upload_file(audio_path, WAV_MIME).await?;

        let answer = self.generate(&[pdf, audio], instruction).await?;
        info!(chars = answer.len(), "Received answer");
        Ok(answer)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, QaError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(QaError::Api {
        status: status.as_u16(),
        message,
    })
}

// === Wire types ===

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadedFile {
    #[serde(default)]
    name: String,
    uri: String,
    #[serde(default)]
    mime_type: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: UploadedFile,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    File {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn build_request(files: &[UploadedFile], instruction: &str) -> GenerateContentRequest {
    let mut parts: Vec<Part> = files
        .iter()
        .map(|f| Part::File {
            file_data: FileData {
                mime_type: f.mime_type.clone(),
                file_uri: f.uri.clone(),
            },
        })
        .collect();
    parts.push(Part::Text {
        text: instruction.to_string(),
    });

    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts,
        }],
    }
}

/// Text of the first candidate, trimmed. Responses without text (blocked
/// prompts, unexpected shapes) fall back to the raw JSON.
fn extract_answer(body: &Value) -> String {
    let text = serde_json::from_value::<GenerateContentResponse>(body.clone())
        .ok()
        .and_then(|r| r.candidates.into_iter().next())
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
        .filter(|t| !t.trim().is_empty());

    match text {
        Some(text) => text.trim().to_string(),
        None => {
            warn!("Response carried no text, returning raw payload");
            body.to_string().trim().to_string()
        }
    }
}
