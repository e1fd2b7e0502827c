//! Route handlers.

use super::error::ApiError;
use super::types::{ChatResponse, PdfListResponse, UploadAudioResponse, UploadPdfResponse};
use super::AppState;
use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        State,
    },
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use bytes::Bytes;
use std::collections::HashMap;
use tracing::info;

const INDEX_HTML: &str = include_str!("../../static/index.html");
const SCRIPTS_JS: &str = include_str!("../../static/scripts.js");

/// A file part of a multipart form.
#[derive(Debug)]
pub(crate) struct FormFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// Parsed multipart form: file parts and text parts keyed by field name.
#[derive(Debug, Default)]
pub(crate) struct Form {
    files: HashMap<String, FormFile>,
    texts: HashMap<String, String>,
}

impl Form {
    pub async fn read(multipart: Result<Multipart, MultipartRejection>) -> Result<Self, ApiError> {
        let mut multipart = multipart?;
        let mut form = Form::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let bytes = field.bytes().await?;
                    form.files.insert(name, FormFile { filename, bytes });
                }
                None => {
                    let text = field.text().await?;
                    form.texts.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    pub fn file(&self, name: &str) -> Option<&FormFile> {
        self.files.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn scripts() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], SCRIPTS_JS)
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn upload_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadPdfResponse>, ApiError> {
    let form = Form::read(multipart).await?;
    let file = form
        .file("pdf_file")
        .ok_or_else(|| ApiError::bad_request("no pdf file part"))?;

    let stored = state.uploads.store_pdf(&file.filename, &file.bytes).await?;

    Ok(Json(UploadPdfResponse {
        message: "pdf uploaded successfully".to_string(),
        filename: stored.filename,
        cloud_filename: stored.cloud_filename,
    }))
}

pub async fn upload_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadAudioResponse>, ApiError> {
    let form = Form::read(multipart).await?;
    let file = form
        .file("audio_file")
        .ok_or_else(|| ApiError::bad_request("no audio file part"))?;

    let filename = state.uploads.store_audio(&file.filename, &file.bytes).await?;

    Ok(Json(UploadAudioResponse {
        message: "audio uploaded successfully".to_string(),
        filename,
    }))
}

pub async fn chat(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let form = Form::read(multipart).await?;
    let pdf_filename = form.text("pdf_filename").unwrap_or_default();

    let pdf_path = state.chat.resolve_pdf(pdf_filename).await?;

    let audio = form
        .file("audio_file")
        .ok_or_else(|| ApiError::bad_request("no audio file part"))?;
    if audio.filename.is_empty() {
        return Err(ApiError::bad_request("no audio file selected"));
    }

    let exchange = state.chat.converse(pdf_filename, &pdf_path, &audio.bytes).await?;
    info!(pdf = %exchange.pdf_filename, answer = %exchange.ai_audio, "Chat exchange complete");

    Ok(Json(ChatResponse {
        tts_audio_url: exchange.tts_audio_url(),
        response_text: exchange.response_text,
    }))
}

pub async fn list_pdfs(State(state): State<AppState>) -> Result<Json<PdfListResponse>, ApiError> {
    let pdfs = state.uploads.list_pdfs().await?;
    Ok(Json(PdfListResponse { pdfs }))
}
