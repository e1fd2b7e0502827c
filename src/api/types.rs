//! Response bodies for the HTTP API.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UploadPdfResponse {
    pub message: String,
    pub filename: String,
    pub cloud_filename: String,
}

#[derive(Debug, Serialize)]
pub struct UploadAudioResponse {
    pub message: String,
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response_text: String,
    pub tts_audio_url: String,
}

#[derive(Debug, Serialize)]
pub struct PdfListResponse {
    pub pdfs: Vec<String>,
}
