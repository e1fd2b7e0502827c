//! Voxdoc - spoken questions about PDFs
//!
//! An HTTP server (and companion CLI) that stores uploaded PDFs locally and
//! in a cloud bucket, forwards a recorded question together with the PDF to
//! a multimodal model, and speaks the model's answer back.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `storage` - Local upload directories, the bucket client and PDF localization
//! - `qa` - Document question answering (Gemini)
//! - `speech` - Text-to-speech (Google Cloud TTS, OpenAI)
//! - `uploads` - Upload validation and storage
//! - `chat` - One question/answer exchange end to end
//! - `api` - axum router exposing the REST surface
//!
//! # Example
//!
//! ```rust,no_run
//! use voxdoc::api::{create_router, AppState};
//! use voxdoc::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let state = AppState::from_settings(&settings)?;
//!     let app = create_router(state, settings.server.max_upload_bytes());
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod openai;
pub mod qa;
pub mod speech;
pub mod storage;
pub mod uploads;

pub use error::{Result, VoxdocError};
