//! Ask command implementation.

use crate::chat::ChatService;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::storage::{BucketClient, LocalStore};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Run the ask command.
pub async fn run_ask(pdf_filename: &str, audio: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'voxdoc doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let audio_path = Settings::expand_path(audio);
    let audio_bytes = tokio::fs::read(&audio_path)
        .await
        .with_context(|| format!("Failed to read {}", audio_path.display()))?;

    let store = LocalStore::new(settings.upload_dir())?;
    let bucket = Arc::new(BucketClient::from_settings(&settings)?);
    let chat = ChatService::from_settings(&settings, store.clone(), bucket)?;

    let spinner = Output::spinner(&format!("Asking about {}...", pdf_filename));

    match chat.ask(pdf_filename, &audio_bytes).await {
        Ok(exchange) => {
            spinner.finish_and_clear();
            Output::answer(&exchange.response_text, &store.audio_path(&exchange.ai_audio));
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
