//! Pre-flight checks before commands that call remote services.
//!
//! Fails fast when an API key is missing instead of after a file has been
//! written or uploaded.

use crate::config::{Settings, SpeechProvider};
use crate::error::{Result, VoxdocError};
use crate::http::api_key_from_env;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Serving needs both the QA and the speech keys.
    Serve,
    /// A chat exchange needs both the QA and the speech keys.
    Ask,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Serve | Operation::Ask => {
            check_api_key(&settings.qa.api_key_env)?;
            check_api_key(speech_key_env(settings))?;
        }
    }
    Ok(())
}

/// Environment variable holding the key of the configured speech provider.
pub fn speech_key_env(settings: &Settings) -> &str {
    match settings.speech.provider {
        SpeechProvider::Google => &settings.speech.api_key_env,
        SpeechProvider::OpenAI => "OPENAI_API_KEY",
    }
}

fn check_api_key(var: &str) -> Result<()> {
    match api_key_from_env(var) {
        Some(_) => Ok(()),
        None => Err(VoxdocError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            var, var
        ))),
    }
}
