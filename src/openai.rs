//! OpenAI client configuration.

use crate::http::build_client;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create an OpenAI client with a custom timeout.
///
/// The API key is read from `OPENAI_API_KEY` by `OpenAIConfig`.
pub fn create_client_with_timeout(timeout: Duration) -> reqwest::Result<Client<OpenAIConfig>> {
    let http_client = build_client(timeout)?;
    Ok(Client::with_config(OpenAIConfig::default()).with_http_client(http_client))
}
