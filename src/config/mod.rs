//! Configuration module for Voxdoc.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, QaPrompts};
pub use settings::{
    AudioSettings, BucketProvider, BucketSettings, CachePolicy, GeneralSettings, PromptSettings,
    QaSettings, ServerSettings, Settings, SpeechProvider, SpeechSettings, StorageSettings,
};
