//! AI provider implementations for ChatVault
//!
//! This module contains the Provider trait, the four provider bindings
//! (OpenAI, Anthropic, Gemini, LM Studio), and the factory function that
//! selects one at startup from configuration.

pub mod anthropic;
pub mod base;
pub mod gemini;
pub mod lmstudio;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use base::{ChatClient, ChatMessage, ChatReply, Completion, Provider};
pub use gemini::GeminiProvider;
pub use lmstudio::LmStudioProvider;
pub use openai::OpenAiProvider;

use crate::config::ProviderConfig;
use crate::error::{ChatVaultError, Result};

/// Create a provider instance based on configuration
///
/// # Arguments
///
/// * `provider_type` - One of "openai", "anthropic", "gemini", "lmstudio"
/// * `config` - Provider configuration carrying per-provider settings
///
/// # Returns
///
/// Returns a boxed provider instance
///
/// # Errors
///
/// Returns error if the provider type is unknown or initialization fails
pub fn create_provider(provider_type: &str, config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    match provider_type {
        "openai" => {
            let provider = OpenAiProvider::new(config.openai.clone())?;
            Ok(Box::new(provider))
        }
        "anthropic" => {
            let provider = AnthropicProvider::new(config.anthropic.clone())?;
            Ok(Box::new(provider))
        }
        "gemini" => {
            let provider = GeminiProvider::new(config.gemini.clone())?;
            Ok(Box::new(provider))
        }
        "lmstudio" => {
            let provider = LmStudioProvider::new(config.lmstudio.clone())?;
            Ok(Box::new(provider))
        }
        unknown => Err(ChatVaultError::Config(format!(
            "Unknown provider type: {}. Must be one of: openai, anthropic, gemini, lmstudio",
            unknown
        ))
        .into()),
    }
}
