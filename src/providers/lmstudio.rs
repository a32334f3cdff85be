//! LM Studio provider implementation for ChatVault
//!
//! LM Studio serves an OpenAI-compatible API from a local server, so this
//! provider reuses the OpenAI wire structures. The base URL already carries
//! the `/v1` path segment and no real API key is required.

use crate::config::LmStudioConfig;
use crate::error::{ChatVaultError, Result};
use crate::providers::openai::{
    ChatCompletionRequest, ChatCompletionResponse, WireMessage, MAX_TOKENS, REQUEST_TIMEOUT,
    TEMPERATURE,
};
use crate::providers::{ChatMessage, Completion, Provider};

use async_trait::async_trait;
use reqwest::Client;

/// Placeholder API key accepted by LM Studio
const LMSTUDIO_API_KEY: &str = "lm-studio";

/// LM Studio provider
///
/// Connects to a local LM Studio server. The model field identifies the
/// loaded local model for reporting; LM Studio serves whatever model is
/// loaded regardless of the value sent.
pub struct LmStudioProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl LmStudioProvider {
    /// Create a new LM Studio provider instance
    ///
    /// # Arguments
    ///
    /// * `config` - LM Studio configuration containing base URL and model
    ///
    /// # Returns
    ///
    /// Returns a new LmStudioProvider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: LmStudioConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("chatvault/0.2.0")
            .build()
            .map_err(|e| {
                ChatVaultError::Provider(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::info!(
            "Initialized LM Studio provider: base={}, model={}",
            config.base_url,
            config.model
        );

        Ok(Self {
            client,
            base_url: config.base_url,
            model: config.model,
        })
    }
}

#[async_trait]
impl Provider for LmStudioProvider {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Completion> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: messages.iter().map(WireMessage::from).collect(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stream: false,
        };

        tracing::debug!("Sending {} messages to LM Studio", messages.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(LMSTUDIO_API_KEY)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ChatVaultError::Provider(format!("Failed to connect to LM Studio: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("LM Studio returned error {}: {}", status, error_text);
            return Err(ChatVaultError::Provider(format!(
                "LM Studio returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            ChatVaultError::Provider(format!("Failed to parse LM Studio response: {}", e))
        })?;

        let choice = completion.choices.into_iter().next().ok_or_else(|| {
            ChatVaultError::Provider("LM Studio response contained no choices".to_string())
        })?;

        Ok(Completion {
            text: choice.message.content,
            tokens_used: completion.usage.map(|u| u.total_tokens),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
