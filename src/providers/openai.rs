//! OpenAI provider implementation for ChatVault
//!
//! This module implements the Provider trait for the OpenAI chat
//! completions API. The wire structures are shared crate-internally with
//! the LM Studio provider, which speaks the same protocol.

use crate::config::OpenAiConfig;
use crate::error::{ChatVaultError, Result};
use crate::providers::{ChatMessage, Completion, Provider};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default OpenAI API base URL
const OPENAI_API_BASE: &str = "https://api.openai.com";

/// Request timeout for chat completions
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Sampling temperature sent on every request
pub(crate) const TEMPERATURE: f64 = 0.7;

/// Completion token cap sent on every request
pub(crate) const MAX_TOKENS: u32 = 1000;

/// OpenAI API provider
///
/// Connects to the OpenAI chat completions endpoint with Bearer
/// authentication. The API base can be overridden for tests.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

/// Request structure for the chat completions API
#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub stream: bool,
}

/// Message structure on the wire
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireMessage {
    pub role: String,
    pub content: String,
}

impl From<&ChatMessage> for WireMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.clone(),
            content: msg.content.clone(),
        }
    }
}

/// Response structure from the chat completions API
#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// A single completion choice
#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: WireMessage,
}

/// Token usage block
#[derive(Debug, Deserialize)]
pub(crate) struct Usage {
    pub total_tokens: u32,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider instance
    ///
    /// # Arguments
    ///
    /// * `config` - OpenAI configuration containing api key and model
    ///
    /// # Returns
    ///
    /// Returns a new OpenAiProvider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("chatvault/0.2.0")
            .build()
            .map_err(|e| {
                ChatVaultError::Provider(format!("Failed to create HTTP client: {}", e))
            })?;

        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| OPENAI_API_BASE.to_string());

        tracing::info!(
            "Initialized OpenAI provider: base={}, model={}",
            api_base,
            config.model
        );

        Ok(Self {
            client,
            api_key: config.api_key,
            api_base,
            model: config.model,
        })
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Completion> {
        let url = format!("{}/v1/chat/completions", self.api_base);
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: messages.iter().map(WireMessage::from).collect(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stream: false,
        };

        tracing::debug!(
            "Sending {} messages to OpenAI model {}",
            messages.len(),
            self.model
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ChatVaultError::Provider(format!("Failed to connect to OpenAI: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("OpenAI returned error {}: {}", status, error_text);
            return Err(ChatVaultError::Provider(format!(
                "OpenAI returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            ChatVaultError::Provider(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let choice = completion.choices.into_iter().next().ok_or_else(|| {
            ChatVaultError::Provider("OpenAI response contained no choices".to_string())
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
