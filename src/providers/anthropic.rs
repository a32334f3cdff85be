//! Anthropic provider implementation for ChatVault
//!
//! This module implements the Provider trait for the Anthropic Messages
//! API. Unlike the OpenAI-style APIs, the system prompt travels as a
//! top-level field rather than as a message, and authentication uses the
//! `x-api-key` header with a pinned `anthropic-version`.

use crate::config::AnthropicConfig;
use crate::error::{ChatVaultError, Result};
use crate::providers::{ChatMessage, Completion, Provider};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Anthropic API base URL
const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";

/// API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Completion token cap sent on every request
const MAX_TOKENS: u32 = 1000;

/// Anthropic API provider
///
/// Connects to the Anthropic Messages endpoint. The API base can be
/// overridden for tests.
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

/// Request structure for the Messages API
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
}

/// Message structure on the wire (user/assistant only)
#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

/// Response structure from the Messages API
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

/// A single content block in the response
#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: String,
}

/// Token usage block; Anthropic reports input and output separately
#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider instance
    ///
    /// # Arguments
    ///
    /// * `config` - Anthropic configuration containing api key and model
    ///
    /// # Returns
    ///
    /// Returns a new AnthropicProvider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("chatvault/0.2.0")
            .build()
            .map_err(|e| {
                ChatVaultError::Provider(format!("Failed to create HTTP client: {}", e))
            })?;

        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| ANTHROPIC_API_BASE.to_string());

        tracing::info!(
            "Initialized Anthropic provider: base={}, model={}",
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

    /// Split a transcript into the out-of-band system prompt and the
    /// remaining user/assistant messages
    fn split_system(messages: &[ChatMessage]) -> (Option<String>, Vec<AnthropicMessage>) {
        let mut system: Option<String> = None;
        let mut rest = Vec::with_capacity(messages.len());

        for msg in messages {
            if msg.role == "system" {
                // Multiple system messages are concatenated in order
                match system.as_mut() {
                    Some(existing) => {
                        existing.push('\n');
                        existing.push_str(&msg.content);
                    }
                    None => system = Some(msg.content.clone()),
                }
            } else {
                rest.push(AnthropicMessage {
                    role: msg.role.clone(),
                    content: msg.content.clone(),
                });
            }
        }

        (system, rest)
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Completion> {
        let url = format!("{}/v1/messages", self.api_base);
        let (system, wire_messages) = Self::split_system(messages);
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system,
            messages: wire_messages,
        };

        tracing::debug!(
            "Sending {} messages to Anthropic model {}",
            messages.len(),
            self.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ChatVaultError::Provider(format!("Failed to connect to Anthropic: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Anthropic returned error {}: {}", status, error_text);
            return Err(ChatVaultError::Provider(format!(
                "Anthropic returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let completion: MessagesResponse = response.json().await.map_err(|e| {
            ChatVaultError::Provider(format!("Failed to parse Anthropic response: {}", e))
        })?;

        let block = completion.content.into_iter().next().ok_or_else(|| {
            ChatVaultError::Provider("Anthropic response contained no content".to_string())
        })?;

        Ok(Completion {
            text: block.text,
            tokens_used: completion
                .usage
                .map(|u| u.input_tokens + u.output_tokens),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
