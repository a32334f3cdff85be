//! Google Gemini provider implementation for ChatVault
//!
//! This module implements the Provider trait for the Gemini
//! generateContent API. The transcript is flattened into a single prompt
//! string because the conversations here carry a system preamble the
//! v1beta endpoint has no slot for. Gemini does not report token usage
//! through this endpoint.

use crate::config::GeminiConfig;
use crate::error::{ChatVaultError, Result};
use crate::providers::{ChatMessage, Completion, Provider};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Gemini API base URL
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Gemini API provider
///
/// Connects to the generateContent endpoint with the API key passed as a
/// query parameter. The API base can be overridden for tests.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

/// Request structure for generateContent
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

/// Content block carrying the flattened prompt
#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

/// A single text part
#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

/// Response structure from generateContent
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

/// A single candidate answer
#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

/// Candidate content with its text parts
#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<Part>,
}

impl GeminiProvider {
    /// Create a new Gemini provider instance
    ///
    /// # Arguments
    ///
    /// * `config` - Gemini configuration containing api key and model
    ///
    /// # Returns
    ///
    /// Returns a new GeminiProvider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: GeminiConfig) -> Result<Self> {
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
            .unwrap_or_else(|| GEMINI_API_BASE.to_string());

        tracing::info!(
            "Initialized Gemini provider: base={}, model={}",
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

    /// Flatten the transcript into one `role: content` block per line
    fn flatten_prompt(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Completion> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        );
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Self::flatten_prompt(messages),
                }],
            }],
        };

        tracing::debug!(
            "Sending {} messages to Gemini model {}",
            messages.len(),
            self.model
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ChatVaultError::Provider(format!("Failed to connect to Gemini: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(ChatVaultError::Provider(format!(
                "Gemini returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let completion: GenerateContentResponse = response.json().await.map_err(|e| {
            ChatVaultError::Provider(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text = completion
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| {
                ChatVaultError::Provider("Gemini response contained no candidates".to_string())
            })?;

        // Token usage is not reported by this endpoint
        Ok(Completion {
            text,
            tokens_used: None,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
