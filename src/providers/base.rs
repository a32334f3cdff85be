//! Base provider trait and common types for ChatVault
//!
//! This module defines the Provider trait that all AI providers must
//! implement, the shared chat message shape, and the ChatClient adapter
//! that normalizes success and failure into one reply structure.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message structure for conversation
///
/// Represents a message exchanged with an AI provider. The role is one of
/// "system", "user", or "assistant".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Creates a new system message
    ///
    /// # Arguments
    ///
    /// * `content` - The message content
    ///
    /// # Examples
    ///
    /// ```
    /// use chatvault::providers::ChatMessage;
    ///
    /// let msg = ChatMessage::system("You are a helpful assistant");
    /// assert_eq!(msg.role, "system");
    /// ```
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new user message
    ///
    /// # Arguments
    ///
    /// * `content` - The message content
    ///
    /// # Examples
    ///
    /// ```
    /// use chatvault::providers::ChatMessage;
    ///
    /// let msg = ChatMessage::user("Hello, assistant!");
    /// assert_eq!(msg.role, "user");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    ///
    /// # Arguments
    ///
    /// * `content` - The message content
    ///
    /// # Examples
    ///
    /// ```
    /// use chatvault::providers::ChatMessage;
    ///
    /// let msg = ChatMessage::assistant("Hello, user!");
    /// assert_eq!(msg.role, "assistant");
    /// ```
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Completion result from a provider
///
/// Contains the response text and, when the provider reports it, the total
/// number of tokens used by the request.
#[derive(Debug, Clone)]
pub struct Completion {
    /// The response text from the AI
    pub text: String,
    /// Total tokens used, when reported by the provider
    pub tokens_used: Option<u32>,
}

impl Completion {
    /// Create a new Completion without token usage
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tokens_used: None,
        }
    }

    /// Create a new Completion with token usage
    pub fn with_tokens(text: impl Into<String>, tokens_used: u32) -> Self {
        Self {
            text: text.into(),
            tokens_used: Some(tokens_used),
        }
    }
}

/// Provider trait for AI providers
///
/// All AI providers (OpenAI, Anthropic, Gemini, LM Studio) must implement
/// this trait. The trait provides a common interface for completing
/// conversations.
///
/// # Examples
///
/// ```no_run
/// use chatvault::providers::{Provider, ChatMessage, Completion};
/// use chatvault::error::Result;
/// use async_trait::async_trait;
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl Provider for MyProvider {
///     async fn chat(&self, messages: &[ChatMessage]) -> Result<Completion> {
///         Ok(Completion::new("Response"))
///     }
///
///     fn model(&self) -> &str {
///         "my-model"
///     }
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Completes a conversation with the given messages
    ///
    /// # Arguments
    ///
    /// * `messages` - Conversation history including any system message
    ///
    /// # Returns
    ///
    /// Returns the assistant's response text with token usage when reported
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or the response is invalid
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Completion>;

    /// The model identifier this provider is configured with
    fn model(&self) -> &str;
}

/// Normalized chat reply returned by the ChatClient adapter
///
/// Failures are surfaced in-band: `error` is true and `response` carries a
/// human-readable description instead of a completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    /// Response text, or an error description when `error` is true
    pub response: String,
    /// Whether the provider call failed
    pub error: bool,
    /// Total tokens used, when reported
    pub tokens_used: Option<u32>,
    /// Model that produced (or failed to produce) the response
    pub model: String,
}

/// Adapter over a boxed provider that never propagates provider errors
///
/// Provider failures are caught and converted into a `ChatReply` carrying
/// the error text, so callers always receive a reply they can store or
/// return to a client. No retries or rate limiting.
pub struct ChatClient {
    provider: Box<dyn Provider>,
}

impl ChatClient {
    /// Create a new ChatClient wrapping the given provider
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self { provider }
    }

    /// The model identifier of the wrapped provider
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Send a conversation to the provider and normalize the outcome
    ///
    /// # Arguments
    ///
    /// * `messages` - Conversation history including any system message
    ///
    /// # Returns
    ///
    /// Returns a `ChatReply`; on provider failure the reply carries
    /// `error: true` and the error description as its response text.
    pub async fn chat(&self, messages: &[ChatMessage]) -> ChatReply {
        let model = self.provider.model().to_string();
        match self.provider.chat(messages).await {
            Ok(completion) => ChatReply {
                response: completion.text,
                error: false,
                tokens_used: completion.tokens_used,
                model,
            },
            Err(e) => {
                tracing::error!("Provider call failed: {}", e);
                ChatReply {
                    response: format!("Error communicating with AI provider: {}", e),
                    error: true,
                    tokens_used: None,
                    model,
                }
            }
        }
    }
}
