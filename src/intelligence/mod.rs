//! Conversation intelligence for ChatVault
//!
//! Derives summaries, topics, sentiment, and key points from transcripts
//! via prompted LLM calls, scores conversations against keyword queries,
//! and answers natural-language questions across past conversations.

pub mod analyzer;
pub mod parse;
pub mod search;

pub use analyzer::{
    analyze_sentiment, extract_key_points, extract_topics, generate_summary,
    query_conversations, QueryOutcome,
};
pub use search::rank_conversations;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single transcript entry as seen by the intelligence operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    /// Who wrote the message ("user" or "ai")
    pub sender: String,
    /// Message text
    pub content: String,
}

impl TranscriptMessage {
    pub fn new(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
        }
    }
}

/// Intelligence-side view of a stored conversation
///
/// Built by the HTTP layer from storage rows; carries everything the
/// ranking and cross-conversation query operations need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationContext {
    pub id: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub topics: Vec<String>,
    pub start_timestamp: DateTime<Utc>,
    pub messages: Vec<TranscriptMessage>,
}

/// Serialize a transcript into a flat `sender: content` block
pub(crate) fn transcript_text(messages: &[TranscriptMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.sender, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}
