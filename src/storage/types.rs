use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a conversation
///
/// Conversations start active and transition to ended exactly once; the
/// transition is irreversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Ended,
}

impl ConversationStatus {
    /// String form stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Ended => "ended",
        }
    }

    /// Parse the stored string form
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "ended" => Some(Self::Ended),
            _ => None,
        }
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    /// String form stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ai => "ai",
        }
    }

    /// Parse the stored string form
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "ai" => Some(Self::Ai),
            _ => None,
        }
    }
}

/// A stored conversation
///
/// The derived fields (summary, topics, key_points, sentiment) stay empty
/// until the conversation is ended, at which point they are written once.
/// The embedding column is reserved and never populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// User-facing title; auto-generated on the first exchange when absent
    pub title: Option<String>,
    /// Lifecycle state
    pub status: ConversationStatus,
    /// When the conversation started
    pub start_timestamp: DateTime<Utc>,
    /// When the conversation ended; set only at termination
    pub end_timestamp: Option<DateTime<Utc>>,
    /// Derived summary text
    pub summary: Option<String>,
    /// Derived topic list
    pub topics: Vec<String>,
    /// Derived key points
    pub key_points: Vec<String>,
    /// Derived sentiment (positive, negative, neutral)
    pub sentiment: Option<String>,
    /// Reserved embedding payload; never written by any operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<serde_json::Value>,
    /// Record creation time
    pub created_at: DateTime<Utc>,
    /// Record modification time
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Duration in seconds between start and end, when ended
    pub fn duration_seconds(&self) -> Option<i64> {
        self.end_timestamp
            .map(|end| (end - self.start_timestamp).num_seconds())
    }
}

/// A single message within a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Owning conversation
    pub conversation_id: String,
    /// Message text
    pub content: String,
    /// Author of the message
    pub sender: Sender,
    /// When the message was sent
    pub timestamp: DateTime<Utc>,
    /// Tokens used to produce this message, when reported (AI messages only)
    pub tokens_used: Option<u32>,
    /// Model that produced this message (AI messages only)
    pub model_used: Option<String>,
    /// Record creation time
    pub created_at: DateTime<Utc>,
}
