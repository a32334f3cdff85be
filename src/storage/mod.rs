//! SQLite persistence for conversations and messages
//!
//! Conversations and their messages live in two tables with a cascading
//! foreign key. Timestamps are stored as RFC 3339 text and list-valued
//! derived fields (topics, key points) as JSON columns.

use crate::error::{ChatVaultError, Result};
use anyhow::Context;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use uuid::Uuid;

pub mod types;
pub use types::{Conversation, ConversationStatus, Message, Sender};

/// Storage backend for conversations
pub struct SqliteStorage {
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Create a new storage instance
    ///
    /// Initializes the database file in the user's data directory.
    pub fn new() -> Result<Self> {
        // Allow override of the DB path via environment variable so the
        // binary can be pointed at a test or alternate file without
        // changing the user's application data dir.
        if let Ok(override_path) = std::env::var("CHATVAULT_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "chatvault", "chatvault")
            .ok_or_else(|| ChatVaultError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        let db_path = data_dir.join("chatvault.db");
        let storage = Self { db_path };

        storage.init()?;

        Ok(storage)
    }

    /// Create a new storage instance that uses the specified database path.
    ///
    /// This is primarily useful for tests where the default application data
    /// directory is not desirable (for example, using a temporary directory).
    ///
    /// # Examples
    ///
    /// ```
    /// use chatvault::storage::SqliteStorage;
    ///
    /// let storage = SqliteStorage::new_with_path("/tmp/test_chatvault.db").unwrap();
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure parent directory exists so opening the DB file succeeds.
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| ChatVaultError::Storage(e.to_string()))?;
        }

        let storage = Self { db_path };
        storage.init()?;
        Ok(storage)
    }

    /// Open a connection with foreign keys enforced
    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        conn.pragma_update(None, "foreign_keys", "ON")
            .context("Failed to enable foreign keys")
            .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        Ok(conn)
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                title TEXT,
                status TEXT NOT NULL DEFAULT 'active',
                start_timestamp TEXT NOT NULL,
                end_timestamp TEXT,
                summary TEXT,
                topics JSON NOT NULL DEFAULT '[]',
                key_points JSON NOT NULL DEFAULT '[]',
                sentiment TEXT,
                embedding JSON,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create conversations table")
        .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL
                    REFERENCES conversations(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                sender TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                tokens_used INTEGER,
                model_used TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create messages table")
        .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_messages_conversation
             ON messages(conversation_id)",
            [],
        )
        .context("Failed to create message index")
        .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Create a new active conversation
    pub fn create_conversation(&self, title: Option<&str>) -> Result<Conversation> {
        let conn = self.open()?;
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO conversations
                (id, title, status, start_timestamp, created_at, updated_at)
             VALUES (?, ?, 'active', ?, ?, ?)",
            params![
                id,
                title,
                now.to_rfc3339(),
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        )
        .context("Failed to insert conversation")
        .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        tracing::debug!("Created conversation {}", id);

        Ok(Conversation {
            id,
            title: title.map(|t| t.to_string()),
            status: ConversationStatus::Active,
            start_timestamp: now,
            end_timestamp: None,
            summary: None,
            topics: Vec::new(),
            key_points: Vec::new(),
            sentiment: None,
            embedding: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Load a conversation by ID
    pub fn get_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        let conn = self.open()?;

        conn.query_row(
            &format!("SELECT {} FROM conversations WHERE id = ?", CONVERSATION_COLUMNS),
            params![id],
            conversation_from_row,
        )
        .optional()
        .context("Failed to query conversation")
        .map_err(|e| ChatVaultError::Storage(e.to_string()).into())
    }

    /// List conversations, newest first
    ///
    /// # Arguments
    ///
    /// * `status` - Optional status filter
    /// * `search` - Optional case-insensitive substring match on title or summary
    pub fn list_conversations(
        &self,
        status: Option<ConversationStatus>,
        search: Option<&str>,
    ) -> Result<Vec<Conversation>> {
        let conn = self.open()?;

        let mut conditions: Vec<&str> = Vec::new();
        let mut sql_params: Vec<String> = Vec::new();

        if let Some(status) = status {
            conditions.push("status = ?");
            sql_params.push(status.as_str().to_string());
        }

        if let Some(search) = search {
            conditions.push(
                "(LOWER(COALESCE(title, '')) LIKE ? OR LOWER(COALESCE(summary, '')) LIKE ?)",
            );
            let pattern = format!("%{}%", search.to_lowercase());
            sql_params.push(pattern.clone());
            sql_params.push(pattern);
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {} FROM conversations{} ORDER BY start_timestamp DESC",
            CONVERSATION_COLUMNS, where_clause
        );

        let mut stmt = conn
            .prepare(&sql)
            .context("Failed to prepare statement")
            .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map(params_from_iter(sql_params.iter()), conversation_from_row)
            .context("Failed to query conversations")
            .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        Ok(rows.flatten().collect())
    }

    /// List ended conversations whose start time falls in the given range
    pub fn list_ended_between(
        &self,
        date_from: Option<DateTime<Utc>>,
        date_to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Conversation>> {
        let conn = self.open()?;

        let mut conditions = vec!["status = 'ended'".to_string()];
        let mut sql_params: Vec<String> = Vec::new();

        if let Some(from) = date_from {
            conditions.push("start_timestamp >= ?".to_string());
            sql_params.push(from.to_rfc3339());
        }

        if let Some(to) = date_to {
            conditions.push("start_timestamp <= ?".to_string());
            sql_params.push(to.to_rfc3339());
        }

        let sql = format!(
            "SELECT {} FROM conversations WHERE {} ORDER BY start_timestamp DESC",
            CONVERSATION_COLUMNS,
            conditions.join(" AND ")
        );

        let mut stmt = conn
            .prepare(&sql)
            .context("Failed to prepare statement")
            .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map(params_from_iter(sql_params.iter()), conversation_from_row)
            .context("Failed to query ended conversations")
            .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        Ok(rows.flatten().collect())
    }

    /// Append a message to a conversation and bump its updated_at
    pub fn append_message(
        &self,
        conversation_id: &str,
        content: &str,
        sender: Sender,
        tokens_used: Option<u32>,
        model_used: Option<&str>,
    ) -> Result<Message> {
        let conn = self.open()?;
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO messages
                (id, conversation_id, content, sender, timestamp, tokens_used, model_used, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                conversation_id,
                content,
                sender.as_str(),
                now.to_rfc3339(),
                tokens_used,
                model_used,
                now.to_rfc3339()
            ],
        )
        .context("Failed to insert message")
        .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        conn.execute(
            "UPDATE conversations SET updated_at = ? WHERE id = ?",
            params![now.to_rfc3339(), conversation_id],
        )
        .context("Failed to bump conversation")
        .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        Ok(Message {
            id,
            conversation_id: conversation_id.to_string(),
            content: content.to_string(),
            sender,
            timestamp: now,
            tokens_used,
            model_used: model_used.map(|m| m.to_string()),
            created_at: now,
        })
    }

    /// All messages for a conversation in insertion order
    pub fn messages_for(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let conn = self.open()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, conversation_id, content, sender, timestamp,
                        tokens_used, model_used, created_at
                 FROM messages
                 WHERE conversation_id = ?
                 ORDER BY rowid ASC",
            )
            .context("Failed to prepare statement")
            .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map(params![conversation_id], message_from_row)
            .context("Failed to query messages")
            .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        Ok(rows.flatten().collect())
    }

    /// Number of messages in a conversation
    pub fn count_messages(&self, conversation_id: &str) -> Result<usize> {
        let conn = self.open()?;

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM messages WHERE conversation_id = ?",
                params![conversation_id],
                |row| row.get(0),
            )
            .context("Failed to count messages")
            .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        Ok(count as usize)
    }

    /// Set the title of a conversation
    pub fn set_title(&self, conversation_id: &str, title: &str) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "UPDATE conversations SET title = ?, updated_at = ? WHERE id = ?",
            params![title, Utc::now().to_rfc3339(), conversation_id],
        )
        .context("Failed to set title")
        .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        Ok(())
    }

    /// End a conversation, writing all derived fields in one update
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no conversation has the given id.
    pub fn finalize_conversation(
        &self,
        conversation_id: &str,
        summary: &str,
        topics: &[String],
        key_points: &[String],
        sentiment: &str,
    ) -> Result<()> {
        let conn = self.open()?;
        let now = Utc::now();

        let topics_json = serde_json::to_string(topics)
            .context("Failed to serialize topics")
            .map_err(|e| ChatVaultError::Storage(e.to_string()))?;
        let key_points_json = serde_json::to_string(key_points)
            .context("Failed to serialize key points")
            .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        let changed = conn
            .execute(
                "UPDATE conversations SET
                    status = 'ended',
                    end_timestamp = ?,
                    summary = ?,
                    topics = ?,
                    key_points = ?,
                    sentiment = ?,
                    updated_at = ?
                 WHERE id = ?",
                params![
                    now.to_rfc3339(),
                    summary,
                    topics_json,
                    key_points_json,
                    sentiment,
                    now.to_rfc3339(),
                    conversation_id
                ],
            )
            .context("Failed to finalize conversation")
            .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        if changed == 0 {
            return Err(ChatVaultError::NotFound(conversation_id.to_string()).into());
        }

        tracing::debug!("Finalized conversation {}", conversation_id);
        Ok(())
    }

    /// Delete a conversation; messages cascade
    pub fn delete_conversation(&self, id: &str) -> Result<()> {
        let conn = self.open()?;

        conn.execute("DELETE FROM conversations WHERE id = ?", params![id])
            .context("Failed to delete conversation")
            .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Delete all conversations and their messages
    pub fn delete_all_conversations(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute("DELETE FROM conversations", [])
            .context("Failed to clear conversations")
            .map_err(|e| ChatVaultError::Storage(e.to_string()))?;

        Ok(())
    }
}

/// Column list matching `conversation_from_row`
const CONVERSATION_COLUMNS: &str = "id, title, status, start_timestamp, end_timestamp, \
     summary, topics, key_points, sentiment, embedding, created_at, updated_at";

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn conversation_from_row(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    let status_str: String = row.get(2)?;
    let start_str: String = row.get(3)?;
    let end_str: Option<String> = row.get(4)?;
    let topics_json: String = row.get(6)?;
    let key_points_json: String = row.get(7)?;
    let embedding_json: Option<String> = row.get(9)?;
    let created_str: String = row.get(10)?;
    let updated_str: String = row.get(11)?;

    Ok(Conversation {
        id: row.get(0)?,
        title: row.get(1)?,
        status: ConversationStatus::parse(&status_str).unwrap_or(ConversationStatus::Active),
        start_timestamp: parse_timestamp(&start_str),
        end_timestamp: end_str.map(|s| parse_timestamp(&s)),
        summary: row.get(5)?,
        topics: serde_json::from_str(&topics_json).unwrap_or_default(),
        key_points: serde_json::from_str(&key_points_json).unwrap_or_default(),
        sentiment: row.get(8)?,
        embedding: embedding_json.and_then(|s| serde_json::from_str(&s).ok()),
        created_at: parse_timestamp(&created_str),
        updated_at: parse_timestamp(&updated_str),
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    let sender_str: String = row.get(3)?;
    let timestamp_str: String = row.get(4)?;
    let created_str: String = row.get(7)?;

    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        content: row.get(2)?,
        sender: Sender::parse(&sender_str).unwrap_or(Sender::User),
        timestamp: parse_timestamp(&timestamp_str),
        tokens_used: row.get(5)?,
        model_used: row.get(6)?,
        created_at: parse_timestamp(&created_str),
    })
}
