//! ChatVault - Conversation storage backend with LLM-assisted intelligence
//!
//! This library provides the core functionality for the ChatVault backend,
//! including conversation persistence, AI provider abstractions, transcript
//! intelligence, and the HTTP API.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `providers`: AI provider abstraction and implementations (OpenAI,
//!   Anthropic, Gemini, LM Studio) plus the error-normalizing ChatClient
//! - `storage`: SQLite persistence for conversations and messages
//! - `intelligence`: summary/topic/sentiment/key-point derivation, keyword
//!   relevance ranking, and cross-conversation querying
//! - `server`: axum HTTP API
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `seed`: sample data for demos
//!
//! # Example
//!
//! ```no_run
//! use chatvault::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     // Server startup would go here
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod intelligence;
pub mod providers;
pub mod seed;
pub mod server;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{ChatVaultError, Result};
pub use providers::{ChatClient, ChatMessage, ChatReply, Provider};
pub use storage::SqliteStorage;
