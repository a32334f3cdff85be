//! Command-line interface definition for ChatVault
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for running the HTTP server and seeding sample data.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ChatVault - Conversation storage backend with LLM-assisted intelligence
///
/// Stores chat conversations in SQLite and augments them with AI provider
/// calls for response generation, summarization, and search.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatvault")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the database file path
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for ChatVault
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Override the port from config
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the provider from config (openai, anthropic, gemini, lmstudio)
        #[arg(long)]
        provider: Option<String>,
    },

    /// Insert sample conversations for demos and manual testing
    Seed {
        /// Remove existing conversations before seeding
        #[arg(long)]
        fresh: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            db_path: None,
            verbose: false,
            command: Commands::Serve {
                port: None,
                provider: None,
            },
        }
    }
}
