//! Configuration management for ChatVault
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ChatVaultError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for ChatVault
///
/// This structure holds all configuration needed for the backend,
/// including provider settings, HTTP server settings, and storage.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Provider configuration (OpenAI, Anthropic, Gemini, LM Studio)
    #[serde(default)]
    pub provider: ProviderConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Provider configuration
///
/// Specifies which AI provider to use and its settings. Exactly one
/// provider is selected at startup; the others' settings are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use ("openai", "anthropic", "gemini", "lmstudio")
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// OpenAI configuration
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Anthropic configuration
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Google Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// LM Studio configuration (OpenAI-compatible local server)
    #[serde(default)]
    pub lmstudio: LmStudioConfig,
}

fn default_provider_type() -> String {
    "openai".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            openai: OpenAiConfig::default(),
            anthropic: AnthropicConfig::default(),
            gemini: GeminiConfig::default(),
            lmstudio: LmStudioConfig::default(),
        }
    }
}

/// OpenAI provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key (prefer env var CHATVAULT_OPENAI_API_KEY)
    #[serde(default)]
    pub api_key: String,

    /// Model to use
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Optional API base URL override (useful for tests and local mocks)
    ///
    /// When set, this base is used to build the `/v1/chat/completions`
    /// endpoint, which allows tests to point the provider at a mock server.
    #[serde(default)]
    pub api_base: Option<String>,
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_openai_model(),
            api_base: None,
        }
    }
}

/// Anthropic provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    /// API key (prefer env var CHATVAULT_ANTHROPIC_API_KEY)
    #[serde(default)]
    pub api_key: String,

    /// Model to use
    #[serde(default = "default_anthropic_model")]
    pub model: String,

    /// Optional API base URL override (useful for tests and local mocks)
    #[serde(default)]
    pub api_base: Option<String>,
}

fn default_anthropic_model() -> String {
    "claude-3-sonnet-20240229".to_string()
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_anthropic_model(),
            api_base: None,
        }
    }
}

/// Google Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key (prefer env var CHATVAULT_GEMINI_API_KEY)
    #[serde(default)]
    pub api_key: String,

    /// Model to use
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Optional API base URL override (useful for tests and local mocks)
    #[serde(default)]
    pub api_base: Option<String>,
}

fn default_gemini_model() -> String {
    "gemini-pro".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
            api_base: None,
        }
    }
}

/// LM Studio provider configuration
///
/// LM Studio exposes an OpenAI-compatible API on a local server; it needs
/// a base URL but no real API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LmStudioConfig {
    /// LM Studio server base URL
    #[serde(default = "default_lmstudio_base_url")]
    pub base_url: String,

    /// Model identifier reported in responses
    #[serde(default = "default_lmstudio_model")]
    pub model: String,
}

fn default_lmstudio_base_url() -> String {
    "http://localhost:1234/v1".to_string()
}

fn default_lmstudio_model() -> String {
    "local-model".to_string()
}

impl Default for LmStudioConfig {
    fn default() -> Self {
        Self {
            base_url: default_lmstudio_base_url(),
            model: default_lmstudio_model(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_server_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Database file path (if None, the user data directory is used)
    #[serde(default)]
    pub db_path: Option<std::path::PathBuf>,
}

/// Provider identifiers accepted in configuration
pub const VALID_PROVIDERS: [&str; 4] = ["openai", "anthropic", "gemini", "lmstudio"];

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChatVaultError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ChatVaultError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        // Provider overrides
        if let Ok(provider_type) = std::env::var("CHATVAULT_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(api_key) = std::env::var("CHATVAULT_OPENAI_API_KEY") {
            self.provider.openai.api_key = api_key;
        }

        if let Ok(model) = std::env::var("CHATVAULT_OPENAI_MODEL") {
            self.provider.openai.model = model;
        }

        if let Ok(api_key) = std::env::var("CHATVAULT_ANTHROPIC_API_KEY") {
            self.provider.anthropic.api_key = api_key;
        }

        if let Ok(model) = std::env::var("CHATVAULT_ANTHROPIC_MODEL") {
            self.provider.anthropic.model = model;
        }

        if let Ok(api_key) = std::env::var("CHATVAULT_GEMINI_API_KEY") {
            self.provider.gemini.api_key = api_key;
        }

        if let Ok(model) = std::env::var("CHATVAULT_GEMINI_MODEL") {
            self.provider.gemini.model = model;
        }

        if let Ok(base_url) = std::env::var("CHATVAULT_LMSTUDIO_BASE_URL") {
            self.provider.lmstudio.base_url = base_url;
        }

        // Server overrides
        if let Ok(host) = std::env::var("CHATVAULT_SERVER_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("CHATVAULT_SERVER_PORT") {
            if let Ok(value) = port.parse() {
                self.server.port = value;
            } else {
                tracing::warn!("Invalid CHATVAULT_SERVER_PORT: {}", port);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// Ensures the selected provider is one of the known identifiers and
    /// that its credentials and URLs are usable.
    ///
    /// # Returns
    ///
    /// Returns Ok if configuration is valid
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(ChatVaultError::Config("Provider type cannot be empty".to_string()).into());
        }

        if !VALID_PROVIDERS.contains(&self.provider.provider_type.as_str()) {
            return Err(ChatVaultError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                VALID_PROVIDERS.join(", ")
            ))
            .into());
        }

        // The selected provider needs credentials; LM Studio is a local
        // server and uses a dummy key.
        match self.provider.provider_type.as_str() {
            "openai" if self.provider.openai.api_key.is_empty() => {
                return Err(ChatVaultError::Config(
                    "openai.api_key is required when provider type is openai".to_string(),
                )
                .into());
            }
            "anthropic" if self.provider.anthropic.api_key.is_empty() => {
                return Err(ChatVaultError::Config(
                    "anthropic.api_key is required when provider type is anthropic".to_string(),
                )
                .into());
            }
            "gemini" if self.provider.gemini.api_key.is_empty() => {
                return Err(ChatVaultError::Config(
                    "gemini.api_key is required when provider type is gemini".to_string(),
                )
                .into());
            }
            _ => {}
        }

        validate_base_url("openai.api_base", self.provider.openai.api_base.as_deref())?;
        validate_base_url(
            "anthropic.api_base",
            self.provider.anthropic.api_base.as_deref(),
        )?;
        validate_base_url("gemini.api_base", self.provider.gemini.api_base.as_deref())?;
        validate_base_url(
            "lmstudio.base_url",
            Some(self.provider.lmstudio.base_url.as_str()),
        )?;

        if self.server.port == 0 {
            return Err(ChatVaultError::Config("server.port must be non-zero".to_string()).into());
        }

        Ok(())
    }
}

/// Check that an optional base URL parses as an absolute URL
fn validate_base_url(field: &str, value: Option<&str>) -> Result<()> {
    if let Some(raw) = value {
        url::Url::parse(raw)
            .map_err(|e| ChatVaultError::Config(format!("Invalid {}: {}", field, e)))?;
    }
    Ok(())
}
