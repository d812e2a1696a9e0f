//! Configuration loading, validation, and management for QuizForge.
//!
//! Loads configuration from `~/.quizforge/config.toml` with environment
//! variable overrides. Validates all settings at load time.

use quizforge_core::DirectiveFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.quizforge/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API key. Falls back to the environment when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model name (normalized to a `models/` path by the provider).
    #[serde(default = "default_model")]
    pub model: String,

    /// Hard upper bound on model calls per run. The only protection
    /// against runaway cost, so it is validated to 1..=10 and never
    /// bypassed by the loop.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Per-model-call timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound on flash cards accepted from a terminal payload;
    /// extra items are discarded in input order.
    #[serde(default = "default_max_flashcards")]
    pub max_flashcards: usize,

    /// Directive marker spelling.
    #[serde(default)]
    pub directives: DirectiveConfig,

    /// Audit trail settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

fn default_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_max_iterations() -> u32 {
    3
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_max_flashcards() -> usize {
    10
}

/// Directive protocol marker spelling (structure is fixed, spelling is not).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectiveConfig {
    #[serde(default = "default_call_prefix")]
    pub call_prefix: String,

    #[serde(default = "default_final_prefixes")]
    pub final_prefixes: Vec<String>,
}

fn default_call_prefix() -> String {
    "FUNCTION_CALL:".into()
}
fn default_final_prefixes() -> Vec<String> {
    vec!["FINAL_ANSWER:".into(), "FINAL_JSON:".into()]
}

impl Default for DirectiveConfig {
    fn default() -> Self {
        Self {
            call_prefix: default_call_prefix(),
            final_prefixes: default_final_prefixes(),
        }
    }
}

impl DirectiveConfig {
    /// Build the parser-side format from this configuration.
    pub fn to_format(&self) -> DirectiveFormat {
        DirectiveFormat {
            call_prefix: self.call_prefix.clone(),
            final_prefixes: self.final_prefixes.clone(),
        }
    }
}

/// Append-only audit trail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Whether to record run outcomes at all.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,

    /// Audit log path. Defaults to `~/.quizforge/runs.jsonl`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_audit_enabled() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// The effective audit log path.
    pub fn effective_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("runs.jsonl"))
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("max_iterations", &self.max_iterations)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_flashcards", &self.max_flashcards)
            .field("directives", &self.directives)
            .field("audit", &self.audit)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path with env overrides.
    ///
    /// Env overrides (highest priority last): `QUIZFORGE_API_KEY`,
    /// then `GEMINI_API_KEY`; `QUIZFORGE_MODEL` for the model name.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("QUIZFORGE_API_KEY")
                .ok()
                .or_else(|| std::env::var("GEMINI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("QUIZFORGE_MODEL") {
            config.model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".quizforge")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=10).contains(&self.max_iterations) {
            return Err(ConfigError::ValidationError(
                "max_iterations must be between 1 and 10".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be at least 1".into(),
            ));
        }

        if self.max_flashcards == 0 {
            return Err(ConfigError::ValidationError(
                "max_flashcards must be at least 1".into(),
            ));
        }

        if self.directives.call_prefix.trim().is_empty()
            || self.directives.final_prefixes.iter().any(|p| p.trim().is_empty())
        {
            return Err(ConfigError::ValidationError(
                "directive markers may not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_iterations: default_max_iterations(),
            request_timeout_secs: default_request_timeout_secs(),
            max_flashcards: default_max_flashcards(),
            directives: DirectiveConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
