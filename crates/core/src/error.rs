//! Error types for the QuizForge domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum. Run-level terminal
//! failures are a separate value type ([`RunFailure`]) because a finished
//! run is not an `Err` — the outcome lives on the run itself.

use thiserror::Error;

/// The top-level error type for all QuizForge operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Directive protocol errors ---
    #[error("Directive error: {0}")]
    Directive(#[from] DirectiveError),

    // --- Materialization errors ---
    #[error("Materialization error: {0}")]
    Materialize(#[from] MaterializeError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Provider returned an empty reply")]
    EmptyReply,

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures from parsing a single model reply into a directive.
#[derive(Debug, Clone, Error)]
pub enum DirectiveError {
    #[error("Reply matched neither the tool-call nor the terminal marker: {preview}")]
    UnrecognizedReply { preview: String },

    #[error("Malformed tool call (missing '|' separator): {line}")]
    MalformedCall { line: String },
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments for {tool_name}: {reason} (raw: {raw_args})")]
    InvalidArguments {
        tool_name: String,
        raw_args: String,
        reason: String,
    },

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum MaterializeError {
    #[error("Terminal payload failed {schema} validation: {reason}\nraw payload: {raw}")]
    InvalidPayload {
        schema: String,
        reason: String,
        raw: String,
    },
}

/// Why a run ended in the `Failed` terminal state.
///
/// Every variant carries the diagnostic context the caller needs —
/// tool name, raw arguments, offending text — never a bare failure.
#[derive(Debug, Clone, Error)]
pub enum RunFailure {
    #[error("protocol violation: {0}")]
    ProtocolViolation(DirectiveError),

    #[error("unknown tool '{name}' (raw args: {raw_args})")]
    UnknownTool { name: String, raw_args: String },

    #[error("argument decode failed for '{tool_name}': {reason} (raw args: {raw_args})")]
    ArgumentDecode {
        tool_name: String,
        raw_args: String,
        reason: String,
    },

    #[error("tool '{tool_name}' execution failed: {reason}")]
    ToolExecution { tool_name: String, reason: String },

    #[error("materialization failed: {0}")]
    Materialization(MaterializeError),

    #[error("model call failed: {0}")]
    Provider(ProviderError),

    #[error("model call timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

impl RunFailure {
    /// Map a tool dispatch error into the run-level failure taxonomy.
    pub fn from_tool_error(err: ToolError, raw_args: &str) -> Self {
        match err {
            ToolError::NotFound(name) => RunFailure::UnknownTool {
                name,
                raw_args: raw_args.to_string(),
            },
            ToolError::InvalidArguments {
                tool_name,
                raw_args,
                reason,
            } => RunFailure::ArgumentDecode {
                tool_name,
                raw_args,
                reason,
            },
            ToolError::ExecutionFailed { tool_name, reason } => {
                RunFailure::ToolExecution { tool_name, reason }
            }
        }
    }
}
