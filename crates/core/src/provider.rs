//! Provider trait — the abstraction over the model collaborator.
//!
//! The orchestration loop's contract with the model is intentionally thin:
//! a prompt string goes in, a reply string comes out (or the call fails).
//! Retries and backoff are the implementation's concern, never the loop's.

use async_trait::async_trait;

use crate::error::ProviderError;

/// The model collaborator.
///
/// Implementations must be safe to share read-only across concurrent runs:
/// a provider carries no per-run state, so one instance (behind an `Arc`)
/// can serve many loops at once.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a prompt and return the full reply text.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, ProviderError>;
}
