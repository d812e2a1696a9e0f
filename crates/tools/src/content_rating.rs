//! Content-quality rating tool (LLM-backed).
//!
//! Unlike the arithmetic tools, this one performs its own model call, so
//! from the loop's perspective it is an external collaborator. Its
//! contract is strict: any internal failure — network, empty reply — is
//! translated into `ToolError::ExecutionFailed` with the tool name and
//! cause; nothing propagates uncaught.

use async_trait::async_trait;
use quizforge_core::error::ToolError;
use quizforge_core::literal::unquote;
use quizforge_core::provider::Provider;
use quizforge_core::scalar::first_int_in_range;
use quizforge_core::tool::{Tool, ToolOutput};
use std::sync::Arc;
use tracing::debug;

const MIN_SCORE: i64 = 1;
const MAX_SCORE: i64 = 10;
/// Midpoint returned when the rating reply contains no usable integer.
const FALLBACK_SCORE: i64 = 5;

/// `rate_content_quality` — rate a paragraph of study material 1–10 via a
/// nested model call.
pub struct ContentRatingTool {
    provider: Arc<dyn Provider>,
}

impl ContentRatingTool {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    fn rating_prompt(content: &str) -> String {
        format!(
            "Rate the educational quality of the following study content on a scale \
             from {MIN_SCORE} to {MAX_SCORE}, where {MAX_SCORE} is excellent. \
             Respond with ONLY the integer rating.\n\nContent:\n{content}"
        )
    }
}

#[async_trait]
impl Tool for ContentRatingTool {
    fn name(&self) -> &str {
        "rate_content_quality"
    }

    fn signature(&self) -> &str {
        "rate_content_quality(text): rates the educational quality of the text from 1 to 10"
    }

    async fn execute(&self, raw_args: &str) -> Result<ToolOutput, ToolError> {
        let content = unquote(raw_args);
        let reply = self
            .provider
            .generate(&Self::rating_prompt(&content))
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().to_string(),
                reason: e.to_string(),
            })?;

        let score = extract_score(&reply);
        debug!(score, reply_chars = reply.len(), "content rating extracted");
        Ok(ToolOutput::new(serde_json::json!(score)))
    }
}

/// First integer token within `[MIN_SCORE, MAX_SCORE]`, else the fallback.
fn extract_score(reply: &str) -> i64 {
    first_int_in_range(reply, MIN_SCORE, MAX_SCORE).unwrap_or(FALLBACK_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizforge_core::error::ProviderError;

    /// Provider stub returning a fixed reply (or a fixed failure).
    struct FixedProvider {
        reply: Result<String, ProviderError>,
    }

    #[async_trait]
    impl Provider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
            self.reply.clone()
        }
    }

    fn tool_with_reply(reply: &str) -> ContentRatingTool {
        ContentRatingTool::new(Arc::new(FixedProvider {
            reply: Ok(reply.to_string()),
        }))
    }

    #[tokio::test]
    async fn extracts_bare_integer() {
        let out = tool_with_reply("7").execute("some paragraph").await.unwrap();
        assert_eq!(out.value, serde_json::json!(7));
        assert_eq!(out.rendering, "7");
    }

    #[tokio::test]
    async fn extracts_integer_from_prose() {
        let out = tool_with_reply("I'd rate this an 8 out of 10.")
            .execute("text")
            .await
            .unwrap();
        assert_eq!(out.value, serde_json::json!(8));
    }

    #[tokio::test]
    async fn out_of_range_tokens_are_skipped() {
        // 2024 is out of range; 3 is the first in-range token.
        let out = tool_with_reply("As of 2024, I'd say 3.")
            .execute("text")
            .await
            .unwrap();
        assert_eq!(out.value, serde_json::json!(3));
    }

    #[tokio::test]
    async fn falls_back_to_midpoint() {
        let out = tool_with_reply("no digits here").execute("text").await.unwrap();
        assert_eq!(out.value, serde_json::json!(FALLBACK_SCORE));
    }

    #[tokio::test]
    async fn provider_failure_becomes_execution_error() {
        let tool = ContentRatingTool::new(Arc::new(FixedProvider {
            reply: Err(ProviderError::EmptyReply),
        }));
        let err = tool.execute("text").await.unwrap_err();
        match err {
            ToolError::ExecutionFailed { tool_name, .. } => {
                assert_eq!(tool_name, "rate_content_quality");
            }
            other => panic!("expected ExecutionFailed, got {other:?}"),
        }
    }
}
