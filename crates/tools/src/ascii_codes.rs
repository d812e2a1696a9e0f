//! ASCII/code-point conversion tool.

use async_trait::async_trait;
use quizforge_core::error::ToolError;
use quizforge_core::literal::unquote;
use quizforge_core::tool::{Tool, ToolOutput};

/// `strings_to_chars_to_int` — the integer code of every character in the
/// input string, in order. One layer of surrounding quotes is stripped
/// first, since models often quote the argument.
pub struct AsciiCodesTool;

#[async_trait]
impl Tool for AsciiCodesTool {
    fn name(&self) -> &str {
        "strings_to_chars_to_int"
    }

    fn signature(&self) -> &str {
        "strings_to_chars_to_int(string): returns ASCII integer values for each character in the string"
    }

    async fn execute(&self, raw_args: &str) -> Result<ToolOutput, ToolError> {
        let text = unquote(raw_args);
        let codes: Vec<u32> = text.chars().map(|c| c as u32).collect();
        Ok(ToolOutput::new(serde_json::json!(codes)))
    }
}
