//! Flash-card formatting tool.

use async_trait::async_trait;
use quizforge_core::error::ToolError;
use quizforge_core::literal::unquote;
use quizforge_core::tool::{Tool, ToolOutput};

/// `format_flash_card` — convert narrative content into a `Front:`/`Back:`
/// flash-card string.
///
/// Split heuristic, tried in order: first blank line, first newline, first
/// colon. With no split point the whole text becomes the front and the
/// back defaults to the front.
pub struct FlashCardFormatTool;

#[async_trait]
impl Tool for FlashCardFormatTool {
    fn name(&self) -> &str {
        "format_flash_card"
    }

    fn signature(&self) -> &str {
        "format_flash_card(text): converts narrative content into a 'Front:'/'Back:' flash card string"
    }

    async fn execute(&self, raw_args: &str) -> Result<ToolOutput, ToolError> {
        let card = format_card(&unquote(raw_args));
        Ok(ToolOutput::new(serde_json::Value::String(card)))
    }
}

fn format_card(content: &str) -> String {
    let text = content.trim();
    if text.is_empty() {
        return "Front: (empty)\nBack: (empty)".into();
    }

    let (front_part, back_part) = if let Some((f, b)) = text.split_once("\n\n") {
        (f, b)
    } else if let Some((f, b)) = text.split_once('\n') {
        (f, b)
    } else if let Some((f, b)) = text.split_once(':') {
        (f, b)
    } else {
        (text, "")
    };

    let front = match front_part.trim() {
        "" => "(empty)",
        f => f,
    };
    let back = match back_part.trim() {
        "" => front,
        b => b,
    };

    format!("Front: {front}\nBack: {back}")
}
