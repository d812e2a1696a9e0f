//! Built-in tool implementations for QuizForge.
//!
//! Tools are the locally executable capabilities the model can request
//! mid-run: character/code conversions, exponential sums, Fibonacci
//! sequences, flash-card formatting, and an LLM-backed content rating.
//! Each tool documents and enforces its own argument grammar; decoding is
//! strict literal parsing only (see `quizforge_core::literal`).

pub mod ascii_codes;
pub mod content_rating;
pub mod exponential_sum;
pub mod fibonacci;
pub mod flash_card;

use quizforge_core::provider::Provider;
use quizforge_core::tool::ToolRegistry;
use std::sync::Arc;

pub use ascii_codes::AsciiCodesTool;
pub use content_rating::ContentRatingTool;
pub use exponential_sum::ExponentialSumTool;
pub use fibonacci::FibonacciTool;
pub use flash_card::FlashCardFormatTool;

/// Registry for the arithmetic tool-use pipeline: math tools plus the
/// flash-card formatter the prompt asks the model to finish with.
pub fn arithmetic_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(AsciiCodesTool));
    registry.register(Box::new(ExponentialSumTool));
    registry.register(Box::new(FibonacciTool));
    registry.register(Box::new(FlashCardFormatTool));
    registry
}

/// Registry for the study pipelines (flashcards, rating, hierarchy):
/// formatting plus the LLM-backed rating tool.
pub fn study_registry(provider: Arc<dyn Provider>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(FlashCardFormatTool));
    registry.register(Box::new(ContentRatingTool::new(provider)));
    registry
}
