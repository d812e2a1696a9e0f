//! Materialized run output — the only boundary outer layers depend on.

use serde::{Deserialize, Serialize};

/// One flash card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    /// The prompt side ("front" or "question" on the wire).
    pub front: String,

    /// The answer side ("back" or "answer" on the wire). Defaults to the
    /// front when the model leaves it empty.
    pub back: String,
}

/// The validated structured result of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunOutput {
    /// A deck of flash cards.
    Flashcards(Vec<Flashcard>),

    /// A scalar quality score.
    Score(i64),

    /// Free text (e.g., a concept hierarchy outline).
    Text(String),
}

impl RunOutput {
    /// Short tag for logs and audit records.
    pub fn label(&self) -> &'static str {
        match self {
            RunOutput::Flashcards(_) => "flashcards",
            RunOutput::Score(_) => "score",
            RunOutput::Text(_) => "text",
        }
    }
}
