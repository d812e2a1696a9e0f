//! Output materialization — terminal payload in, validated structure out.
//!
//! Models routinely wrap structured output in a fenced block, hand back a
//! bare object where an array was asked for, or leave a flash card's back
//! empty. The materializer absorbs exactly that class of sloppiness with
//! documented repair rules; anything beyond them is a
//! [`MaterializeError`] carrying the offending raw text.

use quizforge_core::error::MaterializeError;
use quizforge_core::output::{Flashcard, RunOutput};
use quizforge_core::scalar::first_int_in_range;
use serde_json::Value;
use tracing::debug;

/// The pipeline-specific shape a terminal payload must materialize into.
#[derive(Debug, Clone)]
pub enum OutputSchema {
    /// A JSON array of front/back pairs, capped at `max_cards`.
    Flashcards { max_cards: usize },

    /// An integer in `[min, max]`; `fallback` when no in-range integer
    /// appears in the payload.
    Score { min: i64, max: i64, fallback: i64 },

    /// Free text, passed through after fence stripping.
    FreeText,
}

impl OutputSchema {
    /// Default score schema: 1–10 with the midpoint as fallback.
    pub fn score_1_to_10() -> Self {
        OutputSchema::Score {
            min: 1,
            max: 10,
            fallback: 5,
        }
    }
}

/// Materialize a raw terminal payload against a schema.
pub fn materialize(raw: &str, schema: &OutputSchema) -> Result<RunOutput, MaterializeError> {
    let stripped = strip_fence(raw);
    match schema {
        OutputSchema::Flashcards { max_cards } => {
            materialize_flashcards(stripped, raw, *max_cards)
        }
        OutputSchema::Score { min, max, fallback } => {
            Ok(RunOutput::Score(extract_score(stripped, *min, *max, *fallback)))
        }
        OutputSchema::FreeText => Ok(RunOutput::Text(stripped.to_string())),
    }
}

/// Strip one optional fenced-block wrapper (``` with an optional language
/// tag on the opening line). Anything that is not a complete fence is
/// returned untouched.
fn strip_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the language tag: everything up to the first newline.
    match body.split_once('\n') {
        Some((_tag, content)) => content.trim(),
        // ```json``` with no newline has no content.
        None => "",
    }
}

fn materialize_flashcards(
    stripped: &str,
    raw: &str,
    max_cards: usize,
) -> Result<RunOutput, MaterializeError> {
    let parsed: Value =
        serde_json::from_str(stripped).map_err(|e| MaterializeError::InvalidPayload {
            schema: "flashcards".into(),
            reason: format!("not valid JSON: {e}"),
            raw: raw.to_string(),
        })?;

    // A bare object is treated as a single-element array.
    let items = match parsed {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        other => {
            return Err(MaterializeError::InvalidPayload {
                schema: "flashcards".into(),
                reason: format!("expected a JSON array or object, got {}", kind(&other)),
                raw: raw.to_string(),
            });
        }
    };

    let mut cards = Vec::new();
    let mut dropped = 0usize;
    for item in items {
        if cards.len() >= max_cards {
            break;
        }
        match repair_card(&item) {
            Some(card) => cards.push(card),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!(dropped, "flashcard items without a front were dropped");
    }
    Ok(RunOutput::Flashcards(cards))
}

/// Apply the per-item repair policy: either key spelling is accepted for
/// each field, a missing/empty front drops the item, and a missing/empty
/// back defaults to the front.
fn repair_card(item: &Value) -> Option<Flashcard> {
    let front = field(item, "front", "question")?;
    let back = field(item, "back", "answer").unwrap_or_else(|| front.clone());
    Some(Flashcard { front, back })
}

/// Non-empty string under `primary` or `alternate`, in that order.
fn field(item: &Value, primary: &str, alternate: &str) -> Option<String> {
    [primary, alternate]
        .iter()
        .filter_map(|key| item.get(key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// First integer token within `[min, max]`, else the fallback.
fn extract_score(text: &str, min: i64, max: i64, fallback: i64) -> i64 {
    first_int_in_range(text, min, max).unwrap_or(fallback)
}
