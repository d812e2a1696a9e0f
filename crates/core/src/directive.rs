//! Directive parsing — one model reply in, exactly one typed instruction out.
//!
//! The model speaks a single-line wire protocol:
//!
//! ```text
//! FUNCTION_CALL: tool_name|raw arguments
//! FINAL_ANSWER: terminal payload
//! ```
//!
//! The parser is deliberately dumb about semantics: it never checks whether
//! a tool name exists (that is the registry's job) and never interprets a
//! terminal payload (that is the materializer's job). When a reply carries
//! directive-like text on several lines, only the first matching line is
//! honored — a deterministic first-match policy for models that leak
//! commentary around the directive.

use serde::{Deserialize, Serialize};

use crate::error::DirectiveError;

/// Maximum characters of an unrecognized reply kept for diagnostics.
const PREVIEW_CHARS: usize = 160;

/// One parsed instruction extracted from a single model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Directive {
    /// The model wants a local tool executed.
    ToolCall {
        /// Tool name as written by the model (not yet validated).
        name: String,
        /// Everything after the first `|`, exactly as sent.
        raw_args: String,
    },

    /// The model is done; the payload goes to the output materializer.
    FinalAnswer {
        /// Raw terminal payload, whitespace and newlines preserved.
        raw_payload: String,
    },
}

/// Marker spelling for the directive protocol.
///
/// Pipelines are free to rename the markers (`FINAL_JSON:` instead of
/// `FINAL_ANSWER:`, say) — the spelling is configuration, not structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectiveFormat {
    /// Prefix that introduces a tool call.
    pub call_prefix: String,

    /// Prefixes that introduce a terminal payload. Several spellings are
    /// accepted because the pipeline family is not consistent about one.
    pub final_prefixes: Vec<String>,
}

impl Default for DirectiveFormat {
    fn default() -> Self {
        Self {
            call_prefix: "FUNCTION_CALL:".into(),
            final_prefixes: vec!["FINAL_ANSWER:".into(), "FINAL_JSON:".into()],
        }
    }
}

impl DirectiveFormat {
    /// Parse the full text of a model reply into exactly one [`Directive`].
    ///
    /// Scans lines in order and honors the first one that starts (after
    /// trimming) with a known marker. For a terminal marker, the payload is
    /// everything from just past the marker through the end of the *reply*,
    /// so multi-line JSON payloads survive intact.
    pub fn parse(&self, reply: &str) -> Result<Directive, DirectiveError> {
        let mut offset = 0usize;
        for line in reply.split_inclusive('\n') {
            let trimmed = line.trim();
            if let Some(rest) = trimmed.strip_prefix(self.call_prefix.as_str()) {
                return self.parse_call(rest.trim());
            }
            for marker in &self.final_prefixes {
                if trimmed.starts_with(marker.as_str()) {
                    // Recover the payload from the original reply so that
                    // newlines after the marker are preserved.
                    let marker_at =
                        offset + line.find(marker.as_str()).unwrap_or(0) + marker.len();
                    let payload = reply[marker_at..].trim();
                    return Ok(Directive::FinalAnswer {
                        raw_payload: payload.to_string(),
                    });
                }
            }
            offset += line.len();
        }

        Err(DirectiveError::UnrecognizedReply {
            preview: preview(reply),
        })
    }

    /// Split the remainder of a tool-call line on the first `|`.
    fn parse_call(&self, rest: &str) -> Result<Directive, DirectiveError> {
        match rest.split_once('|') {
            Some((name, raw_args)) => Ok(Directive::ToolCall {
                name: name.trim().to_string(),
                raw_args: raw_args.to_string(),
            }),
            None => Err(DirectiveError::MalformedCall {
                line: rest.to_string(),
            }),
        }
    }
}

/// Truncate a reply for an error message.
fn preview(reply: &str) -> String {
    let trimmed = reply.trim();
    if trimmed.chars().count() <= PREVIEW_CHARS {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}…")
    }
}
