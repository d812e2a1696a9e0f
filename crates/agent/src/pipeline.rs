//! Pipeline presets.
//!
//! A [`Pipeline`] bundles everything that varies between use cases: the
//! tool registry, the directive format, the output schema, and a system
//! prompt generated from them. The loop itself stays parameterized and
//! identical across presets; adding a pipeline means adding a preset
//! constructor, not a new loop.

use quizforge_core::directive::DirectiveFormat;
use quizforge_core::provider::Provider;
use quizforge_core::tool::ToolRegistry;
use quizforge_tools::{arithmetic_registry, study_registry, ContentRatingTool};
use std::sync::Arc;

use crate::materializer::OutputSchema;

/// One configured use case: registry, format, schema, prompt.
pub struct Pipeline {
    /// Short tag for logs and audit records.
    pub name: &'static str,

    /// System prompt sent on every iteration, tool catalog included.
    pub system_prompt: String,

    /// Tools the model may call mid-run.
    pub registry: Arc<ToolRegistry>,

    /// The shape terminal payloads must materialize into.
    pub schema: OutputSchema,

    /// Markers the directive parser recognizes.
    pub format: DirectiveFormat,

    // Prompt fragments kept so `with_format` can re-render.
    task: String,
    final_instruction: String,
}

impl Pipeline {
    fn new(
        name: &'static str,
        task: &str,
        final_instruction: &str,
        registry: ToolRegistry,
        schema: OutputSchema,
    ) -> Self {
        let format = DirectiveFormat::default();
        let system_prompt = render_prompt(task, final_instruction, &registry, &format);
        Self {
            name,
            system_prompt,
            registry: Arc::new(registry),
            schema,
            format,
            task: task.to_string(),
            final_instruction: final_instruction.to_string(),
        }
    }

    /// Swap the directive markers. The system prompt is re-rendered so its
    /// protocol instructions stay in step with what the parser accepts.
    pub fn with_format(mut self, format: DirectiveFormat) -> Self {
        self.system_prompt =
            render_prompt(&self.task, &self.final_instruction, &self.registry, &format);
        self.format = format;
        self
    }

    /// Iterative math problem solving with a flash-card finish.
    pub fn arithmetic() -> Self {
        Self::new(
            "arithmetic",
            "You are a math agent solving problems in iterations.",
            "give the final result in square brackets, like FINAL_ANSWER: [42]",
            arithmetic_registry(),
            OutputSchema::FreeText,
        )
    }

    /// Flashcard generation from study material.
    pub fn flashcards(provider: Arc<dyn Provider>, max_cards: usize) -> Self {
        Self::new(
            "flashcards",
            "You are a study assistant that turns source material into \
             concise flashcards.",
            "reply with a JSON array of objects, each with a \"front\" and a \
             \"back\" string, like FINAL_ANSWER: [{\"front\": \"...\", \"back\": \"...\"}]",
            study_registry(provider),
            OutputSchema::Flashcards { max_cards },
        )
    }

    /// Content quality rating on a 1-10 scale.
    pub fn content_rating(provider: Arc<dyn Provider>) -> Self {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(ContentRatingTool::new(provider)));
        Self::new(
            "content_rating",
            "You are a reviewer rating the quality of study content.",
            "give a single integer from 1 to 10, like FINAL_ANSWER: 7",
            registry,
            OutputSchema::score_1_to_10(),
        )
    }

    /// Indented concept hierarchy extracted from study material.
    pub fn concept_hierarchy(provider: Arc<dyn Provider>) -> Self {
        Self::new(
            "concept_hierarchy",
            "You are a study assistant that extracts the concept hierarchy \
             from source material as an indented outline.",
            "give the outline with one concept per line, children indented \
             two spaces under their parent",
            study_registry(provider),
            OutputSchema::FreeText,
        )
    }
}

/// Assemble the system prompt from its parts. Tool lines come from the
/// registry's catalog and the directive markers come from the format, so
/// the prompt cannot drift from what the parser and dispatcher accept.
fn render_prompt(
    task: &str,
    final_instruction: &str,
    registry: &ToolRegistry,
    format: &DirectiveFormat,
) -> String {
    let final_marker = format
        .final_prefixes
        .first()
        .map(String::as_str)
        .unwrap_or("FINAL_ANSWER:");
    let mut prompt = format!(
        "{task}\n\n\
         Respond with EXACTLY ONE line in one of these formats:\n\
         1. {call} function_name|input\n\
         2. {fin} answer\n",
        call = format.call_prefix,
        fin = final_marker,
    );
    if !registry.is_empty() {
        prompt.push_str("\nAvailable functions:\n");
        prompt.push_str(&registry.catalog());
        prompt.push('\n');
    }
    prompt.push_str(&format!(
        "\nWhen you are done, {final_instruction}. Do not repeat function \
         calls with the same parameters."
    ));
    prompt
}
