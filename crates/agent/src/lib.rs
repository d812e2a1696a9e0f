//! The QuizForge agent: one parameterized orchestration loop plus the
//! pipeline presets that configure it.
//!
//! The split of concerns:
//! - [`pipeline`] bundles per-use-case configuration (tools, prompt,
//!   directive format, output schema);
//! - [`loop_runner`] drives any pipeline to a terminal state;
//! - [`history`] renders prior turns back into the next prompt;
//! - [`materializer`] turns terminal payloads into validated output.

pub mod history;
pub mod loop_runner;
pub mod materializer;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use loop_runner::{
    AgentLoop, DEFAULT_CALL_TIMEOUT, DEFAULT_MAX_ITERATIONS, MAX_ITERATIONS_CEILING,
};
pub use materializer::{materialize, OutputSchema};
pub use pipeline::Pipeline;
