//! Tool trait — the abstraction over locally executable capabilities.
//!
//! Tools are what the model can ask for mid-run via `FUNCTION_CALL:`
//! directives: compute a Fibonacci sequence, format a flash card, rate a
//! paragraph. Each tool owns its own argument decoding rule; the registry
//! only routes by name.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ToolError;

/// The result of a tool execution.
///
/// Carries both the structured value and the string rendering the history
/// accumulator shows the model. The rendering is always derived from the
/// value by [`render_value`], so the two cannot diverge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The structured result value.
    pub value: serde_json::Value,

    /// Canonical string rendering of `value`.
    pub rendering: String,
}

impl ToolOutput {
    /// Wrap a result value; the rendering is computed, never hand-written.
    pub fn new(value: serde_json::Value) -> Self {
        let rendering = render_value(&value);
        Self { value, rendering }
    }
}

/// Canonical string rendering for tool results.
///
/// Bare strings render without quotes (the model reads them as prose);
/// everything else renders as compact JSON.
pub fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The core Tool trait.
///
/// Each tool decodes its own raw argument string (the text after the `|`
/// in the directive) and executes. Execution must never panic on model
/// input: decode failures are `InvalidArguments`, internal failures are
/// `ExecutionFailed` with the tool name attached.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The wire name of this tool (e.g., "fibonacci_numbers").
    fn name(&self) -> &str;

    /// One-line signature + description shown to the model in the system
    /// prompt, e.g. `fibonacci_numbers(int): returns the first n Fibonacci
    /// numbers as a list`.
    fn signature(&self) -> &str;

    /// Decode `raw_args` and execute.
    async fn execute(&self, raw_args: &str) -> std::result::Result<ToolOutput, ToolError>;
}

/// A registry of available tools.
///
/// Built once at pipeline construction and read-only afterwards. The agent
/// loop uses it to dispatch tool-call directives; the pipeline uses
/// [`ToolRegistry::catalog`] to generate the tool enumeration in the system
/// prompt, which keeps the prompt and the registry from drifting apart.
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Dispatch a tool-call directive: look up by name, decode, execute.
    pub async fn dispatch(
        &self,
        name: &str,
        raw_args: &str,
    ) -> std::result::Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.execute(raw_args).await
    }

    /// Render the tool enumeration for the system prompt, one line per tool
    /// in registration-name order.
    pub fn catalog(&self) -> String {
        self.tools
            .values()
            .map(|t| format!("- {}", t.signature()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
