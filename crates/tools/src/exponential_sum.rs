//! Exponential-sum tool.

use async_trait::async_trait;
use quizforge_core::error::ToolError;
use quizforge_core::literal::parse_int_list;
use quizforge_core::tool::{Tool, ToolOutput};

/// `int_list_to_exponential_sum` — Σ eⁱ over a literal list of integers.
/// The argument must be a literal array of integers (`[1, 2, 3]`);
/// anything else is an argument decode failure.
pub struct ExponentialSumTool;

#[async_trait]
impl Tool for ExponentialSumTool {
    fn name(&self) -> &str {
        "int_list_to_exponential_sum"
    }

    fn signature(&self) -> &str {
        "int_list_to_exponential_sum(list[int]): returns the sum of exponentials for the provided integers"
    }

    async fn execute(&self, raw_args: &str) -> Result<ToolOutput, ToolError> {
        let values = parse_int_list(raw_args).map_err(|reason| ToolError::InvalidArguments {
            tool_name: self.name().to_string(),
            raw_args: raw_args.to_string(),
            reason,
        })?;

        let sum: f64 = values.iter().map(|&i| (i as f64).exp()).sum();
        Ok(ToolOutput::new(serde_json::json!(sum)))
    }
}
