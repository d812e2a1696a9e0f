//! Fibonacci sequence tool.

use async_trait::async_trait;
use quizforge_core::error::ToolError;
use quizforge_core::literal::parse_int;
use quizforge_core::tool::{Tool, ToolOutput};

/// i64 overflows at F(93).
const MAX_COUNT: i64 = 92;

/// `fibonacci_numbers` — the first n Fibonacci numbers as a list.
/// The argument must decode as a base-10 integer; non-positive n yields
/// an empty list.
pub struct FibonacciTool;

#[async_trait]
impl Tool for FibonacciTool {
    fn name(&self) -> &str {
        "fibonacci_numbers"
    }

    fn signature(&self) -> &str {
        "fibonacci_numbers(int): returns the first n Fibonacci numbers as a list"
    }

    async fn execute(&self, raw_args: &str) -> Result<ToolOutput, ToolError> {
        let n = parse_int(raw_args).map_err(|reason| ToolError::InvalidArguments {
            tool_name: self.name().to_string(),
            raw_args: raw_args.to_string(),
            reason,
        })?;

        if n > MAX_COUNT {
            return Err(ToolError::InvalidArguments {
                tool_name: self.name().to_string(),
                raw_args: raw_args.to_string(),
                reason: format!("n must be at most {MAX_COUNT}"),
            });
        }

        Ok(ToolOutput::new(serde_json::json!(fibonacci(n))))
    }
}

fn fibonacci(n: i64) -> Vec<i64> {
    if n <= 0 {
        return vec![];
    }
    let mut sequence = vec![0i64, 1];
    for _ in 2..n {
        let next = sequence[sequence.len() - 1] + sequence[sequence.len() - 2];
        sequence.push(next);
    }
    sequence.truncate(n as usize);
    sequence
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_six_numbers() {
        let out = FibonacciTool.execute("6").await.unwrap();
        assert_eq!(out.value, serde_json::json!([0, 1, 1, 2, 3, 5]));
        assert_eq!(out.rendering, "[0,1,1,2,3,5]");
    }

    #[tokio::test]
    async fn one_truncates_the_seed_pair() {
        let out = FibonacciTool.execute("1").await.unwrap();
        assert_eq!(out.value, serde_json::json!([0]));
    }

    #[tokio::test]
    async fn non_positive_yields_empty_list() {
        let out = FibonacciTool.execute("0").await.unwrap();
        assert_eq!(out.value, serde_json::json!([]));
        let out = FibonacciTool.execute("-3").await.unwrap();
        assert_eq!(out.value, serde_json::json!([]));
    }

    #[tokio::test]
    async fn non_numeric_argument_fails_decode() {
        let err = FibonacciTool.execute("six").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn oversized_count_is_rejected() {
        assert!(FibonacciTool.execute("93").await.is_err());
        assert!(FibonacciTool.execute("92").await.is_ok());
    }
}
