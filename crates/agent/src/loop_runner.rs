//! The orchestration loop.
//!
//! One [`AgentLoop`] drives any [`Pipeline`]: prompt the model, parse the
//! single-line directive, dispatch or materialize, repeat. The loop is
//! strictly sequential with one provider call per iteration, every call
//! wrapped in a timeout, and a hard iteration bound after which the run is
//! `Exhausted` rather than retried. Any failure ends the run on the spot;
//! recovery is the caller's decision, not the loop's.

use quizforge_audit::{AuditLog, AuditRecord};
use quizforge_core::directive::Directive;
use quizforge_core::error::RunFailure;
use quizforge_core::provider::Provider;
use quizforge_core::run::{AgentRun, RunState, TurnOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::history::{build_prompt, render_history};
use crate::materializer::materialize;
use crate::pipeline::Pipeline;

/// Iterations allowed when the caller does not say otherwise.
pub const DEFAULT_MAX_ITERATIONS: usize = 3;

/// Hard ceiling on the iteration bound. Requests above it are clamped.
pub const MAX_ITERATIONS_CEILING: usize = 10;

/// Per-call timeout when the caller does not say otherwise.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Drives pipelines to a terminal state.
pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    max_iterations: usize,
    call_timeout: Duration,
    audit: Option<AuditLog>,
}

impl AgentLoop {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            audit: None,
        }
    }

    /// Set the iteration bound, clamped to `1..=MAX_ITERATIONS_CEILING`.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.clamp(1, MAX_ITERATIONS_CEILING);
        self
    }

    /// Set the per-call timeout applied to every provider call.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Attach an audit log; terminal states are recorded best-effort.
    pub fn with_audit(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Run a pipeline against a goal until a terminal state.
    pub async fn run(&self, pipeline: &Pipeline, goal: &str) -> AgentRun {
        let mut run = AgentRun::new(goal, pipeline.system_prompt.clone());
        info!(
            run_id = %run.id,
            pipeline = pipeline.name,
            provider = self.provider.name(),
            max_iterations = self.max_iterations,
            "starting run"
        );

        for iteration in 0..self.max_iterations {
            let history = render_history(&run.turns);
            let prompt = build_prompt(&run.system_prompt, &run.goal, &history);

            let reply = match timeout(self.call_timeout, self.provider.generate(&prompt)).await {
                Ok(Ok(reply)) => reply,
                Ok(Err(err)) => {
                    warn!(run_id = %run.id, iteration, error = %err, "provider call failed");
                    run.finish(RunState::Failed(RunFailure::Provider(err)));
                    break;
                }
                Err(_) => {
                    let seconds = self.call_timeout.as_secs();
                    warn!(run_id = %run.id, iteration, seconds, "provider call timed out");
                    run.finish(RunState::Failed(RunFailure::Timeout { seconds }));
                    break;
                }
            };

            let directive = match pipeline.format.parse(&reply) {
                Ok(directive) => directive,
                Err(err) => {
                    warn!(run_id = %run.id, iteration, error = %err, "unparseable reply");
                    run.finish(RunState::Failed(RunFailure::ProtocolViolation(err)));
                    break;
                }
            };

            match directive {
                Directive::ToolCall { name, raw_args } => {
                    debug!(run_id = %run.id, iteration, tool = %name, "dispatching tool call");
                    match pipeline.registry.dispatch(&name, &raw_args).await {
                        Ok(output) => {
                            run.push_turn(
                                Directive::ToolCall { name, raw_args },
                                TurnOutcome::Dispatched(output),
                            );
                        }
                        Err(err) => {
                            let failure = RunFailure::from_tool_error(err, &raw_args);
                            warn!(run_id = %run.id, iteration, error = %failure, "dispatch failed");
                            run.finish(RunState::Failed(failure));
                            break;
                        }
                    }
                }
                Directive::FinalAnswer { raw_payload } => {
                    debug!(run_id = %run.id, iteration, "terminal directive received");
                    run.push_turn(
                        Directive::FinalAnswer {
                            raw_payload: raw_payload.clone(),
                        },
                        TurnOutcome::Terminal {
                            raw_payload: raw_payload.clone(),
                        },
                    );
                    match materialize(&raw_payload, &pipeline.schema) {
                        Ok(output) => run.finish(RunState::Succeeded(output)),
                        Err(err) => {
                            warn!(run_id = %run.id, error = %err, "materialization failed");
                            run.finish(RunState::Failed(RunFailure::Materialization(err)));
                        }
                    }
                    break;
                }
            }
        }

        // Budget spent without a terminal directive.
        if !run.state.is_terminal() {
            run.finish(RunState::Exhausted);
        }

        info!(
            run_id = %run.id,
            outcome = run.state.label(),
            iterations = run.iterations(),
            "run finished"
        );
        if let Some(audit) = &self.audit {
            audit.record(AuditRecord::from_run(pipeline.name, &run));
        }
        run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materializer::OutputSchema;
    use crate::test_helpers::{ScriptedProvider, SlowProvider};
    use quizforge_core::output::{Flashcard, RunOutput};

    fn rating_pipeline(provider: Arc<dyn Provider>) -> Pipeline {
        Pipeline::content_rating(provider)
    }

    #[tokio::test]
    async fn tool_call_then_final_answer_succeeds() {
        // The rating tool makes its own provider call between the two
        // loop iterations, so the script interleaves its reply.
        let provider = Arc::new(ScriptedProvider::new(vec![
            "FUNCTION_CALL: rate_content_quality|Photosynthesis converts light to energy.",
            "8",
            "FINAL_ANSWER: 7",
        ]));
        let pipeline = rating_pipeline(provider.clone());
        let run = AgentLoop::new(provider.clone())
            .run(&pipeline, "Rate this study note")
            .await;

        assert!(matches!(
            run.state,
            RunState::Succeeded(RunOutput::Score(7))
        ));
        assert_eq!(run.iterations(), 2);
        // One inner call from the rating tool plus two loop calls.
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn flashcard_answer_materializes() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            r#"FINAL_ANSWER: [{"front": "What is ATP?", "back": "Cell energy currency"}]"#,
        ]));
        let pipeline = Pipeline::flashcards(provider.clone(), 10);
        let run = AgentLoop::new(provider)
            .run(&pipeline, "Make flashcards")
            .await;

        let RunState::Succeeded(RunOutput::Flashcards(cards)) = run.state else {
            panic!("expected flashcards, got {:?}", run.state);
        };
        assert_eq!(
            cards,
            vec![Flashcard {
                front: "What is ATP?".into(),
                back: "Cell energy currency".into()
            }]
        );
    }

    #[tokio::test]
    async fn rating_call_then_flashcard_final_succeeds() {
        // The flashcards pipeline carries the rating tool, so a run can
        // rate the material mid-flight and still finish with a deck. The
        // nested rating reply ("7") sits between the two loop replies.
        let provider = Arc::new(ScriptedProvider::new(vec![
            "FUNCTION_CALL: rate_content_quality|Mitochondria produce ATP.",
            "7",
            r#"FINAL_ANSWER: [{"front": "What produces ATP?", "back": "Mitochondria"}]"#,
        ]));
        let pipeline = Pipeline::flashcards(provider.clone(), 10);
        let run = AgentLoop::new(provider.clone())
            .run(&pipeline, "Rate this note, then turn it into flashcards")
            .await;

        let RunState::Succeeded(RunOutput::Flashcards(cards)) = &run.state else {
            panic!("expected flashcards, got {:?}", run.state);
        };
        assert_eq!(
            cards,
            &vec![Flashcard {
                front: "What produces ATP?".into(),
                back: "Mitochondria".into()
            }]
        );

        // The rating turn is on the record with its extracted score.
        assert_eq!(run.iterations(), 2);
        let first = &run.turns[0];
        assert!(matches!(
            first.directive,
            Directive::ToolCall { ref name, .. } if name == "rate_content_quality"
        ));
        let TurnOutcome::Dispatched(output) = &first.outcome else {
            panic!("expected a dispatched turn, got {:?}", first.outcome);
        };
        assert_eq!(output.rendering, "7");
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn exhaustion_never_overruns_the_bound() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            "FUNCTION_CALL: fibonacci_numbers|3",
            "FUNCTION_CALL: fibonacci_numbers|4",
            "FUNCTION_CALL: fibonacci_numbers|5",
            "FINAL_ANSWER: never reached",
        ]));
        let pipeline = Pipeline::arithmetic();
        let run = AgentLoop::new(provider.clone())
            .with_max_iterations(3)
            .run(&pipeline, "Keep going")
            .await;

        assert!(matches!(run.state, RunState::Exhausted));
        assert_eq!(run.iterations(), 3);
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn unrecognized_reply_fails_without_retry() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            "I think the answer is probably 7.",
            "FINAL_ANSWER: 7",
        ]));
        let pipeline = rating_pipeline(provider.clone());
        let run = AgentLoop::new(provider.clone())
            .run(&pipeline, "Rate this")
            .await;

        assert!(matches!(
            run.state,
            RunState::Failed(RunFailure::ProtocolViolation(_))
        ));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn unknown_tool_fails_with_name_and_args() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            "FUNCTION_CALL: summon_demon|now",
        ]));
        let pipeline = Pipeline::arithmetic();
        let run = AgentLoop::new(provider).run(&pipeline, "goal").await;

        let RunState::Failed(RunFailure::UnknownTool { name, raw_args }) = run.state else {
            panic!("expected unknown-tool failure, got {:?}", run.state);
        };
        assert_eq!(name, "summon_demon");
        assert_eq!(raw_args, "now");
    }

    #[tokio::test]
    async fn bad_arguments_fail_with_decode_context() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            "FUNCTION_CALL: fibonacci_numbers|not a number",
        ]));
        let pipeline = Pipeline::arithmetic();
        let run = AgentLoop::new(provider).run(&pipeline, "goal").await;

        let RunState::Failed(RunFailure::ArgumentDecode { tool_name, .. }) = run.state else {
            panic!("expected decode failure, got {:?}", run.state);
        };
        assert_eq!(tool_name, "fibonacci_numbers");
    }

    #[tokio::test]
    async fn bad_terminal_payload_fails_materialization() {
        let provider = Arc::new(ScriptedProvider::new(vec!["FINAL_ANSWER: not json"]));
        let pipeline = Pipeline::flashcards(provider.clone(), 10);
        let run = AgentLoop::new(provider).run(&pipeline, "goal").await;

        assert!(matches!(
            run.state,
            RunState::Failed(RunFailure::Materialization(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let provider = Arc::new(SlowProvider {
            delay: Duration::from_secs(60),
        });
        let pipeline = Pipeline::arithmetic();
        let run = AgentLoop::new(provider)
            .with_call_timeout(Duration::from_secs(10))
            .run(&pipeline, "goal")
            .await;

        assert!(matches!(
            run.state,
            RunState::Failed(RunFailure::Timeout { seconds: 10 })
        ));
    }

    #[test]
    fn iteration_bound_is_clamped() {
        let provider = Arc::new(ScriptedProvider::new(vec!["FINAL_ANSWER: done"]));
        let agent = AgentLoop::new(provider).with_max_iterations(500);
        assert_eq!(agent.max_iterations, MAX_ITERATIONS_CEILING);
        let agent = agent.with_max_iterations(0);
        assert_eq!(agent.max_iterations, 1);
    }

    #[tokio::test]
    async fn terminal_state_is_audited() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.jsonl");
        let audit = AuditLog::open(&path);

        let provider = Arc::new(ScriptedProvider::new(vec!["FINAL_ANSWER: 7"]));
        let pipeline = rating_pipeline(provider.clone());
        let run = AgentLoop::new(provider)
            .with_audit(audit.clone())
            .run(&pipeline, "Rate this")
            .await;
        audit.flush().await;

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains(&run.id.to_string()));
        assert!(contents.contains("content_rating"));
        assert!(contents.contains("succeeded"));
    }

    #[tokio::test]
    async fn free_text_pipeline_passes_payload_through() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            "FUNCTION_CALL: strings_to_chars_to_int|INDIA",
            "FINAL_ANSWER: [42]",
        ]));
        let pipeline = Pipeline::arithmetic();
        let run = AgentLoop::new(provider)
            .run(&pipeline, "Sum the codes")
            .await;

        let RunState::Succeeded(RunOutput::Text(text)) = run.state else {
            panic!("expected text, got {:?}", run.state);
        };
        assert_eq!(text, "[42]");
        assert!(matches!(pipeline.schema, OutputSchema::FreeText));
    }
}
