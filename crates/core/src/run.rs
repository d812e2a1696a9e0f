//! Run and Turn domain types.
//!
//! An [`AgentRun`] is the aggregate for one complete loop execution: the
//! goal, the system prompt, the ordered turns, and the terminal state.
//! Turns are append-only and gap-free; the state is set exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::directive::Directive;
use crate::error::RunFailure;
use crate::output::RunOutput;
use crate::tool::ToolOutput;

/// Unique identifier for a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What one loop iteration produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TurnOutcome {
    /// A tool-call directive was dispatched; this is its result.
    Dispatched(ToolOutput),

    /// A terminal directive was seen; this is its raw payload.
    Terminal { raw_payload: String },
}

/// One loop iteration's record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Zero-based iteration index; the turn sequence has no gaps.
    pub index: usize,

    /// The directive parsed from this turn's model reply.
    pub directive: Directive,

    /// The dispatch result or terminal payload.
    pub outcome: TurnOutcome,
}

/// Terminal state of a run.
#[derive(Debug, Clone)]
pub enum RunState {
    /// Still iterating; only observable mid-run.
    Running,

    /// A terminal directive arrived and materialized cleanly.
    Succeeded(RunOutput),

    /// The iteration budget was spent with no terminal directive.
    Exhausted,

    /// A hard failure ended the run.
    Failed(RunFailure),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunState::Running)
    }

    /// Short tag for logs and audit records.
    pub fn label(&self) -> &'static str {
        match self {
            RunState::Running => "running",
            RunState::Succeeded(_) => "succeeded",
            RunState::Exhausted => "exhausted",
            RunState::Failed(_) => "failed",
        }
    }
}

/// The aggregate for one complete orchestration-loop execution.
#[derive(Debug)]
pub struct AgentRun {
    /// Unique run ID.
    pub id: RunId,

    /// The task the model was asked to accomplish.
    pub goal: String,

    /// The system prompt used on every iteration.
    pub system_prompt: String,

    /// Ordered, append-only turn records.
    pub turns: Vec<Turn>,

    /// Current (or terminal) state.
    pub state: RunState,

    /// When the run started.
    pub started_at: DateTime<Utc>,
}

impl AgentRun {
    /// Create a run in the `Running` state with an empty turn sequence.
    pub fn new(goal: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            id: RunId::new(),
            goal: goal.into(),
            system_prompt: system_prompt.into(),
            turns: Vec::new(),
            state: RunState::Running,
            started_at: Utc::now(),
        }
    }

    /// Append the next turn. Indices are assigned from the current length,
    /// so the sequence can never have gaps.
    pub fn push_turn(&mut self, directive: Directive, outcome: TurnOutcome) {
        debug_assert!(
            !self.state.is_terminal(),
            "turns cannot be appended after the terminal state is set"
        );
        let index = self.turns.len();
        self.turns.push(Turn {
            index,
            directive,
            outcome,
        });
    }

    /// Set the terminal state. The first terminal state wins; a second
    /// attempt is a logic bug and is ignored.
    pub fn finish(&mut self, state: RunState) {
        debug_assert!(state.is_terminal(), "finish() requires a terminal state");
        if self.state.is_terminal() {
            tracing::warn!(run_id = %self.id, "terminal state set twice; keeping the first");
            return;
        }
        self.state = state;
    }

    /// Number of iterations recorded so far.
    pub fn iterations(&self) -> usize {
        self.turns.len()
    }
}
