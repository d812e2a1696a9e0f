//! # QuizForge Core
//!
//! Domain types, traits, and error definitions for the QuizForge agent
//! orchestration loop. This crate has **zero framework dependencies** — it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The seams are traits defined here ([`Provider`], [`Tool`]);
//! implementations live in their respective crates. This enables:
//! - Swapping the model backend via configuration
//! - Easy testing with scripted/mock implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod directive;
pub mod error;
pub mod literal;
pub mod output;
pub mod provider;
pub mod run;
pub mod scalar;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use directive::{Directive, DirectiveFormat};
pub use error::{
    DirectiveError, Error, MaterializeError, ProviderError, Result, RunFailure, ToolError,
};
pub use output::{Flashcard, RunOutput};
pub use provider::Provider;
pub use run::{AgentRun, RunId, RunState, Turn, TurnOutcome};
pub use tool::{Tool, ToolOutput, ToolRegistry};
