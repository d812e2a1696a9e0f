//! Model provider implementations for QuizForge.
//!
//! The orchestration loop only sees `quizforge_core::Provider`; this crate
//! supplies the Gemini implementation and a keyed pool for multi-tenant
//! callers (one provider per API key, shared HTTP client).

pub mod gemini;
pub mod pool;

pub use gemini::GeminiProvider;
pub use pool::ProviderPool;
