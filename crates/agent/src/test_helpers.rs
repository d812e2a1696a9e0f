//! Shared provider stubs for the agent crate's tests.

use async_trait::async_trait;
use quizforge_core::error::ProviderError;
use quizforge_core::provider::Provider;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Replays a fixed sequence of replies and counts calls. Running past the
/// script is a provider error, which keeps a runaway loop visible in tests.
pub(crate) struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub(crate) fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(str::to_string).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(ProviderError::EmptyReply)
    }
}

/// Sleeps past any reasonable deadline before answering.
pub(crate) struct SlowProvider {
    pub(crate) delay: Duration,
}

#[async_trait]
impl Provider for SlowProvider {
    fn name(&self) -> &str {
        "slow"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        tokio::time::sleep(self.delay).await;
        Ok("FINAL_ANSWER: too late".to_string())
    }
}
