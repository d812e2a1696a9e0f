//! Provider pool — one provider instance per API key.
//!
//! Re-instantiating a provider per request wastes connection setup, but a
//! process-global cache hides a dependency. The pool is an explicit,
//! injectable collaborator instead: callers hand it around, the
//! orchestration core never touches it directly. All pooled providers
//! share one `reqwest::Client` (it is stateless per call and safe to
//! share across concurrent runs).

use quizforge_core::provider::Provider;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::gemini::GeminiProvider;

/// Capacity guard: keys beyond this are still served, just not cached.
const MAX_POOLED: usize = 4;

/// A pool of [`GeminiProvider`]s keyed by API key.
pub struct ProviderPool {
    model: String,
    base_url: Option<String>,
    client: reqwest::Client,
    providers: Mutex<HashMap<String, Arc<GeminiProvider>>>,
}

impl ProviderPool {
    /// Create a pool serving the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: None,
            client: reqwest::Client::new(),
            providers: Mutex::new(HashMap::new()),
        }
    }

    /// Point all pooled providers at a custom base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Get (or create) the provider for an API key.
    pub fn get(&self, api_key: &str) -> Arc<dyn Provider> {
        let mut providers = self.providers.lock().expect("provider pool lock poisoned");

        if let Some(existing) = providers.get(api_key) {
            return existing.clone();
        }

        let mut provider = GeminiProvider::new(api_key, &self.model)
            .with_client(self.client.clone());
        if let Some(base) = &self.base_url {
            provider = provider.with_base_url(base.clone());
        }
        let provider = Arc::new(provider);

        if providers.len() < MAX_POOLED {
            providers.insert(api_key.to_string(), provider.clone());
        }
        provider
    }

    /// Number of cached providers.
    pub fn len(&self) -> usize {
        self.providers.lock().expect("provider pool lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_reuses_provider() {
        let pool = ProviderPool::new("gemini-2.0-flash");
        let a = pool.get("key-1");
        let b = pool.get("key-1");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn distinct_keys_get_distinct_providers() {
        let pool = ProviderPool::new("gemini-2.0-flash");
        let a = pool.get("key-1");
        let b = pool.get("key-2");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn pool_capacity_is_bounded() {
        let pool = ProviderPool::new("gemini-2.0-flash");
        for i in 0..10 {
            let _ = pool.get(&format!("key-{i}"));
        }
        assert_eq!(pool.len(), MAX_POOLED);
        // Uncached keys are still served.
        let extra = pool.get("key-9");
        assert_eq!(extra.name(), "gemini");
    }
}
