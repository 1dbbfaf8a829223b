//! Provider selection and invalidation.
//!
//! The registry holds the ordered, immutable provider list for the process
//! lifetime and consults the availability store on every selection. Selection
//! is a priority scan in declaration order: the same provider is preferred on
//! every call until it is invalidated, at which point the next one in line
//! takes over for the rest of the cooldown window.

use crate::api::models::Provider;
use crate::services::availability::AvailabilityStore;
use std::sync::Arc;
use std::time::Duration;

/// Store key prefix for unavailability flags.
pub const INVALID_KEY_PREFIX: &str = "provider:invalid:";

/// How long an invalidated provider stays excluded from selection.
pub const INVALIDATION_TTL: Duration = Duration::from_secs(86_400);

fn invalid_key(name: &str) -> String {
    format!("{}{}", INVALID_KEY_PREFIX, name)
}

/// Registry over the configured providers and the shared availability store.
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: Arc<Vec<Provider>>,
    store: Arc<dyn AvailabilityStore>,
    invalidation_ttl: Duration,
}

impl ProviderRegistry {
    /// Create a registry with the standard 24-hour invalidation window.
    pub fn new(providers: Vec<Provider>, store: Arc<dyn AvailabilityStore>) -> Self {
        Self::with_ttl(providers, store, INVALIDATION_TTL)
    }

    /// Create a registry with a custom invalidation window.
    pub fn with_ttl(
        providers: Vec<Provider>,
        store: Arc<dyn AvailabilityStore>,
        invalidation_ttl: Duration,
    ) -> Self {
        Self {
            providers: Arc::new(providers),
            store,
            invalidation_ttl,
        }
    }

    /// Number of configured providers. This also bounds the retry loop.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// All configured providers, in priority order.
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// First provider in declaration order with no unavailability flag.
    ///
    /// Returns `None` when every provider is currently flagged. The store is
    /// re-queried on every call, so invalidations written by concurrent
    /// requests are picked up immediately.
    pub async fn next_available(&self) -> crate::core::Result<Option<Provider>> {
        for provider in self.providers.iter() {
            let flagged = self.store.get(&invalid_key(&provider.name)).await?;
            if !flagged {
                return Ok(Some(provider.clone()));
            }
            tracing::debug!(
                provider = %provider.name,
                "Provider flagged unavailable, skipping"
            );
        }
        Ok(None)
    }

    /// Flag a provider unavailable for the invalidation window.
    ///
    /// Idempotent: invalidating an already-flagged provider resets the window.
    pub async fn invalidate(&self, name: &str) -> crate::core::Result<()> {
        self.store
            .set(&invalid_key(name), self.invalidation_ttl)
            .await?;
        tracing::warn!(
            provider = %name,
            ttl_secs = self.invalidation_ttl.as_secs(),
            "Provider invalidated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::availability::MemoryStore;

    fn test_providers(names: &[&str]) -> Vec<Provider> {
        names
            .iter()
            .map(|name| Provider {
                name: name.to_string(),
                base_url: format!("https://{}.example", name),
                api_key: format!("key-{}", name),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_first_provider_wins_when_unflagged() {
        let registry = ProviderRegistry::new(
            test_providers(&["a", "b", "c"]),
            Arc::new(MemoryStore::new()),
        );

        // Priority order, not rotation: repeated calls keep returning the head.
        for _ in 0..3 {
            let provider = registry.next_available().await.unwrap().unwrap();
            assert_eq!(provider.name, "a");
        }
    }

    #[tokio::test]
    async fn test_invalidation_skips_provider() {
        let registry = ProviderRegistry::new(
            test_providers(&["a", "b", "c"]),
            Arc::new(MemoryStore::new()),
        );

        registry.invalidate("a").await.unwrap();

        let provider = registry.next_available().await.unwrap().unwrap();
        assert_eq!(provider.name, "b");
    }

    #[tokio::test]
    async fn test_none_when_all_flagged() {
        let registry =
            ProviderRegistry::new(test_providers(&["a", "b"]), Arc::new(MemoryStore::new()));

        registry.invalidate("a").await.unwrap();
        registry.invalidate("b").await.unwrap();

        assert!(registry.next_available().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_provider_eligible_again_after_ttl() {
        let registry = ProviderRegistry::with_ttl(
            test_providers(&["a", "b"]),
            Arc::new(MemoryStore::new()),
            Duration::from_millis(30),
        );

        registry.invalidate("a").await.unwrap();
        assert_eq!(registry.next_available().await.unwrap().unwrap().name, "b");

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(registry.next_available().await.unwrap().unwrap().name, "a");
    }

    #[tokio::test]
    async fn test_repeated_invalidation_is_idempotent() {
        let registry =
            ProviderRegistry::new(test_providers(&["a", "b"]), Arc::new(MemoryStore::new()));

        registry.invalidate("a").await.unwrap();
        registry.invalidate("a").await.unwrap();

        assert_eq!(registry.next_available().await.unwrap().unwrap().name, "b");
    }

    #[tokio::test]
    async fn test_invalidation_visible_through_shared_store() {
        // Two registries over the same store model two proxy instances.
        let store = Arc::new(MemoryStore::new());
        let registry1 =
            ProviderRegistry::new(test_providers(&["a", "b"]), store.clone());
        let registry2 = ProviderRegistry::new(test_providers(&["a", "b"]), store);

        registry1.invalidate("a").await.unwrap();

        assert_eq!(registry2.next_available().await.unwrap().unwrap().name, "b");
    }

    #[test]
    fn test_invalid_key_format() {
        assert_eq!(invalid_key("openai"), "provider:invalid:openai");
    }
}
