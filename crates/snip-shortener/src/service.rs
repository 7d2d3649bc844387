use crate::allocator::{AllocatorConfig, ShortKeyAllocator};
use crate::generator::Generator;
use async_trait::async_trait;
use snip_core::{Repository, ShortKey, Shortener, ShortenerError, UrlMapping, UrlRecord};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository` and a [`ShortKeyAllocator`] drawing
/// from a `Generator`. Long URLs are stored exactly as given; the allocator
/// takes care of uniqueness, reserved keys and key length growth.
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    allocator: ShortKeyAllocator<R, G>,
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    /// Creates a new `ShortenerService`, validating the allocator configuration.
    pub fn new(repository: R, generator: G, config: AllocatorConfig) -> Result<Self, ShortenerError> {
        let repository = Arc::new(repository);
        let allocator = ShortKeyAllocator::new(Arc::clone(&repository), generator, config)?;
        Ok(Self {
            repository,
            allocator,
        })
    }

    /// Returns the allocator backing this service.
    pub fn allocator(&self) -> &ShortKeyAllocator<R, G> {
        &self.allocator
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn shorten(&self, long_url: String) -> Result<ShortKey, ShortenerError> {
        let key = self.allocator.allocate_for(long_url).await?;
        info!(short_key = %key, "shortened url");
        Ok(key)
    }

    async fn resolve(&self, key: &ShortKey) -> Result<Option<UrlRecord>, ShortenerError> {
        trace!(short_key = %key, "resolving short key");

        let record = self.repository.get(key).await?;
        match &record {
            Some(record) => debug!(short_key = %key, url = %record.long_url, "resolved short key"),
            None => debug!(short_key = %key, "short key not found"),
        }
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<UrlMapping>, ShortenerError> {
        Ok(self.repository.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::random::RandomGenerator;
    use crate::generator::seq::SeqGenerator;
    use snip_storage::InMemoryRepository;
    use std::collections::HashSet;

    fn test_service() -> ShortenerService<InMemoryRepository, SeqGenerator> {
        ShortenerService::new(
            InMemoryRepository::new(),
            SeqGenerator::new(),
            AllocatorConfig::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn shorten_returns_sequential_keys() {
        let service = test_service();

        let first = service.shorten("https://a.example".to_string()).await.unwrap();
        let second = service.shorten("https://b.example".to_string()).await.unwrap();

        assert_eq!(first.as_str(), "aaaa");
        assert_eq!(second.as_str(), "aaab");
    }

    #[tokio::test]
    async fn shorten_then_resolve_is_verbatim() {
        let service = test_service();
        let url = "Example.COM/a/../b?x=1 2";

        let key = service.shorten(url.to_string()).await.unwrap();
        let record = service.resolve(&key).await.unwrap().unwrap();

        assert_eq!(record.long_url, url);
    }

    #[tokio::test]
    async fn same_url_gets_distinct_keys() {
        let service = test_service();

        let first = service.shorten("https://dup.example".to_string()).await.unwrap();
        let second = service.shorten("https://dup.example".to_string()).await.unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn resolve_nonexistent_key() {
        let service = test_service();

        let record = service
            .resolve(&ShortKey::new("nope").unwrap())
            .await
            .unwrap();
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn list_returns_all_mappings() {
        let service = test_service();

        for url in ["https://1.example", "https://2.example", "https://3.example"] {
            service.shorten(url.to_string()).await.unwrap();
        }

        let mappings = service.list().await.unwrap();
        assert_eq!(mappings.len(), 3);
        let urls: HashSet<String> = mappings.into_iter().map(|m| m.long_url).collect();
        assert!(urls.contains("https://2.example"));
    }

    #[tokio::test]
    async fn reserved_keys_are_skipped() {
        let config = AllocatorConfig::builder()
            .reserved(["aaaa".to_string()].into_iter().collect())
            .build();
        let service =
            ShortenerService::new(InMemoryRepository::new(), SeqGenerator::new(), config).unwrap();

        let key = service.shorten("https://x.example".to_string()).await.unwrap();

        assert_eq!(key.as_str(), "aaab");
        assert!(service.allocator().is_reserved(&ShortKey::new("aaaa").unwrap()));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = AllocatorConfig::builder().min_key_length(2).build();

        let result = ShortenerService::new(InMemoryRepository::new(), RandomGenerator, config);

        assert!(matches!(result, Err(ShortenerError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn usable_as_trait_object() {
        let service: Arc<dyn Shortener> = Arc::new(
            ShortenerService::new(
                InMemoryRepository::new(),
                RandomGenerator,
                AllocatorConfig::default(),
            )
            .unwrap(),
        );

        let key = service.shorten("https://dyn.example".to_string()).await.unwrap();
        assert_eq!(key.len(), 4);
    }
}
