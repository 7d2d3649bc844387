use async_trait::async_trait;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use jiff::Timestamp;
use snip_core::repository::{ReadRepository, Repository, Result, UrlMapping, UrlRecord};
use snip_core::{ShortKey, StorageError};
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory storage entry for a short key.
///
/// `long_url` is `None` while the key is only reserved.
#[derive(Debug, Clone)]
struct Entry {
    long_url: Option<String>,
    created_at: Timestamp,
}

impl Entry {
    fn pending() -> Self {
        Self {
            long_url: None,
            created_at: Timestamp::now(),
        }
    }

    fn to_record(&self) -> Option<UrlRecord> {
        self.long_url.as_ref().map(|long_url| UrlRecord {
            long_url: long_url.clone(),
            created_at: self.created_at,
        })
    }
}

impl From<UrlRecord> for Entry {
    fn from(record: UrlRecord) -> Self {
        Self {
            long_url: Some(record.long_url),
            created_at: record.created_at,
        }
    }
}

/// In-memory implementation of the Repository trait using DashMap.
///
/// Conditional inserts go through the entry API, which holds the shard
/// lock across the check and the insert.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    storage: DashMap<String, Entry>,
    // 0 means no key length has been recorded.
    key_length: AtomicUsize,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
            key_length: AtomicUsize::new(0),
        }
    }

    fn claim(&self, key: &ShortKey, entry: Entry) -> bool {
        match self.storage.entry(key.as_str().to_owned()) {
            MapEntry::Occupied(_) => false,
            MapEntry::Vacant(vacant) => {
                vacant.insert(entry);
                true
            }
        }
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, key: &ShortKey) -> Result<Option<UrlRecord>> {
        Ok(self
            .storage
            .get(key.as_str())
            .and_then(|entry| entry.to_record()))
    }

    async fn exists(&self, key: &ShortKey) -> Result<bool> {
        Ok(self.storage.contains_key(key.as_str()))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.storage.len() as u64)
    }

    async fn list(&self) -> Result<Vec<UrlMapping>> {
        let mut mappings: Vec<UrlMapping> = self
            .storage
            .iter()
            .filter_map(|item| {
                item.value().to_record().map(|record| {
                    UrlMapping::new(ShortKey::new_unchecked(item.key().clone()), record)
                })
            })
            .collect();

        mappings.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.short_key.cmp(&b.short_key))
        });
        Ok(mappings)
    }

    async fn key_length(&self) -> Result<Option<usize>> {
        match self.key_length.load(Ordering::Acquire) {
            0 => Ok(None),
            length => Ok(Some(length)),
        }
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert_if_absent(&self, key: &ShortKey, record: UrlRecord) -> Result<bool> {
        Ok(self.claim(key, Entry::from(record)))
    }

    async fn reserve(&self, key: &ShortKey) -> Result<bool> {
        Ok(self.claim(key, Entry::pending()))
    }

    async fn finalize(&self, key: &ShortKey, long_url: String) -> Result<()> {
        let Some(mut entry) = self.storage.get_mut(key.as_str()) else {
            return Err(StorageError::NotFound(key.to_string()));
        };

        if entry.long_url.is_some() {
            return Err(StorageError::Conflict(key.to_string()));
        }

        entry.long_url = Some(long_url);
        Ok(())
    }

    async fn raise_key_length(&self, length: usize) -> Result<()> {
        self.key_length.fetch_max(length, Ordering::AcqRel);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;
    use std::sync::Arc;

    fn key(s: &str) -> ShortKey {
        ShortKey::new_unchecked(s)
    }

    fn record(url: &str) -> UrlRecord {
        UrlRecord::new(url)
    }

    #[tokio::test]
    async fn insert_and_get() {
        let repo = InMemoryRepository::new();

        assert!(repo
            .insert_if_absent(&key("abc123"), record("https://example.com"))
            .await
            .unwrap());

        let result = repo.get(&key("abc123")).await.unwrap().unwrap();
        assert_eq!(result.long_url, "https://example.com");
    }

    #[tokio::test]
    async fn get_nonexistent() {
        let repo = InMemoryRepository::new();

        assert!(repo.get(&key("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_if_absent_keeps_first_record() {
        let repo = InMemoryRepository::new();

        assert!(repo
            .insert_if_absent(&key("abc123"), record("https://one.example"))
            .await
            .unwrap());
        assert!(!repo
            .insert_if_absent(&key("abc123"), record("https://two.example"))
            .await
            .unwrap());

        let result = repo.get(&key("abc123")).await.unwrap().unwrap();
        assert_eq!(result.long_url, "https://one.example");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn reserved_key_is_taken_but_not_resolvable() {
        let repo = InMemoryRepository::new();

        assert!(repo.reserve(&key("abcd")).await.unwrap());
        assert!(!repo.reserve(&key("abcd")).await.unwrap());
        assert!(!repo
            .insert_if_absent(&key("abcd"), record("https://example.com"))
            .await
            .unwrap());

        assert!(repo.exists(&key("abcd")).await.unwrap());
        assert!(repo.get(&key("abcd")).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn finalize_attaches_long_url_once() {
        let repo = InMemoryRepository::new();
        repo.reserve(&key("abcd")).await.unwrap();

        repo.finalize(&key("abcd"), "https://example.com".to_string())
            .await
            .unwrap();
        let result = repo.get(&key("abcd")).await.unwrap().unwrap();
        assert_eq!(result.long_url, "https://example.com");

        let err = repo
            .finalize(&key("abcd"), "https://other.example".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[tokio::test]
    async fn finalize_unknown_key_fails() {
        let repo = InMemoryRepository::new();

        let err = repo
            .finalize(&key("nope"), "https://example.com".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_orders_by_creation_then_key() {
        let repo = InMemoryRepository::new();
        let now = Timestamp::now();
        let earlier = now - SignedDuration::from_secs(60);

        for (k, at) in [("cccc", now), ("bbbb", earlier), ("aaaa", now)] {
            let record = UrlRecord {
                long_url: format!("https://{k}.example"),
                created_at: at,
            };
            repo.insert_if_absent(&key(k), record).await.unwrap();
        }

        let keys: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.short_key.to_string())
            .collect();
        assert_eq!(keys, vec!["bbbb", "aaaa", "cccc"]);
    }

    #[tokio::test]
    async fn key_length_only_rises() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.key_length().await.unwrap(), None);

        repo.raise_key_length(5).await.unwrap();
        repo.raise_key_length(4).await.unwrap();
        assert_eq!(repo.key_length().await.unwrap(), Some(5));

        repo.raise_key_length(6).await.unwrap();
        assert_eq!(repo.key_length().await.unwrap(), Some(6));
    }

    #[tokio::test]
    async fn concurrent_claims_have_one_winner() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut handles = vec![];

        for i in 0..16u64 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.insert_if_absent(&key("race"), record(&format!("https://{i}.example")))
                    .await
                    .unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
