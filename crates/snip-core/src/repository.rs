use crate::error::StorageError;
use crate::shortkey::ShortKey;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// The payload stored under a short key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// The long URL, exactly as submitted.
    pub long_url: String,
    /// When the mapping was created.
    pub created_at: Timestamp,
}

impl UrlRecord {
    /// Creates a record stamped with the current time.
    pub fn new(long_url: impl Into<String>) -> Self {
        Self {
            long_url: long_url.into(),
            created_at: Timestamp::now(),
        }
    }
}

/// A short key together with the record it maps to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlMapping {
    pub short_key: ShortKey,
    pub long_url: String,
    pub created_at: Timestamp,
}

impl UrlMapping {
    pub fn new(short_key: ShortKey, record: UrlRecord) -> Self {
        Self {
            short_key,
            long_url: record.long_url,
            created_at: record.created_at,
        }
    }
}

/// A read-only view of a repository.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the record for a given short key.
    /// Returns `None` if the key does not exist or is only reserved.
    async fn get(&self, key: &ShortKey) -> Result<Option<UrlRecord>>;

    /// Checks whether a short key is taken, including by a pending reservation.
    async fn exists(&self, key: &ShortKey) -> Result<bool>;

    /// Number of taken short keys, including pending reservations.
    async fn count(&self) -> Result<u64>;

    /// All finalized mappings, oldest first (ties broken by key).
    async fn list(&self) -> Result<Vec<UrlMapping>>;

    /// The persisted allocator key length, if one has been recorded.
    async fn key_length(&self) -> Result<Option<usize>>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts the record only if `key` is not taken.
    ///
    /// Returns `true` if the record was inserted, `false` if the key was
    /// already present. The check and the insert are a single atomic step.
    async fn insert_if_absent(&self, key: &ShortKey, record: UrlRecord) -> Result<bool>;

    /// Claims `key` with a placeholder so no one else can take it.
    ///
    /// Same atomicity and return value as [`Repository::insert_if_absent`].
    /// The long URL is attached later with [`Repository::finalize`].
    async fn reserve(&self, key: &ShortKey) -> Result<bool>;

    /// Attaches the long URL to a reserved key.
    ///
    /// Fails with `NotFound` if the key was never reserved and with
    /// `Conflict` if it already carries a long URL.
    async fn finalize(&self, key: &ShortKey, long_url: String) -> Result<()>;

    /// Records `length` as the allocator key length unless a larger one is stored.
    ///
    /// The persisted value never decreases.
    async fn raise_key_length(&self, length: usize) -> Result<()>;
}
