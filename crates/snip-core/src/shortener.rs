use crate::repository::{UrlMapping, UrlRecord};
use crate::shortkey::ShortKey;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Stores `long_url` under a freshly allocated short key and returns the key.
    ///
    /// The URL is stored verbatim; it is neither validated nor normalized.
    async fn shorten(&self, long_url: String) -> Result<ShortKey>;

    /// Resolves a short key to its stored record.
    /// Returns `None` if the key does not map to anything.
    async fn resolve(&self, key: &ShortKey) -> Result<Option<UrlRecord>>;

    /// Lists every stored mapping, oldest first.
    async fn list(&self) -> Result<Vec<UrlMapping>>;
}
