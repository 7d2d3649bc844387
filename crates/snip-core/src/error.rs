use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid short key: {0}")]
    InvalidShortKey(String),
}

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("short key already exists: {0}")]
    Conflict(String),
    #[error("short key not found: {0}")]
    NotFound(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    /// No free key could be found within the attempt budget.
    ///
    /// The growth policy keeps the keyspace at most half full, so this
    /// indicates a logic error rather than a transient condition.
    #[error("keyspace exhausted at key length {key_length} after {attempts} attempts")]
    KeyspaceExhausted { key_length: usize, attempts: u32 },
    #[error("invalid allocator configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid short key: {0}")]
    InvalidShortKey(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<CoreError> for ShortenerError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::InvalidShortKey(message) => Self::InvalidShortKey(message),
        }
    }
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value.to_string())
    }
}
