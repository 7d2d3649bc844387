use crate::generator::random::RandomGenerator;
use crate::generator::Generator;
use snip_core::keyspace::{
    is_key_char, keyspace_size, required_key_length, MAX_KEY_LENGTH, MIN_KEY_LENGTH,
};
use snip_core::{Repository, ShortKey, ShortenerError, UrlRecord};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use typed_builder::TypedBuilder;

type Result<T> = std::result::Result<T, ShortenerError>;

/// Default hard cap on candidates tried by a single allocation.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 64;

/// Attempts granted per expected draw before giving up.
const RETRY_FACTOR: u128 = 8;

/// Configures a [`ShortKeyAllocator`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct AllocatorConfig {
    /// Key length used until the store grows past its threshold.
    #[builder(default = MIN_KEY_LENGTH)]
    pub min_key_length: usize,
    /// Hard cap on candidates per allocation.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
    /// Keys that must never be handed out, e.g. route words of the caller.
    #[builder(default)]
    pub reserved: HashSet<String>,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl AllocatorConfig {
    /// Rejects configurations the allocator cannot honour.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_KEY_LENGTH..=MAX_KEY_LENGTH).contains(&self.min_key_length) {
            return Err(ShortenerError::InvalidConfig(format!(
                "min_key_length must be between {} and {}, got {}",
                MIN_KEY_LENGTH, MAX_KEY_LENGTH, self.min_key_length
            )));
        }

        if self.max_attempts == 0 {
            return Err(ShortenerError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        if self.reserved.iter().any(|key| key.trim().is_empty()) {
            return Err(ShortenerError::InvalidConfig(
                "reserved keys must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Mutable allocator state, guarded by the growth lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorState {
    /// Length of newly generated keys. Never decreases.
    pub key_length: usize,
}

enum Payload {
    Placeholder,
    Url(String),
}

/// Hands out short keys that are unique in the backing repository.
///
/// Candidates are drawn from a [`Generator`] at the current key length and
/// claimed with the repository's conditional insert, so two allocations can
/// never return the same key. The key length grows whenever the store holds
/// more than half of the current keyspace; the growth decision is serialized
/// by an async mutex and persisted through the repository so it survives
/// restarts and is shared between instances.
pub struct ShortKeyAllocator<R, G = RandomGenerator> {
    repository: Arc<R>,
    generator: G,
    config: AllocatorConfig,
    reserved_by_length: HashMap<usize, u128>,
    state: Mutex<AllocatorState>,
}

impl<R: Repository, G: Generator> ShortKeyAllocator<R, G> {
    /// Creates an allocator after validating `config`.
    ///
    /// Reserved keys are matched case-insensitively and ignore surrounding
    /// whitespace.
    pub fn new(repository: Arc<R>, generator: G, mut config: AllocatorConfig) -> Result<Self> {
        config.validate()?;
        config.reserved = normalize_reserved(config.reserved);

        let mut reserved_by_length: HashMap<usize, u128> = HashMap::new();
        for key in config.reserved.iter().filter(|key| key.chars().all(is_key_char)) {
            *reserved_by_length.entry(key.len()).or_default() += 1;
        }

        let state = AllocatorState {
            key_length: config.min_key_length,
        };

        Ok(Self {
            repository,
            generator,
            config,
            reserved_by_length,
            state: Mutex::new(state),
        })
    }

    /// Returns the configuration this allocator was built with.
    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// The key length the most recent allocation used.
    pub async fn key_length(&self) -> usize {
        self.state.lock().await.key_length
    }

    /// Returns `true` if `key` may never be handed out.
    pub fn is_reserved(&self, key: &ShortKey) -> bool {
        self.config.reserved.contains(key.as_str())
    }

    /// Claims a fresh key with a placeholder record.
    ///
    /// The caller attaches the long URL with [`Repository::finalize`].
    pub async fn allocate(&self) -> Result<ShortKey> {
        self.claim(Payload::Placeholder).await
    }

    /// Claims a fresh key and stores `long_url` under it in the same insert.
    pub async fn allocate_for(&self, long_url: impl Into<String>) -> Result<ShortKey> {
        self.claim(Payload::Url(long_url.into())).await
    }

    async fn claim(&self, payload: Payload) -> Result<ShortKey> {
        let (length, count) = self.settle_key_length().await?;
        let budget = self.attempt_budget(length, count);

        for attempt in 1..=budget {
            let candidate = self.generator.generate(length);

            if self.is_reserved(&candidate) {
                debug!(short_key = %candidate, attempt, "discarding reserved candidate");
                continue;
            }

            let inserted = match &payload {
                Payload::Placeholder => self.repository.reserve(&candidate).await?,
                Payload::Url(long_url) => {
                    self.repository
                        .insert_if_absent(&candidate, UrlRecord::new(long_url.clone()))
                        .await?
                }
            };

            if inserted {
                debug!(short_key = %candidate, attempt, "allocated short key");
                return Ok(candidate);
            }

            debug!(short_key = %candidate, attempt, "candidate already taken, retrying");
        }

        error!(
            key_length = length,
            attempts = budget,
            count,
            "no free short key within the attempt budget"
        );
        Err(ShortenerError::KeyspaceExhausted {
            key_length: length,
            attempts: budget,
        })
    }

    /// Reads the mapping count and grows the key length if the store is past
    /// its threshold. Returns the length to allocate at and the count seen.
    async fn settle_key_length(&self) -> Result<(usize, u64)> {
        let mut state = self.state.lock().await;

        let count = self.repository.count().await?;
        let persisted = self.repository.key_length().await?;

        let current = state.key_length.max(persisted.unwrap_or(0));
        let length = required_key_length(count, current).ok_or(
            ShortenerError::KeyspaceExhausted {
                key_length: MAX_KEY_LENGTH,
                attempts: 0,
            },
        )?;

        if persisted.map_or(true, |stored| stored < length) {
            self.repository.raise_key_length(length).await?;
        }

        if length > current {
            info!(
                from = current,
                to = length,
                count,
                "store past half of the keyspace, growing key length"
            );
        } else if current > state.key_length {
            debug!(
                from = state.key_length,
                to = current,
                "adopting persisted key length"
            );
        }

        state.key_length = length;
        Ok((length, count))
    }

    /// Candidates to try before giving up: proportional to how crowded the
    /// keyspace is, capped by `max_attempts`, zero if nothing is free.
    fn attempt_budget(&self, length: usize, count: u64) -> u32 {
        let space = keyspace_size(length);
        let reserved = self
            .reserved_by_length
            .get(&length)
            .copied()
            .unwrap_or_default();
        let free = space
            .saturating_sub(u128::from(count))
            .saturating_sub(reserved);

        if free == 0 {
            return 0;
        }

        let expected_draws = space.div_ceil(free);
        let budget = expected_draws
            .saturating_mul(RETRY_FACTOR)
            .min(u128::from(self.config.max_attempts));
        // Bounded by `max_attempts`, which is a u32.
        budget as u32
    }
}

fn normalize_reserved(reserved: HashSet<String>) -> HashSet<String> {
    reserved
        .into_iter()
        .map(|mut key| {
            if key.trim().len() != key.len() {
                key = key.trim().to_string();
            }
            key.make_ascii_lowercase();
            key
        })
        .collect()
}
