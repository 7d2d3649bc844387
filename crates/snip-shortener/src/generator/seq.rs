use crate::generator::Generator;
use snip_core::keyspace::{key_at, keyspace_size, MAX_KEY_LENGTH};
use snip_core::ShortKey;
use std::sync::atomic::{AtomicU64, Ordering};

/// A short key generator walking the keyspace in base-36 order.
///
/// This generator produces `aaaa`, `aaab`, ... `aaa9`, `aaba`, ... and wraps
/// around once the keyspace of the requested length is used up. It is
/// deterministic, which makes it useful in tests and for replaying an
/// allocation sequence.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
        }
    }
}

impl Default for SeqGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SeqGenerator {
    /// Creates a generator starting at the first key of the keyspace.
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Creates a generator starting from a specific position in the keyspace.
    pub fn with_offset(offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
        }
    }
}

impl Generator for SeqGenerator {
    fn generate(&self, length: usize) -> ShortKey {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        let length = length.clamp(1, MAX_KEY_LENGTH);
        let index = u128::from(count) % keyspace_size(length);
        // `index` lies inside the keyspace of a supported length.
        key_at(index, length).expect("sequential index within keyspace")
    }
}
