pub mod random;
pub mod seq;

use snip_core::ShortKey;

/// Trait for generating candidate short keys.
///
/// Implementations are pure generators that don't interact with storage.
/// Uniqueness is not their concern: the allocator checks every candidate
/// against the reserved set and claims it with a conditional insert.
pub trait Generator: Send + Sync + 'static {
    /// Generates a candidate key of exactly `length` characters over the key alphabet.
    fn generate(&self, length: usize) -> ShortKey;
}
