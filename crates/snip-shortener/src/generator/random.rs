use crate::generator::Generator;
use rand::Rng;
use snip_core::keyspace::ALPHABET;
use snip_core::ShortKey;

/// Draws every character independently and uniformly from the key alphabet.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGenerator;

impl RandomGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator for RandomGenerator {
    fn generate(&self, length: usize) -> ShortKey {
        let mut rng = rand::rng();
        let key: String = (0..length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        ShortKey::new_unchecked(key)
    }
}
