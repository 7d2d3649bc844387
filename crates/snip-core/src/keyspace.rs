//! Exact arithmetic over the short key alphabet.
//!
//! A keyspace is the set of all strings of a given length over the
//! 36-symbol [`ALPHABET`]. Sizes are computed as `u128`, which holds
//! `36^len` exactly for every length up to [`MAX_KEY_LENGTH`].

use crate::shortkey::ShortKey;

/// Symbols a short key is drawn from, in base-36 digit order.
pub const ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";

const RADIX: u128 = ALPHABET.len() as u128;

/// Shortest key the allocator will ever emit.
///
/// Three-character keys could collide with route words such as `add` or `all`.
pub const MIN_KEY_LENGTH: usize = 4;

/// Longest key supported. `36^24` still fits in a `u128`.
pub const MAX_KEY_LENGTH: usize = 24;

/// Returns `true` if `c` belongs to [`ALPHABET`].
pub fn is_key_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

/// Number of distinct keys of the given length, `36^length`.
///
/// Saturates at `u128::MAX` for lengths beyond [`MAX_KEY_LENGTH`].
pub fn keyspace_size(length: usize) -> u128 {
    u32::try_from(length)
        .ok()
        .and_then(|exp| RADIX.checked_pow(exp))
        .unwrap_or(u128::MAX)
}

/// The number of mappings a keyspace may hold before the key length grows.
pub fn growth_threshold(length: usize) -> u128 {
    keyspace_size(length) / 2
}

/// Smallest length `>= current` whose growth threshold is not exceeded by `count`.
///
/// Returns `None` if no length up to [`MAX_KEY_LENGTH`] is large enough.
pub fn required_key_length(count: u64, current: usize) -> Option<usize> {
    let count = u128::from(count);
    let mut length = current;
    while count > growth_threshold(length) {
        length += 1;
        if length > MAX_KEY_LENGTH {
            return None;
        }
    }
    Some(length)
}

/// The `index`-th key of the given length, counting in base-36 with `a` as zero.
///
/// Returns `None` if `length` is zero or above [`MAX_KEY_LENGTH`], or if
/// `index` lies outside the keyspace.
pub fn key_at(index: u128, length: usize) -> Option<ShortKey> {
    if length == 0 || length > MAX_KEY_LENGTH || index >= keyspace_size(length) {
        return None;
    }

    let mut digits = vec![ALPHABET[0]; length];
    let mut rest = index;
    for slot in digits.iter_mut().rev() {
        *slot = ALPHABET[(rest % RADIX) as usize];
        rest /= RADIX;
    }

    let key = String::from_utf8(digits).ok()?;
    Some(ShortKey::new_unchecked(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyspace_sizes_are_exact() {
        assert_eq!(keyspace_size(4), 1_679_616);
        assert_eq!(keyspace_size(5), 60_466_176);
        assert_eq!(
            keyspace_size(MAX_KEY_LENGTH),
            22_452_257_707_354_557_240_087_211_123_792_674_816
        );
    }

    #[test]
    fn keyspace_size_saturates_past_max() {
        assert_eq!(keyspace_size(MAX_KEY_LENGTH + 1), u128::MAX);
    }

    #[test]
    fn growth_thresholds_are_half_the_keyspace() {
        assert_eq!(growth_threshold(4), 839_808);
        assert_eq!(growth_threshold(5), 30_233_088);
        // Beyond 32-bit range from length 7 on.
        assert_eq!(growth_threshold(7), 39_182_082_048);
    }

    #[test]
    fn required_length_grows_only_past_threshold() {
        assert_eq!(required_key_length(0, 4), Some(4));
        assert_eq!(required_key_length(839_808, 4), Some(4));
        assert_eq!(required_key_length(839_809, 4), Some(5));
        assert_eq!(required_key_length(30_233_089, 4), Some(6));
    }

    #[test]
    fn required_length_never_shrinks() {
        assert_eq!(required_key_length(0, 7), Some(7));
    }

    #[test]
    fn required_length_covers_u64_counts() {
        assert_eq!(required_key_length(u64::MAX, 4), Some(13));
    }

    #[test]
    fn key_at_counts_in_base_36() {
        assert_eq!(key_at(0, 4).unwrap().as_str(), "aaaa");
        assert_eq!(key_at(1, 4).unwrap().as_str(), "aaab");
        assert_eq!(key_at(35, 4).unwrap().as_str(), "aaa9");
        assert_eq!(key_at(36, 4).unwrap().as_str(), "aaba");
        assert_eq!(key_at(keyspace_size(4) - 1, 4).unwrap().as_str(), "9999");
    }

    #[test]
    fn key_at_rejects_out_of_range() {
        assert!(key_at(keyspace_size(4), 4).is_none());
        assert!(key_at(0, 0).is_none());
        assert!(key_at(0, MAX_KEY_LENGTH + 1).is_none());
    }

    #[test]
    fn alphabet_matches_key_chars() {
        assert!(ALPHABET.iter().all(|&b| is_key_char(b as char)));
        assert!(!is_key_char('A'));
        assert!(!is_key_char('-'));
    }
}
