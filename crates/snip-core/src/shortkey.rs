use crate::error::CoreError;
use crate::keyspace::{is_key_char, MAX_KEY_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// A validated short key identifying a shortened URL.
///
/// Short keys are 1-24 characters long and contain only lowercase ASCII
/// letters and digits. Keys produced by the allocator are at least
/// [`MIN_KEY_LENGTH`](crate::keyspace::MIN_KEY_LENGTH) long.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortKey(String);

impl ShortKey {
    /// Creates a new `ShortKey` after validating the input.
    pub fn new(key: impl Into<String>) -> Result<Self, CoreError> {
        let key = key.into();
        Self::validate(&key)?;
        Ok(Self(key))
    }

    /// Creates a `ShortKey` without validation.
    ///
    /// Use this only for keys produced by trusted internal sources
    /// (generators, rows read back from storage).
    pub fn new_unchecked(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the short key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters in the key.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    fn validate(key: &str) -> Result<(), CoreError> {
        if key.is_empty() || key.len() > MAX_KEY_LENGTH {
            return Err(CoreError::InvalidShortKey(format!(
                "length must be between 1 and {}, got {}",
                MAX_KEY_LENGTH,
                key.len()
            )));
        }

        if !key.chars().all(is_key_char) {
            return Err(CoreError::InvalidShortKey(format!(
                "must contain only lowercase letters and digits: '{}'",
                key
            )));
        }

        Ok(())
    }
}

impl Display for ShortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ShortKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ShortKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShortKey> for String {
    fn from(value: ShortKey) -> Self {
        value.0
    }
}

impl AsRef<str> for ShortKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_keys() {
        assert!(ShortKey::new("a").is_ok());
        assert!(ShortKey::new("abc123").is_ok());
        assert!(ShortKey::new("9".repeat(MAX_KEY_LENGTH)).is_ok());
    }

    #[test]
    fn empty_or_too_long() {
        assert!(ShortKey::new("").is_err());
        assert!(ShortKey::new("a".repeat(MAX_KEY_LENGTH + 1)).is_err());
    }

    #[test]
    fn invalid_characters() {
        assert!(ShortKey::new("Abcd").is_err());
        assert!(ShortKey::new("ab-cd").is_err());
        assert!(ShortKey::new("ab cd").is_err());
        assert!(ShortKey::new("ab/cd").is_err());
    }

    #[test]
    fn parse_from_str() {
        let key: ShortKey = "x7k2p".parse().unwrap();
        assert_eq!(key.as_str(), "x7k2p");
        assert_eq!(key.len(), 5);
    }

    #[test]
    fn to_url_trims_trailing_slash() {
        let key = ShortKey::new("abc123").unwrap();
        assert_eq!(key.to_url("https://sn.ip"), "https://sn.ip/abc123");
        assert_eq!(key.to_url("https://sn.ip/"), "https://sn.ip/abc123");
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<ShortKey, _> = serde_json::from_str("\"abcd\"");
        assert!(ok.is_ok());
        let bad: Result<ShortKey, _> = serde_json::from_str("\"AB-CD\"");
        assert!(bad.is_err());
    }
}
