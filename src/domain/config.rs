use crate::error::BridgeError;
use std::fmt;

/// A publishable API key.
///
/// Ensures the key is present and is not a secret key, which must never be
/// shipped to a client application. The key is kept exactly as given, so one
/// with surrounding whitespace is rejected rather than silently altered.
#[derive(Clone, PartialEq, Eq)]
pub struct PublishableKey(String);

impl PublishableKey {
    pub fn new(value: impl Into<String>) -> Result<Self, BridgeError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(BridgeError::InvalidPublishableKey(
                "key must not be blank".to_string(),
            ));
        }
        if value.trim() != value {
            return Err(BridgeError::InvalidPublishableKey(
                "key must not have surrounding whitespace".to_string(),
            ));
        }
        if value.starts_with("sk_") {
            return Err(BridgeError::InvalidPublishableKey(
                "secret keys must not be used on the client".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key with everything but its prefix and last four characters hidden.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 12 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}****{}", head, tail)
    }
}

impl fmt::Debug for PublishableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublishableKey").field(&self.masked()).finish()
    }
}

/// Module-wide configuration established by `initialize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub publishable_key: PublishableKey,
}

impl BridgeConfig {
    pub fn new(publishable_key: PublishableKey) -> Self {
        Self { publishable_key }
    }
}
