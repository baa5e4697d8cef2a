//! Secret string handling.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use subtle::ConstantTimeEq;

/// Secret string that zeroes its memory on drop and redacts `Debug` output.
///
/// Serialization round-trips the raw value: resolved configuration is handed
/// back to the host for persistence, so redaction lives in `Debug` and the
/// log layer, not in serde.
#[derive(Clone)]
pub struct SecureString(SecretString);

impl Default for SecureString {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl SecureString {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// Expose the secret. Call sites should keep the borrow short-lived.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Whether the wrapped value is empty.
    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    /// Constant-time equality check.
    pub fn eq_ct(&self, other: &Self) -> bool {
        let ours = self.0.expose_secret().as_bytes();
        let theirs = other.0.expose_secret().as_bytes();
        ours.ct_eq(theirs).into()
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Serialize for SecureString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.expose_secret())
    }
}

impl<'de> Deserialize<'de> for SecureString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureString[REDACTED]")
    }
}
