//! Secret identifiers and values.

use std::fmt;
use zeroize::Zeroizing;

use crate::core::constants::DEFAULT_FIELD;

/// Identifies a secret in the external store.
///
/// Equality is structural, so a key doubles as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SecretKey {
    name: String,
    field: String,
    vault: String,
}

impl SecretKey {
    /// Create a key with an explicit field and vault.
    pub fn new(name: impl Into<String>, field: impl Into<String>, vault: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            vault: vault.into(),
        }
    }

    /// Create a key using the default `credential` field.
    pub fn with_vault(name: impl Into<String>, vault: impl Into<String>) -> Self {
        Self::new(name, DEFAULT_FIELD, vault)
    }

    /// Item name in the store.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field within the item.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Vault the item lives in.
    pub fn vault(&self) -> &str {
        &self.vault
    }

    /// Secret reference understood by the 1Password CLI.
    pub fn reference(&self) -> String {
        format!("op://{}/{}/{}", self.vault, self.name, self.field)
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.vault, self.name, self.field)
    }
}

/// A resolved secret value.
///
/// The buffer is zeroed on drop and `Debug` never prints the contents.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue(Zeroizing<String>);

impl SecretValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Borrow the plaintext.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretValue(<{} bytes>)", self.0.len())
    }
}

impl From<&str> for SecretValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SecretValue {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Outcome of a single store lookup, as remembered by the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The store returned a value.
    Found(SecretValue),
    /// The store has no such secret.
    NotFound,
    /// The store call failed (timeout, process error).
    Failed(String),
}

impl Lookup {
    /// The value, if the lookup succeeded.
    pub fn value(&self) -> Option<&SecretValue> {
        match self {
            Lookup::Found(v) => Some(v),
            _ => None,
        }
    }

    /// Whether this is a negative result (not found or failed).
    pub fn is_negative(&self) -> bool {
        !matches!(self, Lookup::Found(_))
    }
}
