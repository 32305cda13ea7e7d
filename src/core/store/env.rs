//! Environment variable store backend.
//!
//! Resolves secrets from the process environment, which is handy in CI where
//! secrets are already exported. The vault is ignored. The `credential` field
//! maps to `NAME`; any other field maps to `NAME_FIELD` in upper case.

use std::collections::HashMap;

use super::SecretStore;
use crate::core::constants::DEFAULT_FIELD;
use crate::core::secret::{SecretKey, SecretValue};
use crate::error::StoreError;

/// Store reading from environment variables.
#[derive(Debug, Default)]
pub struct EnvStore {
    overrides: Option<HashMap<String, String>>,
}

impl EnvStore {
    /// Read from the live process environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read from a fixed set of variables instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            overrides: Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    /// Variable name consulted for a key.
    pub fn var_name(key: &SecretKey) -> String {
        if key.field() == DEFAULT_FIELD {
            key.name().to_string()
        } else {
            format!("{}_{}", key.name(), key.field()).to_uppercase()
        }
    }
}

impl SecretStore for EnvStore {
    fn name(&self) -> &'static str {
        "env"
    }

    fn ensure_ready(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn fetch(&self, key: &SecretKey) -> Result<Option<SecretValue>, StoreError> {
        let var = Self::var_name(key);
        match &self.overrides {
            Some(vars) => Ok(vars.get(&var).map(|v| SecretValue::new(v.as_str()))),
            None => match std::env::var(&var) {
                Ok(v) => Ok(Some(SecretValue::new(v))),
                Err(std::env::VarError::NotPresent) => Ok(None),
                Err(std::env::VarError::NotUnicode(_)) => Err(StoreError::InvalidUtf8(var)),
            },
        }
    }
}
