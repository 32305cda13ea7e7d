//! Store backend selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use super::{EnvStore, OnePassword, SecretStore};
use crate::error::ConfigError;

/// Available secret store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// 1Password via the `op` CLI
    #[default]
    #[value(alias = "op")]
    #[serde(alias = "op")]
    Onepassword,
    /// Process environment variables
    Env,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Onepassword => "onepassword",
            StoreKind::Env => "env",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "onepassword" | "1password" | "op" => Ok(StoreKind::Onepassword),
            "env" => Ok(StoreKind::Env),
            other => Err(ConfigError::UnknownStore(other.to_string())),
        }
    }
}

/// Construct the store for a backend kind.
pub fn build(kind: StoreKind, timeout: Duration) -> Box<dyn SecretStore> {
    debug!(store = %kind, timeout_secs = timeout.as_secs(), "using secret store");
    match kind {
        StoreKind::Onepassword => Box::new(OnePassword::new(timeout)),
        StoreKind::Env => Box::new(EnvStore::new()),
    }
}
