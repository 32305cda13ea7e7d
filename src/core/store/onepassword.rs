//! 1Password store backend.
//!
//! Reads secrets through the `op` CLI (`op read op://VAULT/ITEM/FIELD`).
//!
//! ## Requirements
//!
//! - `op` CLI must be installed and on `PATH`
//! - The user must be signed in (`op signin`) or have a service account token
//!   exported, otherwise every lookup fails with `Unauthenticated`

use std::process::Command;
use std::time::Duration;
use tracing::{debug, trace};

use super::process::{self, RunError};
use super::SecretStore;
use crate::core::secret::{SecretKey, SecretValue};
use crate::error::StoreError;

const STORE_NAME: &str = "1password";

/// stderr fragments that mean the CLI has no usable session.
const AUTH_MARKERS: &[&str] = &[
    "not currently signed in",
    "not signed in",
    "session expired",
    "authorization prompt dismissed",
    "account is not signed in",
    "no accounts configured",
];

/// stderr fragments that mean the item or field does not exist.
const NOT_FOUND_MARKERS: &[&str] = &[
    "isn't an item",
    "isn't a vault",
    "isn't a field",
    "not found",
    "no item found",
    "could not find",
];

/// How `op` failed, judged from its stderr.
#[derive(Debug, PartialEq, Eq)]
enum Failure {
    Unauthenticated,
    NotFound,
    Other,
}

fn classify(stderr: &str) -> Failure {
    let lower = stderr.to_lowercase();
    if AUTH_MARKERS.iter().any(|m| lower.contains(m)) {
        Failure::Unauthenticated
    } else if NOT_FOUND_MARKERS.iter().any(|m| lower.contains(m)) {
        Failure::NotFound
    } else {
        Failure::Other
    }
}

/// 1Password backend using the `op` CLI.
pub struct OnePassword {
    program: String,
    timeout: Duration,
}

impl OnePassword {
    /// Create a backend that runs `op` with the given per-call timeout.
    pub fn new(timeout: Duration) -> Self {
        Self::with_program("op", timeout)
    }

    /// Create a backend that runs a specific executable.
    pub fn with_program(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn command(&self) -> Command {
        Command::new(&self.program)
    }
}

impl SecretStore for OnePassword {
    fn name(&self) -> &'static str {
        STORE_NAME
    }

    fn ensure_ready(&self) -> Result<(), StoreError> {
        which::which(&self.program).map_err(|_| {
            StoreError::Unavailable(format!(
                "{} CLI not found. Install it from https://developer.1password.com/docs/cli/",
                self.program
            ))
        })?;

        let mut cmd = self.command();
        cmd.arg("whoami");

        let finished = match process::run(cmd, self.timeout) {
            Ok(f) => f,
            Err(RunError::TimedOut) => {
                return Err(StoreError::Unavailable(format!(
                    "{} whoami timed out after {}s",
                    self.program,
                    self.timeout.as_secs()
                )))
            }
            Err(RunError::Spawn(e)) | Err(RunError::Wait(e)) => {
                return Err(StoreError::Unavailable(format!(
                    "failed to run {}: {}",
                    self.program, e
                )))
            }
        };

        if finished.status.success() {
            debug!("1password session is active");
            Ok(())
        } else {
            debug!(stderr = %finished.stderr.trim(), "op whoami failed");
            Err(StoreError::Unauthenticated { store: STORE_NAME })
        }
    }

    fn fetch(&self, key: &SecretKey) -> Result<Option<SecretValue>, StoreError> {
        let reference = key.reference();
        trace!(key = %key, "reading from 1password");

        let mut cmd = self.command();
        cmd.args(["read", "--no-newline", &reference]);

        let finished = match process::run(cmd, self.timeout) {
            Ok(f) => f,
            Err(RunError::TimedOut) => {
                return Err(StoreError::Timeout {
                    key: key.to_string(),
                    secs: self.timeout.as_secs(),
                })
            }
            Err(RunError::Spawn(e)) | Err(RunError::Wait(e)) => {
                return Err(StoreError::Command {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            }
        };

        if !finished.status.success() {
            return match classify(&finished.stderr) {
                Failure::Unauthenticated => Err(StoreError::Unauthenticated { store: STORE_NAME }),
                Failure::NotFound => {
                    debug!(key = %key, "secret not found in 1password");
                    Ok(None)
                }
                Failure::Other => Err(StoreError::Command {
                    key: key.to_string(),
                    reason: finished.stderr.trim().to_string(),
                }),
            };
        }

        let value = String::from_utf8(finished.stdout)
            .map_err(|_| StoreError::InvalidUtf8(key.to_string()))?;
        trace!(key = %key, value_len = value.len(), "read from 1password");
        Ok(Some(SecretValue::new(value)))
    }
}
