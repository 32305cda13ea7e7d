//! Constants used throughout dotinject.
//!
//! Centralizes magic strings and configuration defaults.

use std::time::Duration;

/// Field read from an item when a template does not name one.
pub const DEFAULT_FIELD: &str = "credential";

/// Vault used when neither the template nor the configuration names one.
pub const DEFAULT_VAULT: &str = "Personal";

/// How long a cached lookup stays fresh.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Upper bound on a single store call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// File suffixes that mark a template; stripped to form the output path.
pub const TEMPLATE_SUFFIXES: &[&str] = &[".template", ".tmpl", ".tpl"];

/// Placeholder shown instead of secret values in dry-run previews.
pub const REDACTED: &str = "********";

/// Path argument that means "read standard input".
pub const STDIN_SENTINEL: &str = "-";

/// Config file name inside the user config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Directory name under the user config directory.
pub const CONFIG_DIR: &str = "dotinject";

/// Environment variable naming an explicit config file.
pub const ENV_CONFIG: &str = "DOTINJECT_CONFIG";

/// Environment variable overriding the cache TTL in seconds.
pub const ENV_CACHE_TTL: &str = "DOTINJECT_CACHE_TTL";

/// Environment variable disabling the cache when set to a truthy value.
pub const ENV_NO_CACHE: &str = "DOTINJECT_NO_CACHE";

/// Environment variable overriding the default vault.
pub const ENV_VAULT: &str = "DOTINJECT_VAULT";

/// Environment variable overriding the secret store backend.
pub const ENV_STORE: &str = "DOTINJECT_STORE";

/// Environment variable enabling debug output.
pub const ENV_DEBUG: &str = "DOTINJECT_DEBUG";

/// Environment variable holding a tracing filter directive.
pub const ENV_LOG: &str = "DOTINJECT_LOG";

/// Exit code used when a run is interrupted by a signal.
pub const EXIT_INTERRUPTED: i32 = 130;
