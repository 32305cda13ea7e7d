//! Configuration file management.
//!
//! Settings come from four layers, highest precedence first: command-line
//! flags, `DOTINJECT_*` environment variables, the TOML config file, and
//! built-in defaults. The config file is optional.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::core::cache::CachePolicy;
use crate::core::constants;
use crate::core::store::StoreKind;
use crate::core::template::{FormatChoice, TokenDefaults};
use crate::error::{ConfigError, Result};

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Secret store backend: "onepassword" (default) or "env"
    #[serde(default)]
    pub store: Option<StoreKind>,
    /// Vault used by tokens that do not name one
    #[serde(default)]
    pub vault: Option<String>,
    /// Field used by tokens that do not name one
    #[serde(default)]
    pub field: Option<String>,
    /// Token syntax, or "auto"
    #[serde(default)]
    pub format: Option<FormatChoice>,
    /// Cache lifetime in seconds
    #[serde(default)]
    pub cache_ttl: Option<u64>,
    /// Lifetime of not-found and failed lookups in seconds
    #[serde(default)]
    pub negative_ttl: Option<u64>,
    /// Whether lookups are cached
    #[serde(default)]
    pub cache: Option<bool>,
    /// Per-lookup timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
    /// Back up files before overwriting them
    #[serde(default)]
    pub backup: Option<bool>,
    /// Template file suffixes, e.g. [".tmpl", ".template"]
    #[serde(default)]
    pub suffixes: Option<Vec<String>>,
}

impl Config {
    /// Default config file location (`<config_dir>/dotinject/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join(constants::CONFIG_FILE))
    }

    /// Load the config file.
    ///
    /// An explicit path (flag or `DOTINJECT_CONFIG`) must exist. The default
    /// location is skipped silently when absent.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile` or `ConfigError::Parse`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(constants::ENV_CONFIG).map(PathBuf::from);
        let (path, required) = match explicit.map(Path::to_path_buf).or(env_path) {
            Some(p) => (p, true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !required && !path.exists() {
            debug!(path = %path.display(), "no config file");
            return Ok(Self::default());
        }

        Self::from_file(&path)
    }

    /// Parse a specific config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse config file contents.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(ConfigError::Parse)?;
        Ok(config)
    }
}

/// Values read from `DOTINJECT_*` environment variables.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EnvOverrides {
    pub store: Option<StoreKind>,
    pub vault: Option<String>,
    pub cache_ttl: Option<u64>,
    pub no_cache: bool,
}

impl EnvOverrides {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read overrides through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = lookup(constants::ENV_STORE)
            .map(|s| s.parse::<StoreKind>())
            .transpose()?;
        let vault = lookup(constants::ENV_VAULT).filter(|v| !v.is_empty());
        let cache_ttl = lookup(constants::ENV_CACHE_TTL)
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                    field: constants::ENV_CACHE_TTL.to_string(),
                    reason: format!("expected seconds, got '{}'", raw),
                })
            })
            .transpose()?;
        let no_cache = lookup(constants::ENV_NO_CACHE)
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        Ok(Self {
            store,
            vault,
            cache_ttl,
            no_cache,
        })
    }
}

/// Whether an environment value means "on".
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Values given on the command line.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CliOverrides {
    pub store: Option<StoreKind>,
    pub vault: Option<String>,
    pub field: Option<String>,
    pub format: Option<FormatChoice>,
    pub cache_ttl: Option<u64>,
    pub no_cache: bool,
    pub timeout: Option<u64>,
    pub backup: Option<bool>,
}

/// Fully resolved settings for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub store: StoreKind,
    pub defaults: TokenDefaults,
    pub format: FormatChoice,
    pub cache: CachePolicy,
    pub timeout: Duration,
    pub backup: bool,
    pub suffixes: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store: StoreKind::default(),
            defaults: TokenDefaults::default(),
            format: FormatChoice::Auto,
            cache: CachePolicy::default(),
            timeout: constants::DEFAULT_TIMEOUT,
            backup: true,
            suffixes: constants::TEMPLATE_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Settings {
    /// Merge the layers into settings and validate the result.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when the merged values are unusable.
    pub fn resolve(file: &Config, env: &EnvOverrides, cli: &CliOverrides) -> Result<Self> {
        let base = Self::default();

        let store = cli.store.or(env.store).or(file.store).unwrap_or(base.store);
        let vault = cli
            .vault
            .clone()
            .or_else(|| env.vault.clone())
            .or_else(|| file.vault.clone())
            .unwrap_or(base.defaults.vault);
        let field = cli
            .field
            .clone()
            .or_else(|| file.field.clone())
            .unwrap_or(base.defaults.field);
        let format = cli.format.or(file.format).unwrap_or(base.format);

        let ttl_secs = cli
            .cache_ttl
            .or(env.cache_ttl)
            .or(file.cache_ttl)
            .unwrap_or(base.cache.ttl.as_secs());
        let negative_secs = file.negative_ttl.unwrap_or(ttl_secs);
        let enabled = !(cli.no_cache || env.no_cache) && file.cache.unwrap_or(true);
        let cache = CachePolicy {
            ttl: Duration::from_secs(ttl_secs),
            negative_ttl: Duration::from_secs(negative_secs),
            enabled,
        };

        let timeout = cli
            .timeout
            .or(file.timeout)
            .map(Duration::from_secs)
            .unwrap_or(base.timeout);
        let backup = cli.backup.or(file.backup).unwrap_or(base.backup);
        let suffixes = file.suffixes.clone().unwrap_or(base.suffixes);

        let settings = Self {
            store,
            defaults: TokenDefaults { vault, field },
            format,
            cache,
            timeout,
            backup,
            suffixes,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check the merged values.
    pub fn validate(&self) -> Result<()> {
        if self.defaults.vault.trim().is_empty() {
            return Err(invalid("vault", "must not be empty"));
        }
        if self.defaults.field.trim().is_empty() {
            return Err(invalid("field", "must not be empty"));
        }
        if self.timeout.is_zero() {
            return Err(invalid("timeout", "must be at least one second"));
        }
        for suffix in &self.suffixes {
            if !suffix.starts_with('.') || suffix.len() < 2 {
                return Err(invalid(
                    "suffixes",
                    &format!("'{}' must start with a dot", suffix),
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
