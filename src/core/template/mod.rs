//! Template token syntaxes.
//!
//! Five concrete syntaxes are supported:
//!
//! | Format         | Syntax                         |
//! |----------------|--------------------------------|
//! | `env`          | `${NAME}`                      |
//! | `env-simple`   | `$NAME`                        |
//! | `go`           | `{{ op://VAULT/NAME/FIELD }}`  |
//! | `custom`       | `%%NAME%%`                     |
//! | `double-brace` | `{{NAME}}`                     |
//!
//! Each format owns one recognizer regex. The regexes are written so that no
//! format matches another format's tokens: `env-simple` needs an identifier
//! right after `$`, so it never sees `${`, and `double-brace` only accepts a
//! bare identifier, so `go` references (which contain `://`) never match it.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::core::constants::{DEFAULT_FIELD, DEFAULT_VAULT};
use crate::core::secret::SecretKey;

pub mod detect;
pub mod extract;
pub mod render;

pub use detect::{detect, Detection};
pub use extract::{extract, Token, TokenInfo};
pub use render::{render, Mode, RenderOutcome, RenderResult, RenderStatus, Renderer};

const ENV_PATTERN: &str = r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}";
const ENV_SIMPLE_PATTERN: &str = r"\$([A-Za-z_][A-Za-z0-9_]*)";
const GO_PATTERN: &str =
    r"\{\{\s*([a-z][a-z0-9+.-]*)://([^\s/{}]+)(?:/([^\s/{}]+))?(?:/([^\s/{}]+))?\s*\}\}";
const CUSTOM_PATTERN: &str = r"%%([A-Za-z_][A-Za-z0-9_]*)%%";
const DOUBLE_BRACE_PATTERN: &str = r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}";

/// A concrete token syntax.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateFormat {
    Env,
    EnvSimple,
    Go,
    Custom,
    DoubleBrace,
}

impl TemplateFormat {
    /// Every concrete format, in detection order.
    pub const ALL: [TemplateFormat; 5] = [
        TemplateFormat::Env,
        TemplateFormat::EnvSimple,
        TemplateFormat::Go,
        TemplateFormat::Custom,
        TemplateFormat::DoubleBrace,
    ];

    /// Name as used on the command line and in config files.
    pub fn name(&self) -> &'static str {
        match self {
            TemplateFormat::Env => "env",
            TemplateFormat::EnvSimple => "env-simple",
            TemplateFormat::Go => "go",
            TemplateFormat::Custom => "custom",
            TemplateFormat::DoubleBrace => "double-brace",
        }
    }

    /// Example token, for help and diagnostics.
    pub fn example(&self) -> &'static str {
        match self {
            TemplateFormat::Env => "${NAME}",
            TemplateFormat::EnvSimple => "$NAME",
            TemplateFormat::Go => "{{ op://VAULT/NAME/FIELD }}",
            TemplateFormat::Custom => "%%NAME%%",
            TemplateFormat::DoubleBrace => "{{NAME}}",
        }
    }

    /// Recognizer for this format.
    pub fn pattern(&self) -> &'static Regex {
        static ENV: OnceLock<Regex> = OnceLock::new();
        static ENV_SIMPLE: OnceLock<Regex> = OnceLock::new();
        static GO: OnceLock<Regex> = OnceLock::new();
        static CUSTOM: OnceLock<Regex> = OnceLock::new();
        static DOUBLE_BRACE: OnceLock<Regex> = OnceLock::new();

        let (cell, source) = match self {
            TemplateFormat::Env => (&ENV, ENV_PATTERN),
            TemplateFormat::EnvSimple => (&ENV_SIMPLE, ENV_SIMPLE_PATTERN),
            TemplateFormat::Go => (&GO, GO_PATTERN),
            TemplateFormat::Custom => (&CUSTOM, CUSTOM_PATTERN),
            TemplateFormat::DoubleBrace => (&DOUBLE_BRACE, DOUBLE_BRACE_PATTERN),
        };
        // The patterns are compile-time constants covered by the tests below.
        cell.get_or_init(|| Regex::new(source).expect("built-in token pattern is valid"))
    }

    /// Build the secret key a single match refers to.
    ///
    /// `go` tokens may carry their own vault and field:
    /// one segment is `NAME`, two are `VAULT/NAME`, three are
    /// `VAULT/NAME/FIELD`. Everything else takes vault and field from
    /// `defaults`.
    pub(crate) fn key_for(&self, caps: &Captures<'_>, defaults: &TokenDefaults) -> SecretKey {
        match self {
            TemplateFormat::Go => {
                let segments: Vec<&str> = (2..=4)
                    .filter_map(|i| caps.get(i).map(|m| m.as_str()))
                    .collect();
                match segments.as_slice() {
                    [name] => SecretKey::new(*name, &defaults.field, &defaults.vault),
                    [vault, name] => SecretKey::new(*name, &defaults.field, *vault),
                    [vault, name, field, ..] => SecretKey::new(*name, *field, *vault),
                    [] => SecretKey::new("", &defaults.field, &defaults.vault),
                }
            }
            _ => SecretKey::new(&caps[1], &defaults.field, &defaults.vault),
        }
    }

    /// Whether tokens of this format name their own vault and field.
    pub fn carries_location(&self) -> bool {
        matches!(self, TemplateFormat::Go)
    }
}

impl fmt::Display for TemplateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Format selection: a concrete syntax or auto-detection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum FormatChoice {
    /// Detect the syntax from the content
    #[default]
    Auto,
    /// ${NAME}
    Env,
    /// $NAME
    EnvSimple,
    /// {{ op://VAULT/NAME/FIELD }}
    Go,
    /// %%NAME%%
    Custom,
    /// {{NAME}}
    DoubleBrace,
}

impl FormatChoice {
    /// The concrete format, or `None` for `auto`.
    pub fn fixed(self) -> Option<TemplateFormat> {
        match self {
            FormatChoice::Auto => None,
            FormatChoice::Env => Some(TemplateFormat::Env),
            FormatChoice::EnvSimple => Some(TemplateFormat::EnvSimple),
            FormatChoice::Go => Some(TemplateFormat::Go),
            FormatChoice::Custom => Some(TemplateFormat::Custom),
            FormatChoice::DoubleBrace => Some(TemplateFormat::DoubleBrace),
        }
    }
}

impl From<TemplateFormat> for FormatChoice {
    fn from(format: TemplateFormat) -> Self {
        match format {
            TemplateFormat::Env => FormatChoice::Env,
            TemplateFormat::EnvSimple => FormatChoice::EnvSimple,
            TemplateFormat::Go => FormatChoice::Go,
            TemplateFormat::Custom => FormatChoice::Custom,
            TemplateFormat::DoubleBrace => FormatChoice::DoubleBrace,
        }
    }
}

/// Vault and field applied to tokens that do not name their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDefaults {
    pub vault: String,
    pub field: String,
}

impl TokenDefaults {
    pub fn new(vault: impl Into<String>) -> Self {
        Self {
            vault: vault.into(),
            field: DEFAULT_FIELD.to_string(),
        }
    }
}

impl Default for TokenDefaults {
    fn default() -> Self {
        Self::new(DEFAULT_VAULT)
    }
}
