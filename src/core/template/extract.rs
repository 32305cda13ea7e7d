//! Token extraction.

use serde::Serialize;
use std::collections::HashSet;

use super::{TemplateFormat, TokenDefaults};
use crate::core::secret::SecretKey;

/// A placeholder found in template content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    raw: String,
    key: SecretKey,
    format: TemplateFormat,
}

impl Token {
    /// Text of the first occurrence, exactly as written.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The secret this token refers to.
    pub fn key(&self) -> &SecretKey {
        &self.key
    }

    /// Secret name.
    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// Identifier used in diagnostics.
    ///
    /// Formats that carry their own location are shown as `VAULT/NAME/FIELD`
    /// so two fields of the same item stay distinguishable.
    pub fn label(&self) -> String {
        if self.format.carries_location() {
            self.key.to_string()
        } else {
            self.key.name().to_string()
        }
    }
}

/// Serializable view of a token for `scan --json`.
#[derive(Debug, Serialize)]
pub struct TokenInfo {
    pub raw: String,
    pub name: String,
    pub field: String,
    pub vault: String,
}

impl From<&Token> for TokenInfo {
    fn from(token: &Token) -> Self {
        Self {
            raw: token.raw.clone(),
            name: token.key.name().to_string(),
            field: token.key.field().to_string(),
            vault: token.key.vault().to_string(),
        }
    }
}

/// List the unique tokens of `format` in `content`, in order of first
/// appearance.
///
/// Tokens are unique by the secret they reference, so `{{FOO}}` and
/// `{{ FOO }}` collapse into one entry.
pub fn extract(content: &str, format: TemplateFormat, defaults: &TokenDefaults) -> Vec<Token> {
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();

    for caps in format.pattern().captures_iter(content) {
        let key = format.key_for(&caps, defaults);
        if seen.insert(key.clone()) {
            tokens.push(Token {
                raw: caps[0].to_string(),
                key,
                format,
            });
        }
    }

    tokens
}
