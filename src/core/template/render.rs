//! Template rendering.
//!
//! A render pass extracts the unique tokens, resolves each referenced secret
//! once, and then substitutes every occurrence in a single `replace_all`
//! over the original content. Substituted text is never scanned again, so a
//! secret whose value looks like a token stays literal.

use regex::Captures;
use std::collections::HashMap;
use tracing::debug;

use super::detect::{detect, Detection};
use super::extract::{extract, Token};
use super::{FormatChoice, TemplateFormat, TokenDefaults};
use crate::core::constants::REDACTED;
use crate::core::secret::{Lookup, SecretKey};
use crate::error::{Result, StoreError, TemplateError};

/// What to do with tokens that could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Any unresolved token fails the render.
    #[default]
    Strict,
    /// Unresolved tokens stay verbatim and are reported as warnings.
    BestEffort,
}

/// Terminal state of a completed render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    Success,
    PartialSuccess,
    Failed,
}

/// Output of a render pass.
#[derive(Debug, Clone)]
pub struct RenderResult {
    output: String,
    redacted: String,
    format: TemplateFormat,
    tokens: Vec<Token>,
    resolved: usize,
    missing: Vec<String>,
    failed: Vec<String>,
}

impl RenderResult {
    /// Rendered content.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Rendered content with every substituted value masked.
    pub fn redacted(&self) -> &str {
        &self.redacted
    }

    /// Format the pass ran with.
    pub fn format(&self) -> TemplateFormat {
        self.format
    }

    /// Unique tokens, in order of first appearance.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of unique tokens that resolved.
    pub fn resolved_count(&self) -> usize {
        self.resolved
    }

    /// Tokens whose secret does not exist in the store.
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    /// Tokens whose lookup failed (timeout, process error).
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// Every unresolved token, missing first.
    pub fn unresolved(&self) -> Vec<String> {
        self.missing.iter().chain(self.failed.iter()).cloned().collect()
    }

    /// Whether every token resolved.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.failed.is_empty()
    }

    /// Final state under `mode`.
    pub fn status(&self, mode: Mode) -> RenderStatus {
        match (self.is_complete(), mode) {
            (true, _) => RenderStatus::Success,
            (false, Mode::BestEffort) => RenderStatus::PartialSuccess,
            (false, Mode::Strict) => RenderStatus::Failed,
        }
    }
}

/// Render `content` in a fixed `format`.
///
/// `resolve` is called once per unique secret. It returns a [`Lookup`] for
/// per-key outcomes; an `Err` aborts the whole render.
///
/// # Errors
///
/// Returns the error produced by `resolve`, if any.
pub fn render<F>(
    content: &str,
    format: TemplateFormat,
    defaults: &TokenDefaults,
    mut resolve: F,
) -> Result<RenderResult>
where
    F: FnMut(&SecretKey) -> std::result::Result<Lookup, StoreError>,
{
    let tokens = extract(content, format, defaults);
    let mut lookups: HashMap<SecretKey, Lookup> = HashMap::with_capacity(tokens.len());
    let mut resolved = 0;
    let mut missing = Vec::new();
    let mut failed = Vec::new();

    for token in &tokens {
        let lookup = resolve(token.key())?;
        match &lookup {
            Lookup::Found(_) => resolved += 1,
            Lookup::NotFound => missing.push(token.label()),
            Lookup::Failed(reason) => {
                debug!(token = %token.label(), %reason, "lookup failed");
                failed.push(token.label());
            }
        }
        lookups.insert(token.key().clone(), lookup);
    }

    let pattern = format.pattern();
    let output = pattern
        .replace_all(content, |caps: &Captures<'_>| {
            let key = format.key_for(caps, defaults);
            match lookups.get(&key).and_then(Lookup::value) {
                Some(value) => value.expose().to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned();
    let redacted = pattern
        .replace_all(content, |caps: &Captures<'_>| {
            let key = format.key_for(caps, defaults);
            match lookups.get(&key).and_then(Lookup::value) {
                Some(_) => REDACTED.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned();

    debug!(
        format = %format,
        tokens = tokens.len(),
        resolved,
        missing = missing.len(),
        failed = failed.len(),
        "rendered template"
    );

    Ok(RenderResult {
        output,
        redacted,
        format,
        tokens,
        resolved,
        missing,
        failed,
    })
}

/// Outcome of detecting and rendering one piece of content.
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    /// No tokens were found; the content is left as is.
    NoTemplate,
    /// Auto-detection found several syntaxes.
    Ambiguous(Vec<TemplateFormat>),
    /// Tokens were found and a render pass ran.
    Rendered(RenderResult),
}

/// Detection plus rendering with shared defaults.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    defaults: TokenDefaults,
    choice: FormatChoice,
}

impl Renderer {
    pub fn new(defaults: TokenDefaults, choice: FormatChoice) -> Self {
        Self { defaults, choice }
    }

    pub fn defaults(&self) -> &TokenDefaults {
        &self.defaults
    }

    /// Pick the concrete format for `content`.
    pub fn select_format(&self, content: &str) -> Detection {
        match self.choice.fixed() {
            Some(format) => Detection::Found(format),
            None => detect(content),
        }
    }

    /// Detect, extract, resolve and substitute.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `resolve`, if any.
    pub fn run<F>(&self, content: &str, resolve: F) -> Result<RenderOutcome>
    where
        F: FnMut(&SecretKey) -> std::result::Result<Lookup, StoreError>,
    {
        let format = match self.select_format(content) {
            Detection::Found(format) => format,
            Detection::Ambiguous(formats) => return Ok(RenderOutcome::Ambiguous(formats)),
            Detection::None => return Ok(RenderOutcome::NoTemplate),
        };

        if !format.pattern().is_match(content) {
            return Ok(RenderOutcome::NoTemplate);
        }

        render(content, format, &self.defaults, resolve).map(RenderOutcome::Rendered)
    }

    /// Render and require every token to resolve.
    ///
    /// Content without tokens comes back unchanged.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::Ambiguous` or `TemplateError::Unresolved`, or
    /// the error produced by `resolve`.
    pub fn render_strict<F>(&self, content: &str, resolve: F) -> Result<String>
    where
        F: FnMut(&SecretKey) -> std::result::Result<Lookup, StoreError>,
    {
        match self.run(content, resolve)? {
            RenderOutcome::NoTemplate => Ok(content.to_string()),
            RenderOutcome::Ambiguous(formats) => Err(TemplateError::Ambiguous(formats).into()),
            RenderOutcome::Rendered(result) if result.is_complete() => Ok(result.output),
            RenderOutcome::Rendered(result) => {
                Err(TemplateError::Unresolved(result.unresolved()).into())
            }
        }
    }
}
