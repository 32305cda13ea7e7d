//! Format auto-detection.
//!
//! Detection is conservative: when tokens of more than one syntax are
//! present the content is reported as ambiguous instead of guessing.

use tracing::trace;

use super::TemplateFormat;

/// Result of scanning content for token syntaxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// Exactly one syntax is present.
    Found(TemplateFormat),
    /// Several syntaxes are present, in detection order.
    Ambiguous(Vec<TemplateFormat>),
    /// No tokens at all.
    None,
}

/// Decide which token syntax `content` uses.
pub fn detect(content: &str) -> Detection {
    let present: Vec<TemplateFormat> = TemplateFormat::ALL
        .into_iter()
        .filter(|f| f.pattern().is_match(content))
        .collect();

    trace!(formats = ?present, "detected token formats");

    match present.as_slice() {
        [] => Detection::None,
        [only] => Detection::Found(*only),
        _ => Detection::Ambiguous(present),
    }
}
