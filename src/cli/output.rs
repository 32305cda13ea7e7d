//! Shared CLI output helpers for consistent terminal output.
//!
//! Color scheme (respects NO_COLOR):
//! - Green: success, checkmarks, added diff lines
//! - Red: errors, removed diff lines
//! - Yellow: warnings
//! - Cyan: paths, hints
//! - Bold: headers, important values
//! - Dimmed: secondary info
//!
//! Status lines go to stderr so rendered content on stdout stays clean.

use console::style;
use std::fmt::Display;

const RULE_WIDTH: usize = 56;

/// Check if color output is disabled via NO_COLOR env var.
fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none() && console::colors_enabled_stderr()
}

/// Print a success message with checkmark (green).
///
/// Example: `✓ ~/.gitconfig (2 secrets)`
pub fn success(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("✓").green(), msg);
    } else {
        eprintln!("✓ {}", msg);
    }
}

/// Print an error message (red).
///
/// Example: `✗ file not found`
pub fn error(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("✗").red(), msg);
    } else {
        eprintln!("✗ {}", msg);
    }
}

/// Print a warning message (yellow).
///
/// Example: `⚠ unresolved GITHUB_TOKEN left in output`
pub fn warn(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("⚠").yellow(), msg);
    } else {
        eprintln!("⚠ {}", msg);
    }
}

/// Print a hint message (cyan).
///
/// Example: `→ run: op signin`
pub fn hint(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("→").cyan(), style(msg).cyan());
    } else {
        eprintln!("→ {}", msg);
    }
}

/// Print a bold section header.
pub fn header(title: &str) {
    if colors_enabled() {
        eprintln!("{}", style(title).bold());
    } else {
        eprintln!("{}", title);
    }
}

/// Print a key-value pair (label dimmed, value bold).
///
/// Example: `  store:  1password`
pub fn kv(label: &str, value: impl Display) {
    if colors_enabled() {
        eprintln!("  {}  {}", style(label).dim(), style(value).bold());
    } else {
        eprintln!("  {}  {}", label, value);
    }
}

/// Print a list item with bullet.
pub fn list_item(item: &str) {
    eprintln!("  • {}", item);
}

/// Print a horizontal rule separator.
pub fn rule() {
    let line = "─".repeat(RULE_WIDTH);
    if colors_enabled() {
        eprintln!("{}", style(line).dim());
    } else {
        eprintln!("{}", line);
    }
}

/// Format a path string in cyan.
pub fn path(p: impl Display) -> String {
    if colors_enabled() {
        style(p).cyan().to_string()
    } else {
        p.to_string()
    }
}

/// Print a dimmed/secondary message.
pub fn dimmed(msg: &str) {
    if colors_enabled() {
        eprintln!("{}", style(msg).dim());
    } else {
        eprintln!("{}", msg);
    }
}

/// Print a section header with a separator line.
pub fn section(title: &str) {
    eprintln!();
    header(title);
    rule();
}

/// Print a diff to stdout, coloring `+`/`-` lines.
pub fn diff(text: &str) {
    let color = std::env::var_os("NO_COLOR").is_none() && console::colors_enabled();
    for line in text.lines() {
        if !color {
            println!("{}", line);
        } else if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", style(line).bold());
        } else if line.starts_with('+') {
            println!("{}", style(line).green());
        } else if line.starts_with('-') {
            println!("{}", style(line).red());
        } else if line.starts_with("@@") {
            println!("{}", style(line).cyan());
        } else {
            println!("{}", line);
        }
    }
}
