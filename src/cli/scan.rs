//! Scan command.
//!
//! Reports the detected format and the tokens of each template without
//! contacting the secret store.

use serde::Serialize;
use std::io::Read;
use std::path::Path;

use crate::cli::{load_settings, output, ScanArgs};
use crate::core::config::CliOverrides;
use crate::core::constants::STDIN_SENTINEL;
use crate::core::driver::discover;
use crate::core::template::{extract, Detection, Renderer, TokenInfo};
use crate::error::Result;

#[derive(Debug, Serialize)]
struct ScanEntry {
    path: String,
    format: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ambiguous: Vec<&'static str>,
    tokens: Vec<TokenInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// List tokens and return the exit code.
pub fn execute(args: &ScanArgs, config: Option<&Path>) -> Result<i32> {
    let overrides = CliOverrides {
        vault: args.template.vault.clone(),
        field: args.template.field.clone(),
        format: args.template.format,
        ..CliOverrides::default()
    };
    let settings = load_settings(config, &overrides)?;
    let renderer = Renderer::new(settings.defaults, settings.format);

    let entries: Vec<ScanEntry> = if args.path.as_os_str() == STDIN_SENTINEL {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        vec![scan(&renderer, &args.path, &content)]
    } else {
        discover(&args.path, args.template.recursive, &settings.suffixes)?
            .iter()
            .map(|path| match std::fs::read_to_string(path) {
                Ok(content) => scan(&renderer, path, &content),
                Err(e) => unreadable(path, &e),
            })
            .collect()
    };

    let exit = if entries
        .iter()
        .any(|e| !e.ambiguous.is_empty() || e.error.is_some())
    {
        1
    } else {
        0
    };

    if args.json {
        let json = serde_json::to_string_pretty(&entries).map_err(std::io::Error::from)?;
        println!("{}", json);
    } else {
        for entry in &entries {
            print_entry(entry);
        }
    }
    Ok(exit)
}

fn scan(renderer: &Renderer, path: &Path, content: &str) -> ScanEntry {
    let mut entry = ScanEntry {
        path: path.display().to_string(),
        format: None,
        ambiguous: Vec::new(),
        tokens: Vec::new(),
        error: None,
    };
    match renderer.select_format(content) {
        Detection::Found(format) => {
            let tokens = extract(content, format, renderer.defaults());
            if !tokens.is_empty() {
                entry.format = Some(format.name());
                entry.tokens = tokens.iter().map(TokenInfo::from).collect();
            }
        }
        Detection::Ambiguous(formats) => {
            entry.ambiguous = formats.iter().map(|f| f.name()).collect();
        }
        Detection::None => {}
    }
    entry
}

fn unreadable(path: &Path, error: &std::io::Error) -> ScanEntry {
    ScanEntry {
        path: path.display().to_string(),
        format: None,
        ambiguous: Vec::new(),
        tokens: Vec::new(),
        error: Some(format!("read error: {}", error)),
    }
}

fn print_entry(entry: &ScanEntry) {
    let path = output::path(&entry.path);
    if let Some(error) = &entry.error {
        output::error(&format!("{}: {}", path, error));
        return;
    }
    if !entry.ambiguous.is_empty() {
        output::error(&format!(
            "{}: ambiguous ({}); pass --format to choose",
            path,
            entry.ambiguous.join(", ")
        ));
        return;
    }
    match entry.format {
        Some(format) => {
            output::header(&format!("{} ({})", path, format));
            for token in &entry.tokens {
                output::list_item(&format!(
                    "{}  {}/{}/{}",
                    token.raw, token.vault, token.name, token.field
                ));
            }
        }
        None => output::dimmed(&format!("{}: no tokens", path)),
    }
}
