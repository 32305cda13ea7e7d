//! Check command.
//!
//! Verifies that the configured secret store can answer lookups.

use std::path::Path;

use crate::cli::{load_settings, output};
use crate::core::config::{CliOverrides, Config};
use crate::core::store::{self, StoreKind};
use crate::error::Result;

/// Check store readiness and show the effective settings.
pub fn execute(store_kind: Option<StoreKind>, config: Option<&Path>) -> Result<i32> {
    let overrides = CliOverrides {
        store: store_kind,
        ..CliOverrides::default()
    };
    let settings = load_settings(config, &overrides)?;

    output::section("dotinject");
    let config_path = config
        .map(Path::to_path_buf)
        .or_else(Config::default_path)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "none".to_string());
    output::kv("config:", config_path);
    output::kv("store: ", settings.store);
    output::kv("vault: ", &settings.defaults.vault);
    output::kv("field: ", &settings.defaults.field);
    let cache = if settings.cache.enabled {
        format!("{}s", settings.cache.ttl.as_secs())
    } else {
        "off".to_string()
    };
    output::kv("cache: ", cache);
    eprintln!();

    let backend = store::build(settings.store, settings.timeout);
    backend.ensure_ready()?;
    output::success(&format!("{} is ready", backend.name()));
    Ok(0)
}
