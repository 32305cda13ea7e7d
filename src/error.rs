//! Error types for dotinject.
//!
//! Errors are grouped by the area that raises them and unified under
//! [`Error`]. Per-file failures in a batch run are reported through the
//! driver's report rather than bubbling up as `Err`.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::template::TemplateFormat;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("unknown secret store: {0} (expected onepassword or env)")]
    UnknownStore(String),
}

/// Secret store adapter errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{store} is not authenticated")]
    Unauthenticated { store: &'static str },

    #[error("{0}")]
    Unavailable(String),

    #[error("lookup of {key} timed out after {secs}s")]
    Timeout { key: String, secs: u64 },

    #[error("lookup of {key} failed: {reason}")]
    Command { key: String, reason: String },

    #[error("value for {0} is not valid UTF-8")]
    InvalidUtf8(String),
}

impl StoreError {
    /// Whether this error makes the whole store unusable for the run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StoreError::Unauthenticated { .. } | StoreError::Unavailable(_)
        )
    }
}

/// Template detection and rendering errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("ambiguous template format: found {}", list_formats(.0))]
    Ambiguous(Vec<TemplateFormat>),

    #[error("unresolved secrets: {}", .0.join(", "))]
    Unresolved(Vec<String>),
}

fn list_formats(formats: &[TemplateFormat]) -> String {
    formats
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// File driver errors.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is a directory; --output only applies to single files")]
    OutputForDirectory(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
