//! Test support utilities for dotinject integration tests.
//!
//! Provides reusable test environment setup and helper commands.

#![allow(dead_code)]

pub mod assertions;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Each test gets its own temporary dotfiles dir and home dir.
/// No process-global state is mutated. Child processes use `.current_dir()`
/// and explicit env vars so tests can safely run in parallel.
pub struct Test {
    /// Temporary directory holding the templates
    pub dir: TempDir,
    /// Temporary home directory
    pub home: TempDir,
    /// Secrets exposed to the env store
    secrets: Vec<(String, String)>,
}

impl Test {
    /// Create a new empty test environment.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");

        Self {
            dir,
            home,
            secrets: Vec::new(),
        }
    }

    /// Create a test environment whose env store knows `secrets`.
    pub fn with_secrets(secrets: &[(&str, &str)]) -> Self {
        let mut t = Self::new();
        t.secrets = secrets
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        t
    }

    /// Absolute path of a file inside the test dir.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write a file (creating parent dirs) and return its path.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(&path, content).expect("failed to write file");
        path
    }

    /// Read a file from the test dir.
    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).expect("failed to read file")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// Write the config file at its default location under the temp home.
    pub fn write_config(&self, content: &str) -> PathBuf {
        let dir = self.config_home().join("dotinject");
        fs::create_dir_all(&dir).expect("failed to create config dir");
        let path = dir.join("config.toml");
        fs::write(&path, content).expect("failed to write config");
        path
    }

    /// XDG config home inside the temp home.
    pub fn config_home(&self) -> PathBuf {
        self.home.path().join(".config")
    }

    /// Files in the test dir whose names start with `prefix`.
    pub fn files_starting_with(&self, prefix: &str) -> Vec<String> {
        list_names(self.dir.path())
            .into_iter()
            .filter(|n| n.starts_with(prefix))
            .collect()
    }
}

fn list_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("failed to read dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
