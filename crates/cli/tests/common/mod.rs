//! Common utilities for integration tests

pub mod cli;

use std::path::PathBuf;
use tempfile::TempDir;

/// Temporary config location that is removed on drop
pub struct TestConfig {
    _dir: TempDir,
    pub path: PathBuf,
}

impl TestConfig {
    pub fn new() -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        let path = dir.path().join("lull").join("config.toml");
        Ok(Self { _dir: dir, path })
    }
}
