//! Shared helpers for the CLI integration tests.
#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestFixture {
    temp_dir: TempDir,
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// `runtrace` isolated from the user's config and `RUST_LOG`.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_runtrace"));
        cmd.env("RUNTRACE_CONFIG", self.temp_dir.path().join("missing.toml"))
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn write_config(&self, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join("config.toml");
        std::fs::write(&path, content).expect("Failed to write config");
        path
    }

    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write input");
        path
    }
}

/// Raw vendor sample shared with the providers crate.
pub fn provider_sample(name: &str) -> PathBuf {
    crates_dir().join("runtrace-providers/tests/samples").join(name)
}

/// Raw vendor fixture shared with the engine crate.
pub fn engine_fixture(name: &str) -> PathBuf {
    crates_dir().join("runtrace-engine/tests/fixtures").join(name)
}

fn crates_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("crate lives under crates/")
        .to_path_buf()
}

pub fn parse_ndjson(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line is JSON"))
        .collect()
}
