//! Shared testing utilities for pveqc CLI tests.

use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated working directory with its own state directory.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
    work_dir: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let work_dir = root.path().join("work");
        fs::create_dir_all(&work_dir).expect("Failed to create test work directory");
        Self { root, work_dir }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Default state directory used by the binary in `work_dir`.
    pub fn state_dir(&self) -> PathBuf {
        self.work_dir.join(".pveqc")
    }

    /// Build a command for the compiled `pveqc` binary inside `work_dir`.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("pveqc").expect("Failed to locate pveqc binary");
        cmd.current_dir(&self.work_dir)
            .env_remove("PVEQC_STATE_DIR")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Write `<state-dir>/config.toml`.
    pub fn write_config(&self, content: &str) {
        fs::create_dir_all(self.state_dir()).expect("Failed to create state directory");
        fs::write(self.state_dir().join("config.toml"), content).expect("Failed to write config");
    }

    pub fn state_file(&self, key: &str) -> PathBuf {
        self.state_dir().join(format!("{}.json", key))
    }

    /// Run `batch <args>` and expect success.
    pub fn batch(&self, args: &[&str]) {
        self.cli().arg("batch").args(args).assert().success();
    }

    /// Parsed `batch show --json` output.
    pub fn report(&self) -> Value {
        let output =
            self.cli().args(["batch", "show", "--json"]).output().expect("Failed to run pveqc");
        assert!(output.status.success(), "batch show failed: {:?}", output);
        serde_json::from_slice(&output.stdout).expect("batch show --json should print JSON")
    }

    /// VM ids of the templates in the report, in order.
    pub fn vm_ids(&self) -> Vec<u64> {
        self.report()["templates"]
            .as_array()
            .expect("templates should be an array")
            .iter()
            .map(|row| row["vmId"].as_u64().expect("vmId should be a number"))
            .collect()
    }

    /// OS ids of the templates in the report, in order.
    pub fn os_ids(&self) -> Vec<String> {
        self.report()["templates"]
            .as_array()
            .expect("templates should be an array")
            .iter()
            .map(|row| row["osId"].as_str().expect("osId should be a string").to_string())
            .collect()
    }
}
