//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// A temporary project directory the binary is run from.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// A devboot command in the project directory, isolated from the
    /// caller's devboot environment variables
    pub fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_devboot"));
        command
            .current_dir(self.path())
            .env_remove("DEVBOOT_ENV_FILE")
            .env_remove("DEVBOOT_TOOLING_DIR")
            .env_remove("RUST_LOG")
            .args(args);
        command
    }

    /// Run devboot from the project directory
    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("Failed to execute devboot")
    }

    /// Run devboot with `--json` and parse stdout
    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let mut all = vec!["--json"];
        all.extend_from_slice(args);
        let output = self.run(&all);
        assert!(
            output.status.success(),
            "devboot {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Override file exercising comments, quotes and malformed lines
#[allow(dead_code)]
pub const SAMPLE_ENV: &str = r#"
# pinned toolchain
FLUTTER_CHANNEL=beta
FLUTTER_REF = "3.22.0"
ANDROID_NDK='27.0.12077973'
this line is ignored
EXTRA_KEY=kept
"#;
