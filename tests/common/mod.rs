//! Shared testing utilities for deckchain integration tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const CHAT_PATH: &str = "/v1/chat/completions";

const DECKCHAIN_ENV: [&str; 12] = [
    "DECKCHAIN_CONFIG",
    "DECKCHAIN_API_KEY",
    "DECKCHAIN_API_URL",
    "DECKCHAIN_PRIMARY_MODEL",
    "DECKCHAIN_FALLBACK_MODEL",
    "DECKCHAIN_TEMPERATURE",
    "DECKCHAIN_MAX_TOKENS",
    "DECKCHAIN_TIMEOUT_MS",
    "DECKCHAIN_MAX_RETRIES",
    "DECKCHAIN_BASE_DELAY_MS",
    "DECKCHAIN_MAX_BACKOFF_MS",
    "OPENAI_API_KEY",
];

/// Isolated working directory for CLI invocations.
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

    /// Build a command for the compiled `deckchain` binary with a clean environment.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("deckchain").expect("Failed to locate deckchain binary");
        cmd.current_dir(&self.work_dir).env("HOME", self.root.path());
        for var in DECKCHAIN_ENV {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Command wired to a mock provider with fast retries.
    pub fn cli_against(&self, server_url: &str) -> Command {
        let mut cmd = self.cli();
        cmd.env("DECKCHAIN_API_KEY", "test-key")
            .env("DECKCHAIN_API_URL", format!("{}{}", server_url, CHAT_PATH))
            .env("DECKCHAIN_PRIMARY_MODEL", "primary-model")
            .env("DECKCHAIN_FALLBACK_MODEL", "fallback-model")
            .env("DECKCHAIN_BASE_DELAY_MS", "1")
            .env("DECKCHAIN_MAX_BACKOFF_MS", "5")
            .env("DECKCHAIN_TIMEOUT_MS", "5000");
        cmd
    }

    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.work_dir.join(name);
        fs::write(&path, content).expect("Failed to write test file");
        path
    }
}

/// Chat-completions response body whose message content is `content`.
#[allow(dead_code)]
pub fn completion_body(content: &serde_json::Value) -> String {
    serde_json::json!({
        "choices": [{
            "message": {"role": "assistant", "content": content.to_string()},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}
