// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

pub const TRADE_HEADER: &str = "receive_ts;exchange_ts;price;quantity;side";
pub const LEVEL_HEADER: &str = "receive_ts;exchange_ts;price;quantity;side;rebuild";

/// Run the built tickmerge binary with the given arguments
pub fn run_tickmerge(args: &[&str]) -> (String, String, i32) {
    run_tickmerge_in(None, args)
}

/// Run tickmerge with an explicit working directory
pub fn run_tickmerge_in(cwd: Option<&Path>, args: &[&str]) -> (String, String, i32) {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tickmerge"));
    cmd.args(args)
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().expect("Failed to execute tickmerge");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Write `content` to `<dir>/<name>` and return the path
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write fixture file");
    path
}

/// Trade log with one record per `(receive_ts, price)` pair
pub fn trade_log(rows: &[(u64, f64)]) -> String {
    let mut text = format!("{}\n", TRADE_HEADER);
    for (receive_ts, price) in rows {
        text.push_str(&format!("{};{};{};1.0;bid\n", receive_ts, receive_ts, price));
    }
    text
}

/// Level log with one record per `(receive_ts, price)` pair
pub fn level_log(rows: &[(u64, f64)]) -> String {
    let mut text = format!("{}\n", LEVEL_HEADER);
    for (receive_ts, price) in rows {
        text.push_str(&format!("{};{};{};2.5;ask;0\n", receive_ts, receive_ts, price));
    }
    text
}

/// Temporary input and output directories for one run
pub struct Workspace {
    pub root: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        fs::create_dir(root.path().join("input")).expect("Failed to create input dir");
        Self { root }
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.path().join("input")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.path().join("output")
    }

    pub fn add_input(&self, name: &str, content: &str) -> PathBuf {
        write_file(&self.input_dir(), name, content)
    }

    /// Write a config.ini in the workspace root pointing at the input and output dirs
    pub fn write_config(&self, extra: &str) -> PathBuf {
        let content = format!(
            "[main]\ninput = {}\noutput = {}\n{}",
            self.input_dir().display(),
            self.output_dir().display(),
            extra
        );
        write_file(self.root.path(), "config.ini", &content)
    }

    pub fn read_output(&self, name: &str) -> String {
        fs::read_to_string(self.output_dir().join(name))
            .unwrap_or_else(|e| panic!("Failed to read output {}: {}", name, e))
    }
}
