//! Common test utilities for taskbook integration tests.
//!
//! Provides `TestEnv` for isolated test environments that never touch the
//! user's own task file or `~/.config/taskbook/config.kdl`.

#![allow(dead_code)]

use assert_cmd::Command;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
pub use tempfile::TempDir;

/// Input that adds one overdue task.
pub const ADD_MILK: &str = "1\nBuy milk\nhigh\n2020-01-15\nerrands\n2 litres\ndairy,shop\n";

/// Input that adds one task due far in the future.
pub const ADD_TAXES: &str = "1\nFile taxes\nlow\n2999-04-15\nadmin\npaperwork\nmoney\n";

/// A test environment with isolated data and config files.
///
/// The `tb()` method returns a `Command` with `TB_DATA_FILE`, `TB_CONFIG` and
/// `TB_SYNC_URL` set per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an isolated directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the tb binary with isolated files.
    pub fn tb(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tb"));
        cmd.current_dir(self.dir.path());
        cmd.env("TB_DATA_FILE", self.data_file());
        cmd.env("TB_CONFIG", self.config_file());
        cmd.env("TB_SYNC_URL", unreachable_url());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Path of the task file used by `tb()`.
    pub fn data_file(&self) -> PathBuf {
        self.dir.path().join("tasks.json")
    }

    /// Path of the config file used by `tb()`. Absent until written.
    pub fn config_file(&self) -> PathBuf {
        self.dir.path().join("config.kdl")
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the config file.
    pub fn write_config(&self, contents: &str) {
        std::fs::write(self.config_file(), contents).unwrap();
    }

    /// Read the task file as JSON.
    pub fn read_tasks(&self) -> serde_json::Value {
        let text = std::fs::read_to_string(self.data_file()).unwrap();
        serde_json::from_str(&text).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// A URL on a port nothing is listening on.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    format!("http://127.0.0.1:{}/sync", port)
}

/// Request captured by a [`one_shot_server`].
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<String>,
    pub body: String,
}

/// Serve exactly one HTTP request, answering with `status_line`
/// (e.g. `"200 OK"`). Returns the URL to post to and a receiver for the
/// captured request.
pub fn one_shot_server(status_line: &'static str) -> (String, mpsc::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/sync", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut headers = Vec::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end().to_string();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
            headers.push(line);
        }

        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).unwrap();

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            status_line
        )
        .unwrap();

        tx.send(CapturedRequest {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: String::from_utf8(body).unwrap(),
        })
        .unwrap();
    });

    (url, rx)
}
