//! Taskbook - a personal to-do tracker driven from an interactive text menu.
//!
//! This library provides the core functionality for the `tb` CLI tool:
//! the in-memory task store, the JSON task file, the remote sync client,
//! configuration resolution and the command loop that ties them together.

pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod storage;
pub mod store;
pub mod sync;

/// Library-level error type for Taskbook operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Task with ID {0} not found")]
    NotFound(u64),

    #[error("Invalid date (expected yyyy-mm-dd): {0}")]
    InvalidDate(String),

    #[error(transparent)]
    Sync(#[from] sync::SyncError),

    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias for Taskbook operations.
pub type Result<T> = std::result::Result<T, Error>;
