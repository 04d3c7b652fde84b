//! Configuration for Taskbook.
//!
//! ## config.kdl - User preferences
//!
//! Located at `~/.config/taskbook/config.kdl` unless `--config` / `TB_CONFIG`
//! points elsewhere.
//!
//! Contains:
//! - `data-file` - Path of the JSON task file
//! - `sync-url` - Endpoint that receives the task list on sync
//! - `id-policy` - "length" or "next"
//! - `sync-timeout-secs` - Optional timeout for the sync request
//!
//! ## Precedence
//!
//! CLI flag > config.kdl > defaults
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, Resolved, ResolvedConfig, ValueSource, resolve_config,
};
pub use schema::{TaskbookConfig, check_sync_url};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use kdl::KdlDocument;
use tracing::debug;

use crate::{Error, Result};

/// Name of the config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.kdl";

/// Default config file location: `<config_dir>/taskbook/config.kdl`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("taskbook").join(CONFIG_FILE_NAME))
}

/// Read and validate a config file.
///
/// A missing file is not an error and yields an empty config.
pub fn load_config_file(path: &Path) -> Result<TaskbookConfig> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file");
            return Ok(TaskbookConfig::new());
        }
        Err(e) => return Err(e.into()),
    };

    let doc: KdlDocument = text
        .parse()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    let config = TaskbookConfig::from_kdl(&doc);
    config
        .validate()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    debug!(path = %path.display(), ?config, "loaded config file");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::IdPolicy;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_config_is_empty() {
        let temp = TempDir::new().unwrap();
        let config = load_config_file(&temp.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, TaskbookConfig::default());
    }

    #[test]
    fn test_load_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "id-policy \"next\"\nsync-url \"http://127.0.0.1:9/sync\"\n").unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.id_policy, Some(IdPolicy::Next));
        assert_eq!(config.sync_url.as_deref(), Some("http://127.0.0.1:9/sync"));
    }

    #[test]
    fn test_load_config_syntax_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "sync-url \"unterminated\n").unwrap();

        assert!(matches!(load_config_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_config_invalid_value() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "sync-url \"ftp://example.com\"\n").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(err.to_string().contains("sync-url must start with"));
    }

    #[test]
    fn test_default_config_path_name() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("taskbook/config.kdl"));
        }
    }
}
