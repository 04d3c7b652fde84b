//! CLI argument definitions for Taskbook.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{ConfigOverrides, check_sync_url};
use crate::store::IdPolicy;

/// Version string with build metadata, shown by `--version`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("TB_GIT_COMMIT"),
    " ",
    env!("TB_BUILD_TIMESTAMP"),
    ")"
);

/// Taskbook - a personal to-do tracker.
///
/// Starts an interactive menu for adding, editing, filtering and syncing
/// tasks. Tasks are loaded from the data file at startup and saved on exit.
#[derive(Parser, Debug)]
#[command(name = "tb")]
#[command(author, version, long_version = LONG_VERSION, about = "A personal to-do tracker with an interactive menu", long_about = None)]
pub struct Cli {
    /// Path of the JSON task file.
    /// Can also be set via TB_DATA_FILE environment variable.
    #[arg(long = "data-file", env = "TB_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Endpoint that receives the task list on sync.
    /// Can also be set via TB_SYNC_URL environment variable.
    #[arg(long = "sync-url", env = "TB_SYNC_URL", value_parser = parse_sync_url)]
    pub sync_url: Option<String>,

    /// How new task IDs are assigned: "length" or "next"
    #[arg(long = "id-policy", value_parser = parse_id_policy)]
    pub id_policy: Option<IdPolicy>,

    /// Path of the config file (default: ~/.config/taskbook/config.kdl).
    /// Can also be set via TB_CONFIG environment variable.
    #[arg(short = 'c', long = "config", env = "TB_CONFIG")]
    pub config_path: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long = "show-config")]
    pub show_config: bool,
}

impl Cli {
    /// Configuration overrides carried by the flags.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            data_file: self.data_file.clone(),
            sync_url: self.sync_url.clone(),
            id_policy: self.id_policy,
        }
    }
}

fn parse_sync_url(s: &str) -> Result<String, String> {
    check_sync_url(s).map(|()| s.to_string())
}

fn parse_id_policy(s: &str) -> Result<IdPolicy, String> {
    IdPolicy::parse(s).ok_or_else(|| format!("expected \"length\" or \"next\", got \"{}\"", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "tb",
            "--data-file",
            "/tmp/t.json",
            "--sync-url",
            "http://example.com/sync",
            "--id-policy",
            "next",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.data_file, Some(PathBuf::from("/tmp/t.json")));
        assert_eq!(
            overrides.sync_url.as_deref(),
            Some("http://example.com/sync")
        );
        assert_eq!(overrides.id_policy, Some(IdPolicy::Next));
    }

    #[test]
    fn test_reject_unknown_id_policy() {
        assert!(Cli::try_parse_from(["tb", "--id-policy", "random"]).is_err());
    }

    #[test]
    fn test_reject_sync_url_without_scheme() {
        let err = Cli::try_parse_from(["tb", "--sync-url", "localhost:8080/sync"]).unwrap_err();
        assert!(err.to_string().contains("http:// or https://"));
        assert!(Cli::try_parse_from(["tb", "--sync-url", "ftp://host/sync"]).is_err());
        assert!(Cli::try_parse_from(["tb", "--sync-url", "https://host/sync"]).is_ok());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
