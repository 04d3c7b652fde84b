//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (including their `TB_*` environment variables)
//! 2. config.kdl
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use crate::config::TaskbookConfig;
use crate::storage::DEFAULT_DATA_FILE;
use crate::store::IdPolicy;
use crate::sync::DEFAULT_SYNC_URL;

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag or its environment variable
    CliFlag,
    /// Value from the config file
    ConfigFile,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::ConfigFile => write!(f, "config"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Path of the JSON task file
    pub data_file: Resolved<PathBuf>,
    /// Sync endpoint
    pub sync_url: Resolved<String>,
    /// ID assignment policy
    pub id_policy: Resolved<IdPolicy>,
    /// Sync request timeout, if any
    pub sync_timeout: Option<Resolved<Duration>>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            data_file: Resolved::new(PathBuf::from(DEFAULT_DATA_FILE), ValueSource::Default),
            sync_url: Resolved::new(DEFAULT_SYNC_URL.to_string(), ValueSource::Default),
            id_policy: Resolved::new(IdPolicy::default(), ValueSource::Default),
            sync_timeout: None,
        }
    }
}

impl ResolvedConfig {
    pub fn data_file(&self) -> &std::path::Path {
        &self.data_file.value
    }

    pub fn sync_url(&self) -> &str {
        &self.sync_url.value
    }

    pub fn id_policy(&self) -> IdPolicy {
        self.id_policy.value
    }

    pub fn sync_timeout(&self) -> Option<Duration> {
        self.sync_timeout.as_ref().map(|r| r.value)
    }

    /// Flatten back into a config file shape.
    pub fn to_file_config(&self) -> TaskbookConfig {
        TaskbookConfig {
            data_file: Some(self.data_file.value.clone()),
            sync_url: Some(self.sync_url.value.clone()),
            id_policy: Some(self.id_policy.value),
            sync_timeout_secs: self.sync_timeout.as_ref().map(|r| r.value.as_secs()),
        }
    }

    /// Render the effective configuration as KDL, annotating each value with
    /// its source.
    pub fn describe(&self) -> String {
        let doc = self.to_file_config().to_kdl();
        let mut out = String::new();
        for node in doc.nodes() {
            let source = match node.name().value() {
                "data-file" => &self.data_file.source,
                "sync-url" => &self.sync_url.source,
                "id-policy" => &self.id_policy.source,
                _ => self
                    .sync_timeout
                    .as_ref()
                    .map(|r| &r.source)
                    .unwrap_or(&ValueSource::Default),
            };
            out.push_str(&format!("{} // {}\n", node.to_string().trim(), source));
        }
        out
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Task file override
    pub data_file: Option<PathBuf>,
    /// Sync endpoint override
    pub sync_url: Option<String>,
    /// ID policy override
    pub id_policy: Option<IdPolicy>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set task file override.
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = Some(path.into());
        self
    }

    /// Set sync endpoint override.
    pub fn with_sync_url(mut self, url: impl Into<String>) -> Self {
        self.sync_url = Some(url.into());
        self
    }

    /// Set ID policy override.
    pub fn with_id_policy(mut self, policy: IdPolicy) -> Self {
        self.id_policy = Some(policy);
        self
    }
}

/// Resolve configuration with full precedence chain.
pub fn resolve_config(file: &TaskbookConfig, overrides: &ConfigOverrides) -> ResolvedConfig {
    let mut result = ResolvedConfig::default();

    if let Some(ref path) = overrides.data_file {
        result.data_file = Resolved::new(path.clone(), ValueSource::CliFlag);
    } else if let Some(ref path) = file.data_file {
        result.data_file = Resolved::new(path.clone(), ValueSource::ConfigFile);
    }

    if let Some(ref url) = overrides.sync_url {
        result.sync_url = Resolved::new(url.clone(), ValueSource::CliFlag);
    } else if let Some(ref url) = file.sync_url {
        result.sync_url = Resolved::new(url.clone(), ValueSource::ConfigFile);
    }

    if let Some(policy) = overrides.id_policy {
        result.id_policy = Resolved::new(policy, ValueSource::CliFlag);
    } else if let Some(policy) = file.id_policy {
        result.id_policy = Resolved::new(policy, ValueSource::ConfigFile);
    }

    // Only settable from the config file; no timeout by default.
    if let Some(secs) = file.sync_timeout_secs {
        result.sync_timeout = Some(Resolved::new(
            Duration::from_secs(secs),
            ValueSource::ConfigFile,
        ));
    }

    result
}
