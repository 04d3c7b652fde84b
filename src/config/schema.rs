//! KDL schema definition for config.kdl.
//!
//! This module provides:
//! - A Rust struct representing the KDL schema
//! - Parsing from KDL and serialization back to KDL
//! - Validation

use std::path::PathBuf;

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use tracing::warn;

use crate::store::IdPolicy;

/// User preferences stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// data-file "tasks.json"
/// sync-url "http://localhost:8080/sync"
/// id-policy "length"  // or "next"
/// sync-timeout-secs 30
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskbookConfig {
    /// Path of the JSON task file
    pub data_file: Option<PathBuf>,

    /// Endpoint receiving the task list on sync
    pub sync_url: Option<String>,

    /// How new task IDs are assigned
    pub id_policy: Option<IdPolicy>,

    /// Overall timeout for a sync request, in seconds
    pub sync_timeout_secs: Option<u64>,
}

impl TaskbookConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref path) = self.data_file {
            if path.as_os_str().is_empty() {
                return Err("data-file must not be empty".to_string());
            }
        }
        if let Some(ref url) = self.sync_url {
            check_sync_url(url)?;
        }
        if self.sync_timeout_secs == Some(0) {
            return Err("sync-timeout-secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Nodes with a value of the wrong type are skipped.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        if let Some(s) = first_string(doc, "data-file") {
            config.data_file = Some(PathBuf::from(s));
        }

        if let Some(s) = first_string(doc, "sync-url") {
            config.sync_url = Some(s.to_string());
        }

        if let Some(s) = first_string(doc, "id-policy") {
            config.id_policy = IdPolicy::parse(s);
            if config.id_policy.is_none() {
                warn!(value = s, "unknown id-policy, using default");
            }
        }

        if let Some(node) = doc.get("sync-timeout-secs") {
            if let Some(entry) = node.entries().first() {
                if let Some(i) = entry.value().as_integer() {
                    match u64::try_from(i) {
                        Ok(secs) => config.sync_timeout_secs = Some(secs),
                        Err(_) => warn!(value = %i, "sync-timeout-secs out of range"),
                    }
                }
            }
        }

        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref path) = self.data_file {
            let mut node = KdlNode::new("data-file");
            node.push(KdlEntry::new(KdlValue::String(
                path.to_string_lossy().into_owned(),
            )));
            doc.nodes_mut().push(node);
        }

        if let Some(ref url) = self.sync_url {
            let mut node = KdlNode::new("sync-url");
            node.push(KdlEntry::new(KdlValue::String(url.clone())));
            doc.nodes_mut().push(node);
        }

        if let Some(policy) = self.id_policy {
            let mut node = KdlNode::new("id-policy");
            node.push(KdlEntry::new(KdlValue::String(policy.as_str().to_string())));
            doc.nodes_mut().push(node);
        }

        if let Some(secs) = self.sync_timeout_secs {
            let mut node = KdlNode::new("sync-timeout-secs");
            node.push(KdlEntry::new(KdlValue::Integer(secs as i128)));
            doc.nodes_mut().push(node);
        }

        doc
    }
}

fn first_string<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a str> {
    doc.get(name)?.entries().first()?.value().as_string()
}

/// Reject sync URLs without an `http://` or `https://` scheme.
pub fn check_sync_url(url: &str) -> Result<(), String> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(format!(
            "sync-url must start with http:// or https://, got {}",
            url
        ))
    }
}
