//! One-way upload of the task list to a remote endpoint.
//!
//! A sync is a single blocking `POST` of the full task list as a JSON array.
//! Only a `200 OK` counts as success. There is no retry and nothing from the
//! response is merged back into the local store.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::Task;

/// Default sync endpoint.
pub const DEFAULT_SYNC_URL: &str = "http://localhost:8080/sync";

/// Errors that can occur while pushing tasks to the server.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The server answered with something other than 200 OK
    #[error("{code} {status_text}")]
    Status { code: u16, status_text: String },

    /// The request could not be sent or no response was received
    #[error("{0}")]
    Transport(String),
}

/// Blocking client for the sync endpoint.
pub struct SyncClient {
    url: String,
    agent: ureq::Agent,
}

impl SyncClient {
    /// Create a client for `url`. Without a timeout a stalled server blocks
    /// until the connection fails.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            url: url.into(),
            agent: builder.build(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Upload the full task list.
    pub fn push(&self, tasks: &[Task]) -> crate::Result<()> {
        let body = serde_json::to_string(tasks)?;
        debug!(url = %self.url, bytes = body.len(), "syncing tasks");

        let response = self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/json")
            .send_string(&body);

        match response {
            Ok(resp) if resp.status() == 200 => {
                info!(url = %self.url, count = tasks.len(), "tasks synced");
                Ok(())
            }
            Ok(resp) => Err(status_error(resp.status(), resp.status_text()).into()),
            Err(ureq::Error::Status(code, resp)) => {
                Err(status_error(code, resp.status_text()).into())
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "sync request failed");
                Err(SyncError::Transport(e.to_string()).into())
            }
        }
    }
}

fn status_error(code: u16, status_text: &str) -> SyncError {
    warn!(code, status_text, "sync rejected by server");
    SyncError::Status {
        code,
        status_text: status_text.to_string(),
    }
}
