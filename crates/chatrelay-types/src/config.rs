//! Relay configuration types.
//!
//! `RelayConfig` is the optional `chatrelay.toml` file. Every field has a
//! default, so an empty or missing file yields a working configuration.
//! Credentials never live here; they come from the environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Literal command that requests channel history instead of a post.
pub const HISTORY_COMMAND: &str = "/history";

/// Text returned for history while the target channel is unresolved.
pub const HISTORY_FALLBACK_TEXT: &str = "History channel not found.";

/// Text written back when a history request fails or times out.
pub const HISTORY_UNAVAILABLE_TEXT: &str = "History unavailable.";

/// Tunables for the TCP listener and the chat session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Interface the listener binds to.
    #[serde(default = "default_listen_host")]
    pub listen_host: String,

    /// TCP port the listener binds to.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Pending-connection backlog passed to `listen(2)`.
    #[serde(default = "default_listen_backlog")]
    pub listen_backlog: u32,

    /// Largest payload read from a single connection, in bytes.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,

    /// Number of recent messages returned by a history request.
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,

    /// How long a bridge unit waits for a history reply. `0` waits forever.
    #[serde(default = "default_history_timeout_secs")]
    pub history_timeout_secs: u64,

    /// Read and write timeout on each client connection. `0` disables it.
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,

    /// Base URL of the chat platform REST API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_listen_host() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    10000
}

fn default_listen_backlog() -> u32 {
    5
}

fn default_max_payload_bytes() -> usize {
    1024
}

fn default_history_limit() -> u32 {
    25
}

fn default_history_timeout_secs() -> u64 {
    30
}

fn default_io_timeout_secs() -> u64 {
    30
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_host: default_listen_host(),
            listen_port: default_listen_port(),
            listen_backlog: default_listen_backlog(),
            max_payload_bytes: default_max_payload_bytes(),
            history_limit: default_history_limit(),
            history_timeout_secs: default_history_timeout_secs(),
            io_timeout_secs: default_io_timeout_secs(),
            api_base: default_api_base(),
        }
    }
}

impl RelayConfig {
    /// `host:port` string for binding the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_host, self.listen_port)
    }

    /// Bound on the history wait, or `None` for an unbounded wait.
    pub fn history_timeout(&self) -> Option<Duration> {
        match self.history_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Socket timeout for client connections, or `None` to block forever.
    pub fn io_timeout(&self) -> Option<Duration> {
        match self.io_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
