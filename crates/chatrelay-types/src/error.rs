//! Error types shared across the chatrelay crates.
//!
//! Configuration errors are fatal at startup. Chat errors come from the
//! remote platform; session and bridge errors wrap them on the way out.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while assembling startup configuration. All are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required setting '{0}' is not set")]
    Missing(&'static str),

    #[error("invalid value for '{name}': {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("failed to load config file {path}: {reason}")]
    File { path: String, reason: String },
}

/// Errors reported by the remote chat platform.
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    #[error("authentication with the chat service failed")]
    AuthenticationFailed,

    #[error("rate limited by the chat service")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("chat service error: {message}")]
    Provider { message: String },

    #[error("failed to decode response: {0}")]
    Deserialization(String),
}

/// Errors crossing from a bridge unit into the session event loop.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The event loop has exited; nothing will serve the call.
    #[error("chat session event loop is not running")]
    LoopClosed,

    #[error("chat session event loop panicked")]
    LoopPanicked,

    #[error("no history reply within {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Remote(#[from] ChatError),
}

/// Errors handling a single inbound connection.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("payload is not valid UTF-8")]
    InvalidUtf8,

    #[error(transparent)]
    Session(#[from] SessionError),
}
