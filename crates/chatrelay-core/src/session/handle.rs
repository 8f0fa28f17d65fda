//! Cross-thread access to the chat session.
//!
//! `SessionHandle` is the only way code outside the event loop reaches the
//! session. It submits commands onto the loop's queue: posts are
//! fire-and-forget, history requests block the calling thread on a one-shot
//! reply channel.

use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError};
use std::time::Duration;

use chatrelay_types::error::{ChatError, SessionError};
use tokio::sync::mpsc;

/// Work item executed on the session event loop.
#[derive(Debug)]
pub enum SessionCommand {
    /// Post the text verbatim. No reply.
    Post { text: String },

    /// Fetch history; the result goes back over `reply`.
    History {
        reply: std_mpsc::SyncSender<Result<String, ChatError>>,
    },
}

/// The two session operations available to bridge units.
pub trait RelaySession: Send + Sync {
    /// Queue a post and return immediately.
    ///
    /// Fails only when the event loop is gone; delivery problems are
    /// logged on the loop, never reported here.
    fn post_message(&self, text: String) -> Result<(), SessionError>;

    /// Request history and block until it arrives.
    ///
    /// Call this from a thread that is allowed to block (a plain thread or
    /// `spawn_blocking`), never from inside an async task.
    fn fetch_history(&self) -> Result<String, SessionError>;
}

/// Cloneable, thread-safe submitter for [`SessionCommand`]s.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    history_timeout: Option<Duration>,
}

impl SessionHandle {
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<SessionCommand>,
        history_timeout: Option<Duration>,
    ) -> Self {
        Self {
            commands,
            history_timeout,
        }
    }

    /// Whether the event loop is still accepting commands.
    pub fn is_open(&self) -> bool {
        !self.commands.is_closed()
    }

    fn submit(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .map_err(|_| SessionError::LoopClosed)
    }
}

impl RelaySession for SessionHandle {
    fn post_message(&self, text: String) -> Result<(), SessionError> {
        self.submit(SessionCommand::Post { text })
    }

    fn fetch_history(&self) -> Result<String, SessionError> {
        let (reply, result) = std_mpsc::sync_channel(1);
        self.submit(SessionCommand::History { reply })?;

        let outcome = match self.history_timeout {
            Some(timeout) => result.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => SessionError::Timeout(timeout),
                RecvTimeoutError::Disconnected => SessionError::LoopClosed,
            })?,
            None => result.recv().map_err(|_| SessionError::LoopClosed)?,
        };

        outcome.map_err(SessionError::from)
    }
}
