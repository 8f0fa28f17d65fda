//! The session event loop.
//!
//! One dedicated OS thread runs a current-thread tokio runtime with a
//! `LocalSet`. The `ChatSession` lives in an `Rc` on that thread, so all
//! session work is serialized there; commands submitted through
//! `SessionHandle` are each spawned as a local task and interleave
//! cooperatively.
//!
//! The loop ends when every `SessionHandle` has been dropped (after
//! draining in-flight commands) or when login fails.

use std::rc::Rc;
use std::thread::JoinHandle;
use std::time::Duration;

use chatrelay_types::chat::ChannelId;
use chatrelay_types::error::{ChatError, SessionError};
use tokio::sync::mpsc;
use tokio::task::{JoinSet, LocalSet};
use tracing::{debug, error, info, warn};

use super::chat_session::ChatSession;
use super::handle::{SessionCommand, SessionHandle};
use crate::platform::ChatPlatform;

/// Settings for a session event loop.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub channel_id: ChannelId,
    pub history_limit: u32,
    /// Bound on each history wait. `None` waits forever.
    pub history_timeout: Option<Duration>,
}

/// Owner's view of a running event loop thread.
#[derive(Debug)]
pub struct SessionLoop {
    thread: JoinHandle<Result<(), ChatError>>,
}

impl SessionLoop {
    /// Start the event loop on its own thread and return a handle to it.
    ///
    /// Login and channel resolution start immediately; commands submitted
    /// before they finish see the session as not ready.
    pub fn spawn<P>(platform: P, settings: SessionSettings) -> std::io::Result<(SessionHandle, Self)>
    where
        P: ChatPlatform + Send + 'static,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = SessionHandle::new(tx, settings.history_timeout);

        let thread = std::thread::Builder::new()
            .name("chatrelay-session".to_string())
            .spawn(move || {
                let session = Rc::new(ChatSession::new(
                    platform,
                    settings.channel_id,
                    settings.history_limit,
                ));
                LocalSet::new().block_on(&runtime, run(session, rx))
            })?;

        Ok((handle, Self { thread }))
    }

    /// Whether the loop thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Block until the loop exits and return its outcome.
    ///
    /// Only returns once every `SessionHandle` is dropped, unless login
    /// failed.
    pub fn join(self) -> Result<(), SessionError> {
        match self.thread.join() {
            Ok(result) => result.map_err(SessionError::from),
            Err(_) => Err(SessionError::LoopPanicked),
        }
    }
}

async fn run<P>(
    session: Rc<ChatSession<P>>,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
) -> Result<(), ChatError>
where
    P: ChatPlatform + 'static,
{
    let startup = session.start();
    tokio::pin!(startup);
    let mut started = false;
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            result = &mut startup, if !started => {
                started = true;
                if let Err(err) = result {
                    error!(error = %err, "chat session login failed");
                    return Err(err);
                }
            }
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
            command = commands.recv() => match command {
                Some(command) => {
                    in_flight.spawn_local(dispatch(Rc::clone(&session), command));
                }
                None => break,
            },
        }
    }

    debug!(pending = in_flight.len(), "command queue closed, draining");
    while in_flight.join_next().await.is_some() {}
    info!("chat session event loop stopped");
    Ok(())
}

async fn dispatch<P: ChatPlatform>(session: Rc<ChatSession<P>>, command: SessionCommand) {
    match command {
        SessionCommand::Post { text } => {
            if let Err(err) = session.post_message(&text).await {
                warn!(error = %err, "failed to post message");
            }
        }
        SessionCommand::History { reply } => {
            let result = session.fetch_history().await;
            if let Err(err) = &result {
                warn!(error = %err, "failed to fetch history");
            }
            if reply.send(result).is_err() {
                debug!("history requester gave up before the reply");
            }
        }
    }
}
