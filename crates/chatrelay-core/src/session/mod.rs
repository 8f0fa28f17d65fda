//! The chat session and the handoff into its event loop.
//!
//! - `chat_session` -- `ChatSession`, the `!Sync` session state and its two operations
//! - `event_loop` -- `SessionLoop`, the dedicated single-threaded runtime driving it
//! - `handle` -- `SessionHandle` and the `RelaySession` trait used by bridge units

pub mod chat_session;
pub mod event_loop;
pub mod handle;

pub use chat_session::ChatSession;
pub use event_loop::{SessionLoop, SessionSettings};
pub use handle::{RelaySession, SessionCommand, SessionHandle};
