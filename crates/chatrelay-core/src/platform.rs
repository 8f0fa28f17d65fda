//! ChatPlatform trait definition.
//!
//! This is the capability surface of the remote chat service: login,
//! channel lookup, send, and paged history. Implementations live in
//! chatrelay-infra (e.g., `DiscordPlatform`).
//!
//! Futures returned here are driven only by the session's single-threaded
//! event loop, so they carry no `Send` bound.

use std::future::Future;

use chatrelay_types::chat::{BotIdentity, ChannelId, ChannelRef, ChatMessage};
use chatrelay_types::error::ChatError;

/// Default number of messages a platform returns per history page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Trait for remote chat service backends.
pub trait ChatPlatform {
    /// Short platform name used in logs (e.g., "discord").
    fn name(&self) -> &str;

    /// Log in and return the identity the session runs as.
    ///
    /// Failure here is fatal for the session.
    fn connect(&self) -> impl Future<Output = Result<BotIdentity, ChatError>>;

    /// Look up a channel by ID. `Ok(None)` means the channel does not exist
    /// or is not visible to this account.
    fn resolve_channel(
        &self,
        id: ChannelId,
    ) -> impl Future<Output = Result<Option<ChannelRef>, ChatError>>;

    /// Append `content` to the channel as a new message, unmodified.
    fn send_message(
        &self,
        channel: &ChannelRef,
        content: &str,
    ) -> impl Future<Output = Result<(), ChatError>>;

    /// Fetch one page of at most `limit` messages, newest first.
    ///
    /// With `before` set, only messages older than that message ID are
    /// returned.
    fn recent_messages(
        &self,
        channel: &ChannelRef,
        limit: u32,
        before: Option<u64>,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, ChatError>>;

    /// Largest `limit` a single `recent_messages` call honours.
    fn page_size(&self) -> u32 {
        DEFAULT_PAGE_SIZE
    }
}
