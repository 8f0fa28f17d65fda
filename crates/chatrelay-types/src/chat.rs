//! Chat channel, message, and session state types for chatrelay.
//!
//! These types describe the remote side of the relay: which channel messages
//! are posted to, what a fetched message looks like, and which lifecycle
//! state the chat session is in.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Identifier of a remote chat channel (a Discord snowflake).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChannelId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(ChannelId)
            .map_err(|_| format!("invalid channel id: '{s}'"))
    }
}

/// A channel that has been looked up on the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: ChannelId,
    /// Display name without the leading `#`. Empty for unnamed channels (DMs).
    pub name: String,
}

/// The account the session is logged in as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotIdentity {
    pub id: u64,
    pub username: String,
}

impl fmt::Display for BotIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.username, self.id)
    }
}

/// A single message read back from a channel.
///
/// `id` is a snowflake: it grows monotonically with creation time, so it
/// is the chronological ordering key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub content: String,
}

/// Lifecycle state of the chat session.
///
/// `Initializing -> Ready` when the configured channel resolves,
/// `Initializing -> Degraded` when it does not. Both outcomes are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Initializing,
    Ready(ChannelRef),
    Degraded,
}

impl SessionState {
    /// The resolved channel, if the session is ready.
    pub fn channel(&self) -> Option<&ChannelRef> {
        match self {
            SessionState::Ready(channel) => Some(channel),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Initializing => write!(f, "initializing"),
            SessionState::Ready(_) => write!(f, "ready"),
            SessionState::Degraded => write!(f, "degraded"),
        }
    }
}

/// Join messages into the transport text: oldest first, one per line.
///
/// Input order does not matter; messages are sorted by snowflake id.
pub fn join_chronological(mut messages: Vec<ChatMessage>) -> String {
    messages.sort_by_key(|m| m.id);
    messages
        .into_iter()
        .map(|m| m.content)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: u64, content: &str) -> ChatMessage {
        ChatMessage {
            id,
            content: content.to_string(),
        }
    }

    #[test]
    fn channel_id_parses_decimal_snowflake() {
        let id: ChannelId = "1187654321098765432".parse().unwrap();
        assert_eq!(id, ChannelId(1_187_654_321_098_765_432));
        assert_eq!(id.to_string(), "1187654321098765432");
    }

    #[test]
    fn channel_id_tolerates_surrounding_whitespace() {
        let id: ChannelId = " 42\n".parse().unwrap();
        assert_eq!(id, ChannelId(42));
    }

    #[test]
    fn channel_id_rejects_garbage() {
        assert!("general".parse::<ChannelId>().is_err());
        assert!("".parse::<ChannelId>().is_err());
        assert!("-5".parse::<ChannelId>().is_err());
    }

    #[test]
    fn join_newest_first_input_is_reversed() {
        let messages = vec![msg(3, "c"), msg(2, "b"), msg(1, "a")];
        assert_eq!(join_chronological(messages), "a\nb\nc");
    }

    #[test]
    fn join_keeps_multiline_content_intact() {
        let messages = vec![msg(20, "second"), msg(10, "first\nstill first")];
        assert_eq!(join_chronological(messages), "first\nstill first\nsecond");
    }

    #[test]
    fn join_empty_is_empty_string() {
        assert_eq!(join_chronological(Vec::new()), "");
    }

    #[test]
    fn session_state_channel_only_when_ready() {
        let channel = ChannelRef {
            id: ChannelId(7),
            name: "relay-log".to_string(),
        };
        assert!(SessionState::Initializing.channel().is_none());
        assert!(SessionState::Degraded.channel().is_none());
        assert_eq!(
            SessionState::Ready(channel.clone()).channel(),
            Some(&channel)
        );
    }

    #[test]
    fn session_state_display() {
        assert_eq!(SessionState::default().to_string(), "initializing");
        assert_eq!(SessionState::Degraded.to_string(), "degraded");
    }
}
