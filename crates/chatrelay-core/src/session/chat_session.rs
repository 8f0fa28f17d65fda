//! The chat session owned by the event loop.
//!
//! `ChatSession` is deliberately `!Sync`: its state lives in a `RefCell` and
//! is only ever touched from the session's own single-threaded loop. Other
//! threads reach it through `SessionHandle`.

use std::cell::RefCell;

use chatrelay_types::chat::{join_chronological, BotIdentity, ChannelId, ChannelRef, SessionState};
use chatrelay_types::config::HISTORY_FALLBACK_TEXT;
use chatrelay_types::error::ChatError;
use tracing::{debug, error, info, warn};

use crate::platform::ChatPlatform;

/// A logged-in session bound to one target channel.
pub struct ChatSession<P> {
    platform: P,
    channel_id: ChannelId,
    history_limit: u32,
    state: RefCell<SessionState>,
}

impl<P: ChatPlatform> ChatSession<P> {
    /// Create a session in the `Initializing` state. Nothing is sent until
    /// [`start`](Self::start) runs.
    pub fn new(platform: P, channel_id: ChannelId, history_limit: u32) -> Self {
        Self {
            platform,
            channel_id,
            history_limit,
            state: RefCell::new(SessionState::Initializing),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Log in, then resolve the target channel.
    ///
    /// A login failure is returned to the caller. A channel that cannot be
    /// resolved (missing, hidden, or the lookup itself failed) moves the
    /// session to `Degraded` instead of failing.
    pub async fn start(&self) -> Result<BotIdentity, ChatError> {
        let identity = self.platform.connect().await?;
        info!(
            platform = self.platform.name(),
            user = %identity,
            "logged in to chat service"
        );

        let next = match self.platform.resolve_channel(self.channel_id).await {
            Ok(Some(channel)) => {
                info!(channel_id = %channel.id, "posting messages to #{}", channel.name);
                SessionState::Ready(channel)
            }
            Ok(None) => {
                error!(channel_id = %self.channel_id, "could not find chat channel");
                SessionState::Degraded
            }
            Err(err) => {
                error!(channel_id = %self.channel_id, error = %err, "channel lookup failed");
                SessionState::Degraded
            }
        };
        *self.state.borrow_mut() = next;

        Ok(identity)
    }

    /// Post `text` verbatim to the target channel.
    ///
    /// Without a resolved channel the post is dropped and `Ok(())` returned.
    pub async fn post_message(&self, text: &str) -> Result<(), ChatError> {
        let Some(channel) = self.current_channel() else {
            warn!(state = %self.state(), "no target channel, dropping post");
            return Ok(());
        };

        self.platform.send_message(&channel, text).await?;
        debug!(channel_id = %channel.id, bytes = text.len(), "message posted");
        Ok(())
    }

    /// The last `history_limit` messages, oldest first, joined by `\n`.
    ///
    /// Without a resolved channel this is the fixed fallback text.
    pub async fn fetch_history(&self) -> Result<String, ChatError> {
        let Some(channel) = self.current_channel() else {
            return Ok(HISTORY_FALLBACK_TEXT.to_string());
        };

        let limit = self.history_limit as usize;
        let page_size = self.platform.page_size().max(1);
        let mut collected = Vec::with_capacity(limit);
        let mut before = None;

        while collected.len() < limit {
            let want = page_size.min((limit - collected.len()) as u32);
            let page = self
                .platform
                .recent_messages(&channel, want, before)
                .await?;
            let received = page.len();
            before = page.iter().map(|m| m.id).min();
            collected.extend(page);

            // A short page means the channel has no older messages.
            if received < want as usize || before.is_none() {
                break;
            }
        }

        debug!(channel_id = %channel.id, messages = collected.len(), "history fetched");
        Ok(join_chronological(collected))
    }

    fn current_channel(&self) -> Option<ChannelRef> {
        self.state.borrow().channel().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePlatform;

    fn session(platform: FakePlatform) -> ChatSession<FakePlatform> {
        ChatSession::new(platform, ChannelId(7), 25)
    }

    #[tokio::test]
    async fn start_with_known_channel_is_ready() {
        let chat = session(FakePlatform::with_channel("relay-log"));
        let identity = chat.start().await.unwrap();
        assert_eq!(identity.username, "relay-bot");
        assert!(matches!(chat.state(), SessionState::Ready(ref c) if c.name == "relay-log"));
    }

    #[tokio::test]
    async fn start_with_unknown_channel_is_degraded() {
        let chat = session(FakePlatform::without_channel());
        chat.start().await.unwrap();
        assert_eq!(chat.state(), SessionState::Degraded);
    }

    #[tokio::test]
    async fn start_with_failing_lookup_is_degraded() {
        let platform = FakePlatform::with_channel("relay-log");
        platform.fail_channel_lookup();
        let chat = session(platform);
        chat.start().await.unwrap();
        assert_eq!(chat.state(), SessionState::Degraded);
    }

    #[tokio::test]
    async fn start_with_bad_credentials_fails() {
        let platform = FakePlatform::with_channel("relay-log");
        platform.fail_login();
        let chat = session(platform);
        let result = chat.start().await;
        assert!(matches!(result, Err(ChatError::AuthenticationFailed)));
        assert_eq!(chat.state(), SessionState::Initializing);
    }

    #[tokio::test]
    async fn post_sends_text_verbatim() {
        let platform = FakePlatform::with_channel("relay-log");
        let sent = platform.sent();
        let chat = session(platform);
        chat.start().await.unwrap();

        chat.post_message("  [12:00] alice: hi  \n").await.unwrap();

        assert_eq!(*sent.lock().unwrap(), vec!["  [12:00] alice: hi  \n".to_string()]);
    }

    #[tokio::test]
    async fn post_before_start_is_dropped() {
        let platform = FakePlatform::with_channel("relay-log");
        let sent = platform.sent();
        let chat = session(platform);

        chat.post_message("too early").await.unwrap();

        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn degraded_post_is_silent_noop() {
        let platform = FakePlatform::without_channel();
        let sent = platform.sent();
        let chat = session(platform);
        chat.start().await.unwrap();

        assert!(chat.post_message("hello").await.is_ok());
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn degraded_history_is_fallback_text() {
        let chat = session(FakePlatform::without_channel());
        chat.start().await.unwrap();
        assert_eq!(chat.fetch_history().await.unwrap(), HISTORY_FALLBACK_TEXT);
    }

    #[tokio::test]
    async fn history_is_oldest_first() {
        let platform = FakePlatform::with_channel("relay-log");
        platform.set_history(&["a", "b", "c"]);
        let chat = ChatSession::new(platform, ChannelId(7), 3);
        chat.start().await.unwrap();

        assert_eq!(chat.fetch_history().await.unwrap(), "a\nb\nc");
    }

    #[tokio::test]
    async fn history_respects_limit() {
        let platform = FakePlatform::with_channel("relay-log");
        platform.set_history(&["m1", "m2", "m3", "m4", "m5"]);
        let chat = ChatSession::new(platform, ChannelId(7), 2);
        chat.start().await.unwrap();

        assert_eq!(chat.fetch_history().await.unwrap(), "m4\nm5");
    }

    #[tokio::test]
    async fn history_pages_backwards_past_page_size() {
        let platform = FakePlatform::with_channel("relay-log").with_page_size(2);
        let texts: Vec<String> = (1..=7).map(|i| format!("m{i}")).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        platform.set_history(&refs);
        let pages = platform.page_requests();
        let chat = ChatSession::new(platform, ChannelId(7), 5);
        chat.start().await.unwrap();

        assert_eq!(chat.fetch_history().await.unwrap(), "m3\nm4\nm5\nm6\nm7");
        // 2 + 2 + 1 messages
        assert_eq!(pages.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn history_stops_when_channel_runs_out() {
        let platform = FakePlatform::with_channel("relay-log").with_page_size(2);
        platform.set_history(&["only", "two"]);
        let pages = platform.page_requests();
        let chat = ChatSession::new(platform, ChannelId(7), 25);
        chat.start().await.unwrap();

        assert_eq!(chat.fetch_history().await.unwrap(), "only\ntwo");
        // Second page comes back empty
        assert_eq!(pages.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn history_of_empty_channel_is_empty() {
        let chat = session(FakePlatform::with_channel("relay-log"));
        chat.start().await.unwrap();
        assert_eq!(chat.fetch_history().await.unwrap(), "");
    }
}
