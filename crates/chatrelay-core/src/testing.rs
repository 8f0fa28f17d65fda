//! In-memory `ChatPlatform` used by the session and listener tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chatrelay_types::chat::{BotIdentity, ChannelId, ChannelRef, ChatMessage};
use chatrelay_types::error::ChatError;

use crate::platform::{ChatPlatform, DEFAULT_PAGE_SIZE};

pub(crate) type Shared<T> = Arc<Mutex<T>>;

#[derive(Clone)]
pub(crate) struct FakePlatform {
    channel_name: Option<String>,
    page_size: u32,
    history: Shared<Vec<ChatMessage>>,
    sent: Shared<Vec<String>>,
    page_requests: Shared<Vec<(u32, Option<u64>)>>,
    login_fails: Arc<AtomicBool>,
    lookup_fails: Arc<AtomicBool>,
    history_fails: Arc<AtomicBool>,
    history_hangs: Arc<AtomicBool>,
}

impl FakePlatform {
    fn build(channel_name: Option<String>) -> Self {
        Self {
            channel_name,
            page_size: DEFAULT_PAGE_SIZE,
            history: Arc::default(),
            sent: Arc::default(),
            page_requests: Arc::default(),
            login_fails: Arc::default(),
            lookup_fails: Arc::default(),
            history_fails: Arc::default(),
            history_hangs: Arc::default(),
        }
    }

    pub(crate) fn with_channel(name: &str) -> Self {
        Self::build(Some(name.to_string()))
    }

    pub(crate) fn without_channel() -> Self {
        Self::build(None)
    }

    pub(crate) fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Replace channel history; `texts` are given oldest first.
    pub(crate) fn set_history(&self, texts: &[&str]) {
        let messages = texts
            .iter()
            .enumerate()
            .map(|(i, text)| ChatMessage {
                id: i as u64 + 1,
                content: (*text).to_string(),
            })
            .collect();
        *self.history.lock().unwrap() = messages;
    }

    pub(crate) fn sent(&self) -> Shared<Vec<String>> {
        Arc::clone(&self.sent)
    }

    pub(crate) fn page_requests(&self) -> Shared<Vec<(u32, Option<u64>)>> {
        Arc::clone(&self.page_requests)
    }

    pub(crate) fn fail_login(&self) {
        self.login_fails.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_channel_lookup(&self) {
        self.lookup_fails.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_history(&self) {
        self.history_fails.store(true, Ordering::SeqCst);
    }

    pub(crate) fn hang_history(&self) {
        self.history_hangs.store(true, Ordering::SeqCst);
    }
}

impl ChatPlatform for FakePlatform {
    fn name(&self) -> &str {
        "fake"
    }

    async fn connect(&self) -> Result<BotIdentity, ChatError> {
        if self.login_fails.load(Ordering::SeqCst) {
            return Err(ChatError::AuthenticationFailed);
        }
        Ok(BotIdentity {
            id: 1,
            username: "relay-bot".to_string(),
        })
    }

    async fn resolve_channel(&self, id: ChannelId) -> Result<Option<ChannelRef>, ChatError> {
        if self.lookup_fails.load(Ordering::SeqCst) {
            return Err(ChatError::Http("connection refused".to_string()));
        }
        Ok(self.channel_name.as_ref().map(|name| ChannelRef {
            id,
            name: name.clone(),
        }))
    }

    async fn send_message(&self, _channel: &ChannelRef, content: &str) -> Result<(), ChatError> {
        self.sent.lock().unwrap().push(content.to_string());
        Ok(())
    }

    async fn recent_messages(
        &self,
        _channel: &ChannelRef,
        limit: u32,
        before: Option<u64>,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        self.page_requests.lock().unwrap().push((limit, before));
        if self.history_hangs.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.history_fails.load(Ordering::SeqCst) {
            return Err(ChatError::Provider {
                message: "HTTP 500".to_string(),
            });
        }

        let history = self.history.lock().unwrap();
        Ok(history
            .iter()
            .rev()
            .filter(|m| before.is_none_or(|b| m.id < b))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }
}
