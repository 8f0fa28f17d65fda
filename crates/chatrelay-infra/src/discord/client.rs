//! DiscordPlatform -- concrete [`ChatPlatform`] implementation for Discord.
//!
//! Talks to the Discord REST API with a bot token. Login is a
//! `GET /users/@me` round trip; channel lookup, posting, and history map to
//! the channel and message endpoints.
//!
//! The token is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;

use chatrelay_core::platform::ChatPlatform;
use chatrelay_types::chat::{BotIdentity, ChannelId, ChannelRef, ChatMessage};
use chatrelay_types::error::ChatError;

use super::types::{CreateMessage, DiscordChannel, DiscordMessage, DiscordUser, RateLimitBody};

/// Discord caps `GET /channels/{id}/messages` at 100 per request.
const MAX_PAGE_SIZE: u32 = 100;

/// Discord bot client for a single token.
pub struct DiscordPlatform {
    client: reqwest::Client,
    token: SecretString,
    api_base: String,
}

impl DiscordPlatform {
    /// Create a client against `api_base` (e.g., `https://discord.com/api/v10`).
    pub fn new(token: SecretString, api_base: impl Into<String>) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("chatrelay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChatError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.token.expose_secret())
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response, ChatError> {
        self.client
            .get(self.url(path))
            .header("Authorization", self.authorization())
            .query(query)
            .send()
            .await
            .map_err(|e| ChatError::Http(e.to_string()))
    }
}

// DiscordPlatform does not derive Debug so the token can never end up in logs.

impl ChatPlatform for DiscordPlatform {
    fn name(&self) -> &str {
        "discord"
    }

    async fn connect(&self) -> Result<BotIdentity, ChatError> {
        let response = self.get("/users/@me", &[]).await?;
        let user: DiscordUser = decode(check_status(response).await?).await?;

        Ok(BotIdentity {
            id: parse_snowflake(&user.id)?,
            username: user.username,
        })
    }

    async fn resolve_channel(&self, id: ChannelId) -> Result<Option<ChannelRef>, ChatError> {
        let response = self.get(&format!("/channels/{id}"), &[]).await?;
        if matches!(
            response.status(),
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN
        ) {
            debug!(channel_id = %id, status = %response.status(), "channel not visible");
            return Ok(None);
        }

        let channel: DiscordChannel = decode(check_status(response).await?).await?;
        Ok(Some(ChannelRef {
            id: ChannelId(parse_snowflake(&channel.id)?),
            name: channel.name.unwrap_or_default(),
        }))
    }

    async fn send_message(&self, channel: &ChannelRef, content: &str) -> Result<(), ChatError> {
        let response = self
            .client
            .post(self.url(&format!("/channels/{}/messages", channel.id)))
            .header("Authorization", self.authorization())
            .json(&CreateMessage { content })
            .send()
            .await
            .map_err(|e| ChatError::Http(e.to_string()))?;

        check_status(response).await?;
        Ok(())
    }

    async fn recent_messages(
        &self,
        channel: &ChannelRef,
        limit: u32,
        before: Option<u64>,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let mut query = vec![("limit", limit.clamp(1, MAX_PAGE_SIZE).to_string())];
        if let Some(before) = before {
            query.push(("before", before.to_string()));
        }

        let response = self
            .get(&format!("/channels/{}/messages", channel.id), &query)
            .await?;
        let messages: Vec<DiscordMessage> = decode(check_status(response).await?).await?;

        messages
            .into_iter()
            .map(|m| {
                Ok(ChatMessage {
                    id: parse_snowflake(&m.id)?,
                    content: m.content,
                })
            })
            .collect()
    }

    fn page_size(&self) -> u32 {
        MAX_PAGE_SIZE
    }
}

/// Map non-success statuses to [`ChatError`], passing successes through.
async fn check_status(response: Response) -> Result<Response, ChatError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::UNAUTHORIZED => ChatError::AuthenticationFailed,
        StatusCode::TOO_MANY_REQUESTS => ChatError::RateLimited {
            retry_after_ms: serde_json::from_str::<RateLimitBody>(&body)
                .ok()
                .map(|r| (r.retry_after * 1000.0).ceil() as u64),
        },
        _ => ChatError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ChatError> {
    response
        .json()
        .await
        .map_err(|e| ChatError::Deserialization(e.to_string()))
}

fn parse_snowflake(raw: &str) -> Result<u64, ChatError> {
    raw.parse()
        .map_err(|_| ChatError::Deserialization(format!("invalid snowflake: '{raw}'")))
}
