//! Discord REST API types.
//!
//! Wire structures for the handful of Discord endpoints the relay uses.
//! They are NOT the platform-agnostic types from chatrelay-types; the
//! client converts between the two.

use serde::{Deserialize, Serialize};

/// `GET /users/@me` response (fields we read).
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
}

/// `GET /channels/{id}` response (fields we read).
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordChannel {
    pub id: String,
    /// Absent for DM channels.
    #[serde(default)]
    pub name: Option<String>,
}

/// A message object from `GET /channels/{id}/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordMessage {
    pub id: String,
    #[serde(default)]
    pub content: String,
}

/// Request body for `POST /channels/{id}/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessage<'a> {
    pub content: &'a str,
}

/// Body of a 429 response.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitBody {
    /// Seconds until the request may be retried.
    pub retry_after: f64,
}
