//! Discord chat platform implementation.
//!
//! This module provides the [`DiscordPlatform`] which implements the
//! [`ChatPlatform`](chatrelay_core::platform::ChatPlatform) trait over the
//! Discord REST API.

pub mod client;
pub mod types;

pub use client::DiscordPlatform;
