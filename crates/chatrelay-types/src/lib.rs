//! Shared domain types for chatrelay.
//!
//! Channel and message types, relay configuration, and the error enums used
//! across the workspace.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod chat;
pub mod config;
pub mod error;
