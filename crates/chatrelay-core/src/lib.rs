//! Core relay logic for chatrelay.
//!
//! Defines the `ChatPlatform` port that the infrastructure layer implements,
//! the chat session and its single-threaded event loop, and the blocking
//! request bridge with the TCP listener that feeds it. Depends only on
//! `chatrelay-types` -- never on `chatrelay-infra` or any HTTP crate.

pub mod platform;
pub mod relay;
pub mod session;

#[cfg(test)]
mod testing;
