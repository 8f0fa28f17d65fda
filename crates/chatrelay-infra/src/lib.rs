//! Infrastructure layer for chatrelay.
//!
//! Contains the implementation of the `ChatPlatform` port defined in
//! `chatrelay-core` (Discord over its REST API) and the startup
//! configuration loader (TOML file plus environment).

pub mod config;
pub mod discord;
