//! CLI definitions for the `chatrelay` binary.
//!
//! Uses clap derive macros. With no subcommand the relay is served, so the
//! binary can be dropped into a process manager as-is.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use chatrelay_infra::config::ConfigOverrides;

/// Relay local TCP requests into a chat channel and back.
#[derive(Parser)]
#[command(name = "chatrelay", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a chatrelay.toml file (default: ./chatrelay.toml if present).
    #[arg(short, long, env = "CHATRELAY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Interface to listen on (overrides the config file).
    #[arg(long, env = "CHATRELAY_HOST", global = true)]
    pub host: Option<String>,

    /// Port to listen on (overrides the config file).
    #[arg(long, env = "CHATRELAY_PORT", global = true)]
    pub port: Option<u16>,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the relay (the default).
    Serve,

    /// Verify the token and target channel, then exit.
    Check,

    /// Send one message through a running relay.
    Send {
        /// Pre-formatted message text, posted verbatim.
        text: String,

        /// Relay address.
        #[arg(long, default_value = "127.0.0.1:10000")]
        addr: String,
    },

    /// Print recent channel history from a running relay.
    History {
        /// Relay address.
        #[arg(long, default_value = "127.0.0.1:10000")]
        addr: String,
    },
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }
}
