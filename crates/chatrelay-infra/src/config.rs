//! Startup configuration loader for chatrelay.
//!
//! Reads the optional `chatrelay.toml` into [`RelayConfig`], layers CLI/env
//! overrides on top, and pulls the bot token and target channel from the
//! environment. Missing credentials are fatal.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use chatrelay_types::chat::ChannelId;
use chatrelay_types::config::RelayConfig;
use chatrelay_types::error::ConfigError;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "chatrelay.toml";

/// Environment variable holding the bot token.
pub const TOKEN_VAR: &str = "BOT_TOKEN";

/// Environment variable holding the target channel ID.
pub const CHANNEL_VAR: &str = "LOG_CHANNEL_ID";

/// Everything the supervisor needs to start.
pub struct StartupConfig {
    pub relay: RelayConfig,
    pub token: SecretString,
    pub channel_id: ChannelId,
}

impl std::fmt::Debug for StartupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartupConfig")
            .field("relay", &self.relay)
            .field("token", &"[redacted]")
            .field("channel_id", &self.channel_id)
            .finish()
    }
}

/// Values from the command line (or their env fallbacks) that win over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Load [`RelayConfig`].
///
/// - With an explicit `path`, the file must exist and parse.
/// - Without one, `./chatrelay.toml` is used if present. A missing file
///   yields defaults; a malformed one logs a warning and yields defaults.
pub async fn load_relay_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(load_default_file(Path::new(DEFAULT_CONFIG_FILE)).await);
    };

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| ConfigError::File {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;

    toml::from_str(&content).map_err(|err| ConfigError::File {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}

async fn load_default_file(path: &Path) -> RelayConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No {} found, using defaults", path.display());
            return RelayConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return RelayConfig::default();
        }
    };

    match toml::from_str::<RelayConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            RelayConfig::default()
        }
    }
}

/// Build the full startup configuration.
///
/// `env` looks up environment variables; pass `|k| std::env::var(k).ok()`
/// in production.
pub async fn resolve_startup_config<F>(
    overrides: &ConfigOverrides,
    env: F,
) -> Result<StartupConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let token = required(&env, TOKEN_VAR)?;
    let channel_id = required(&env, CHANNEL_VAR)?
        .parse::<ChannelId>()
        .map_err(|reason| ConfigError::Invalid {
            name: CHANNEL_VAR,
            reason,
        })?;

    let mut relay = load_relay_config(overrides.config_path.as_deref()).await?;
    apply_overrides(&mut relay, overrides);

    Ok(StartupConfig {
        relay,
        token: SecretString::from(token),
        channel_id,
    })
}

/// CLI/env values replace file values field by field.
pub fn apply_overrides(relay: &mut RelayConfig, overrides: &ConfigOverrides) {
    if let Some(host) = &overrides.host {
        relay.listen_host = host.clone();
    }
    if let Some(port) = overrides.port {
        relay.listen_port = port;
    }
}

fn required<F>(env: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    env(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(name))
}
