//! Core configuration types and loading.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::defaults::{
    default_category, default_interval_secs, default_state_path, default_text_channel,
    default_timeout_ms, default_user_agent,
};
use super::presentation::PresentationConfig;
use super::server::ServerConfig;
use crate::gateway::GuildId;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("environment variable {var} is invalid: {reason}")]
    Env { var: &'static str, reason: String },
}

/// Daemon configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Discord credentials and guild layout.
    #[serde(default)]
    pub discord: DiscordConfig,
    /// Poll interval.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Query adapter settings.
    #[serde(default)]
    pub query: QueryConfig,
    /// Identity side-file location.
    #[serde(default)]
    pub state: StateConfig,
    /// Card colours and wording.
    #[serde(default)]
    pub presentation: PresentationConfig,
    /// Prometheus endpoint.
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// The roster, in display order.
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

impl Config {
    /// Load configuration from a TOML file and apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override credentials from the environment.
    ///
    /// `DISCORD_TOKEN` (or the shorter `TOKEN`) replaces `discord.token`;
    /// `GUILD_ID` replaces `discord.guild_id`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("DISCORD_TOKEN").or_else(|| lookup("TOKEN")) {
            self.discord.token = Some(token);
        }
        if let Some(raw) = lookup("GUILD_ID") {
            let guild = raw.parse::<GuildId>().map_err(|e| ConfigError::Env {
                var: "GUILD_ID",
                reason: e.to_string(),
            })?;
            self.discord.guild_id = Some(guild);
        }
        Ok(())
    }
}

/// Discord connection and guild layout.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    /// Bot token. Usually supplied through `DISCORD_TOKEN` instead.
    pub token: Option<String>,
    /// Guild to mirror into.
    pub guild_id: Option<GuildId>,
    /// Category holding the per-server voice channels and the text channel.
    #[serde(default = "default_category")]
    pub category: String,
    /// Name of the text channel created when none is recorded.
    #[serde(default = "default_text_channel")]
    pub text_channel: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: None,
            guild_id: None,
            category: default_category(),
            text_channel: default_text_channel(),
        }
    }
}

/// Poll schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between passes (default: 60).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Query adapter settings.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Per-server query budget in milliseconds (default: 5000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// User-Agent sent by HTTP adapters.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl QueryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Identity side-file location.
#[derive(Debug, Clone, Deserialize)]
pub struct StateConfig {
    /// Path of the JSON file mapping servers to message ids.
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

/// Prometheus endpoint. Absent or zero port disables it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    pub port: Option<u16>,
}

impl MetricsConfig {
    /// Port to serve on, if enabled.
    pub fn enabled_port(&self) -> Option<u16> {
        self.port.filter(|&p| p != 0)
    }
}
