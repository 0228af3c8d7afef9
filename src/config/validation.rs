//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.
//! Checks that depend on the adapter registry (known kinds, required
//! connection fields) live in [`crate::adapters::AdapterRegistry::check_roster`].

use super::Config;
use crate::status::label_name;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Shortest poll interval accepted, in seconds.
pub const MIN_INTERVAL_SECS: u64 = 5;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("discord.token is required (or set DISCORD_TOKEN)")]
    MissingToken,
    #[error("discord.guild_id is required (or set GUILD_ID)")]
    MissingGuild,
    #[error("discord.category must not be empty")]
    EmptyCategory,
    #[error("at least one [[servers]] entry is required")]
    EmptyRoster,
    #[error("servers[{0}].name is required")]
    MissingServerName(usize),
    #[error("duplicate server name '{0}'")]
    DuplicateServerName(String),
    #[error("server '{0}' has no connect URL")]
    MissingConnect(String),
    #[error("unknown server kind '{kind}' for '{server}'")]
    UnknownKind { server: String, kind: String },
    #[error("server '{server}': {reason}")]
    InvalidConnection { server: String, reason: String },
    #[error("servers '{first}' and '{second}' share the same voice channel label")]
    LabelCollision { first: String, second: String },
    #[error("schedule.interval_secs must be at least {MIN_INTERVAL_SECS}, got {0}")]
    IntervalTooShort(u64),
    #[error("query.timeout_ms must be greater than zero")]
    ZeroTimeout,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Credentials
    if config.discord.token.as_deref().is_none_or(|t| t.trim().is_empty()) {
        errors.push(ValidationError::MissingToken);
    }
    if config.discord.guild_id.is_none() {
        errors.push(ValidationError::MissingGuild);
    }
    if config.discord.category.trim().is_empty() {
        errors.push(ValidationError::EmptyCategory);
    }

    // Roster
    if config.servers.is_empty() {
        errors.push(ValidationError::EmptyRoster);
    }
    let mut seen = HashSet::new();
    let mut labels: HashMap<&str, &str> = HashMap::new();
    for (index, server) in config.servers.iter().enumerate() {
        if server.name.trim().is_empty() {
            errors.push(ValidationError::MissingServerName(index));
            continue;
        }
        if !seen.insert(server.name.as_str()) {
            errors.push(ValidationError::DuplicateServerName(server.name.clone()));
        } else if let Some(first) = labels.insert(label_name(&server.name), &server.name) {
            // Voice channels are found again by the name inside their label.
            errors.push(ValidationError::LabelCollision {
                first: first.to_string(),
                second: server.name.clone(),
            });
        }
        if server.connect.trim().is_empty() {
            errors.push(ValidationError::MissingConnect(server.name.clone()));
        }
    }

    // Schedule
    if config.schedule.interval_secs < MIN_INTERVAL_SECS {
        errors.push(ValidationError::IntervalTooShort(config.schedule.interval_secs));
    }
    if config.query.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
