//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Top-level config struct and the small per-section structs
//! - [`server`]: Roster entries (ServerConfig, ConnectionInfo, Layout)
//! - [`presentation`]: Embed colours and wording (PresentationConfig, HexColor)
//! - [`defaults`]: serde default functions
//! - [`validation`]: startup checks that report every problem at once

mod defaults;
mod presentation;
mod server;
mod types;
pub mod validation;

pub use presentation::{HexColor, PresentationConfig};
pub use server::{ConnectionInfo, Layout, ServerConfig};
pub use types::{
    Config, ConfigError, DiscordConfig, MetricsConfig, QueryConfig, ScheduleConfig, StateConfig,
};
pub use validation::{ValidationError, validate};
