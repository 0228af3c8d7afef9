//! serverboard - game server status mirrored into Discord
//!
//! Polls a fixed roster of game servers and keeps one voice channel name
//! and one status message per server up to date in a Discord guild.
//!
//! The pipeline for each pass is query ([`adapters`]) → normalize
//! ([`status`]) → upsert ([`reconcile`]) through the [`gateway`], with
//! message ids kept in the [`identity`] store across restarts.

pub mod adapters;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod identity;
pub mod metrics;
pub mod provision;
pub mod reconcile;
pub mod scheduler;
pub mod status;
