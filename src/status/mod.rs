//! Canonical server status and its presentation.
//!
//! - [`normalize`] turns whatever an adapter produced into a [`ServerStatus`].
//! - [`label`] renders the voice-channel name.
//! - [`card`] renders the text-channel message.

pub mod card;
pub mod label;

pub use card::{CardButton, CardField, StatusCard, render_card};
pub use label::{label_name, parse_label_name, voice_label};

use serverboard_query::{Probe, QueryError};

use crate::config::{Layout, ServerConfig};

/// Indicator shown for a reachable server.
pub const ONLINE_INDICATOR: &str = "🟢";
/// Indicator shown for an unreachable server.
pub const OFFLINE_INDICATOR: &str = "🔴";

/// One server's state for the current pass. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStatus {
    pub online: bool,
    /// Connected players. Always 0 when offline.
    pub players: u32,
    /// Slot count; 0 when neither the backend nor the config knows it.
    pub max_players: u32,
    /// Current map, for layouts that show it.
    pub map: Option<String>,
    /// Connected player names, for layouts that show them.
    pub player_names: Option<Vec<String>>,
    /// Why the query failed, kept for diagnostics only.
    pub error: Option<String>,
}

impl ServerStatus {
    /// Status of a server that could not be reached or reported itself down.
    pub fn offline(server: &ServerConfig) -> Self {
        Self {
            online: false,
            players: 0,
            max_players: server.max_players.unwrap_or(0),
            map: None,
            player_names: None,
            error: None,
        }
    }

    pub fn indicator(&self) -> &'static str {
        if self.online {
            ONLINE_INDICATOR
        } else {
            OFFLINE_INDICATOR
        }
    }
}

/// Map an adapter outcome to a [`ServerStatus`].
///
/// Total over every input: failures become offline statuses carrying the
/// error text. Map and player names survive only for [`Layout::Rich`].
pub fn normalize(outcome: Result<Probe, QueryError>, server: &ServerConfig) -> ServerStatus {
    match outcome {
        Ok(Probe::Online(probe)) => {
            let max_players = probe
                .max_players
                .filter(|&max| max > 0)
                .or(server.max_players)
                .unwrap_or(0);
            let rich = server.layout() == Layout::Rich;
            ServerStatus {
                online: true,
                players: probe.players,
                max_players,
                map: probe.map.filter(|_| rich),
                player_names: probe.player_names.filter(|_| rich),
                error: None,
            }
        }
        Ok(Probe::Offline) => ServerStatus::offline(server),
        Err(e) => ServerStatus {
            error: Some(e.to_string()),
            ..ServerStatus::offline(server)
        },
    }
}
