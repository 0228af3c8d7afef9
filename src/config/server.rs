//! Roster entries: one per monitored game server.

use serde::Deserialize;

/// How much detail a server's status card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Map, thumbnail and the list of connected players.
    Rich,
    /// A single player-count line.
    Simple,
}

/// Where to send the status query. Which fields are required depends on
/// the server's `kind`; the adapter checks this at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectionInfo {
    /// Host name or IP address (A2S).
    #[serde(default, alias = "ip")]
    pub host: Option<String>,
    /// Query port (A2S).
    #[serde(default)]
    pub port: Option<u16>,
    /// Status document URL (HTTP JSON).
    #[serde(default)]
    pub url: Option<String>,
}

/// A monitored server. Loaded once, immutable for the process lifetime.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Unique, human-facing name. Also the identity-store key.
    pub name: String,
    /// Query adapter key (e.g. "a2s", "http-json").
    #[serde(alias = "type")]
    pub kind: String,
    /// Connection details for the adapter.
    #[serde(flatten)]
    pub connection: ConnectionInfo,
    /// Slot count shown when the backend does not report one.
    #[serde(default, alias = "maxplayers")]
    pub max_players: Option<u32>,
    /// Target of the card's connect button.
    #[serde(alias = "connect_url")]
    pub connect: String,
    /// Card detail level. Filled from the adapter's default at startup
    /// when omitted.
    #[serde(default)]
    pub layout: Option<Layout>,
    /// Card thumbnail URL; `{map}` is replaced by the current map.
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl ServerConfig {
    /// Effective layout.
    pub fn layout(&self) -> Layout {
        self.layout.unwrap_or(Layout::Simple)
    }

    /// Minimal entry, mostly for tests and examples.
    pub fn new(name: impl Into<String>, kind: impl Into<String>, connect: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            connection: ConnectionInfo::default(),
            max_players: None,
            connect: connect.into(),
            layout: None,
            thumbnail: None,
        }
    }

    /// Builder-style slot count.
    pub fn with_max_players(mut self, max: u32) -> Self {
        self.max_players = Some(max);
        self
    }

    /// Builder-style layout.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }
}
