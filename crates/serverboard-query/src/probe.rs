//! The raw outcome of a successful status query.

/// What a backend reported, before any presentation policy is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// The server answered and reported a player count.
    Online(OnlineProbe),
    /// The backend answered and explicitly reported the server as down.
    Offline,
}

/// Details reported by a server that is up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnlineProbe {
    /// Connected players.
    pub players: u32,
    /// Player slots, when the backend reports them.
    pub max_players: Option<u32>,
    /// Current map, when the backend reports it.
    pub map: Option<String>,
    /// Connected player names in server order. Names may be empty for
    /// clients still connecting.
    pub player_names: Option<Vec<String>>,
}

impl Probe {
    /// Online probe carrying just a player count.
    pub fn online(players: u32) -> Self {
        Self::Online(OnlineProbe {
            players,
            ..OnlineProbe::default()
        })
    }

    /// Whether the backend reported the server as up.
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online(_))
    }
}

impl OnlineProbe {
    /// Set the reported slot count.
    pub fn with_max_players(mut self, max: u32) -> Self {
        self.max_players = Some(max);
        self
    }

    /// Set the reported map.
    pub fn with_map(mut self, map: impl Into<String>) -> Self {
        self.map = Some(map.into());
        self
    }

    /// Set the reported player names.
    pub fn with_player_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.player_names = Some(names.into_iter().map(Into::into).collect());
        self
    }
}
