//! Query adapter whose answers are set by the test.

use async_trait::async_trait;
use parking_lot::Mutex;
use serverboard::adapters::QueryAdapter;
use serverboard::config::ServerConfig;
use serverboard_query::{OnlineProbe, Probe, QueryError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// What the adapter should do for one server.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Script {
    Answer(Probe),
    Timeout,
    Invalid,
    Panic,
}

#[allow(dead_code)]
impl Script {
    pub fn online(players: u32, max: u32) -> Self {
        Self::Answer(Probe::Online(OnlineProbe {
            players,
            max_players: Some(max),
            ..OnlineProbe::default()
        }))
    }

    /// Online with a count but no slot total, so config decides.
    pub fn count(players: u32) -> Self {
        Self::Answer(Probe::online(players))
    }
}

/// Clones share their scripts, so a test keeps a handle after handing the
/// adapter to the registry.
#[derive(Clone)]
pub struct ScriptedAdapter {
    kind: &'static str,
    scripts: Arc<Mutex<HashMap<String, Script>>>,
}

#[allow(dead_code)]
impl ScriptedAdapter {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            scripts: Arc::default(),
        }
    }

    pub fn set(&self, server: &str, script: Script) {
        self.scripts.lock().insert(server.to_string(), script);
    }
}

#[async_trait]
impl QueryAdapter for ScriptedAdapter {
    fn kind(&self) -> &str {
        self.kind
    }

    fn check(&self, _server: &ServerConfig) -> Result<(), String> {
        Ok(())
    }

    async fn query(&self, server: &ServerConfig) -> Result<Probe, QueryError> {
        let script = self.scripts.lock().get(&server.name).cloned();
        match script {
            Some(Script::Answer(probe)) => Ok(probe),
            Some(Script::Timeout) | None => Err(QueryError::Timeout(Duration::from_secs(5))),
            Some(Script::Invalid) => Err(QueryError::invalid("scripted garbage")),
            Some(Script::Panic) => panic!("scripted adapter panic for {}", server.name),
        }
    }
}
