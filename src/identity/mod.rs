//! Durable mapping from servers to the platform objects that show them.
//!
//! The [`IdentityStore`] is the only owner of the mapping. Callers read and
//! write through it and never touch the backing file. Every change is
//! applied in memory first and then written out in full; a failed write is
//! handed back to the caller to log, and the in-memory value stays, so a
//! broken disk degrades to "forgets on restart" instead of stopping the
//! daemon.

use thiserror::Error;
use tracing::{info, warn};

mod file;
mod map;
mod memory;

pub use file::JsonFileStore;
pub use map::{FORMAT_VERSION, IdentityMap};
pub use memory::MemoryStore;

use crate::gateway::{ChannelId, MessageId};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("unreadable identity file: {0}")]
    Corrupt(String),
}

impl PersistenceError {
    /// Get a static error code string for metrics labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Serialize(_) => "serialize",
            Self::Corrupt(_) => "corrupt",
        }
    }
}

/// Where an [`IdentityMap`] lives between runs.
pub trait Persist: Send + Sync {
    /// Read the stored map. `Ok(None)` means nothing was stored yet.
    fn load(&self) -> Result<Option<IdentityMap>, PersistenceError>;

    /// Replace the stored map.
    fn save(&self, map: &IdentityMap) -> Result<(), PersistenceError>;

    /// Keep a copy of unreadable stored data before it gets overwritten.
    fn quarantine(&self) {}
}

pub struct IdentityStore {
    map: IdentityMap,
    backend: Box<dyn Persist>,
}

impl IdentityStore {
    /// Load the stored mapping. Never fails: missing or unreadable data
    /// starts an empty mapping.
    pub fn open<P: Persist + 'static>(backend: P) -> Self {
        let map = match backend.load() {
            Ok(Some(map)) => {
                info!(
                    messages = map.messages.len(),
                    voice_channels = map.voice_channels.len(),
                    "Identity map loaded"
                );
                map
            }
            Ok(None) => {
                info!("No identity map stored yet, starting empty");
                IdentityMap::default()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load identity map, starting empty");
                if matches!(e, PersistenceError::Corrupt(_)) {
                    backend.quarantine();
                }
                IdentityMap::default()
            }
        };
        Self {
            map,
            backend: Box::new(backend),
        }
    }

    /// The whole mapping as currently held.
    pub fn snapshot(&self) -> &IdentityMap {
        &self.map
    }

    pub fn message(&self, server: &str) -> Option<MessageId> {
        self.map.messages.get(server).copied()
    }

    pub fn set_message(&mut self, server: &str, id: MessageId) -> Result<(), PersistenceError> {
        if self.message(server) == Some(id) {
            return Ok(());
        }
        self.map.messages.insert(server.to_string(), id);
        self.flush()
    }

    pub fn text_channel(&self) -> Option<ChannelId> {
        self.map.text_channel
    }

    pub fn set_text_channel(&mut self, id: ChannelId) -> Result<(), PersistenceError> {
        if self.map.text_channel == Some(id) {
            return Ok(());
        }
        self.map.text_channel = Some(id);
        self.flush()
    }

    pub fn voice_channel(&self, server: &str) -> Option<ChannelId> {
        self.map.voice_channels.get(server).copied()
    }

    pub fn set_voice_channel(&mut self, server: &str, id: ChannelId) -> Result<(), PersistenceError> {
        if self.voice_channel(server) == Some(id) {
            return Ok(());
        }
        self.map.voice_channels.insert(server.to_string(), id);
        self.flush()
    }

    /// Drop the voice channel recorded for `server`, after it was deleted.
    pub fn forget_voice_channel(&mut self, server: &str) -> Result<(), PersistenceError> {
        if self.map.voice_channels.remove(server).is_none() {
            return Ok(());
        }
        self.flush()
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        self.backend.save(&self.map)
    }
}

impl std::fmt::Debug for IdentityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityStore")
            .field("map", &self.map)
            .finish_non_exhaustive()
    }
}
