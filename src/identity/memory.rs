//! In-process backend, used by tests.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{IdentityMap, Persist, PersistenceError};

#[derive(Debug, Default)]
struct Shared {
    stored: Mutex<Option<IdentityMap>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

/// Keeps the "persisted" map in memory. Clones share the same storage, so
/// a test can hand one clone to a store and inspect or re-open another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that already holds `map`.
    pub fn with_map(map: IdentityMap) -> Self {
        let store = Self::new();
        *store.shared.stored.lock() = Some(map);
        store
    }

    /// Make every following save fail (or succeed again).
    pub fn fail_saves(&self, fail: bool) {
        self.shared.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn saves(&self) -> usize {
        self.shared.saves.load(Ordering::SeqCst)
    }

    /// What a fresh load would return.
    pub fn stored(&self) -> Option<IdentityMap> {
        self.shared.stored.lock().clone()
    }
}

impl Persist for MemoryStore {
    fn load(&self) -> Result<Option<IdentityMap>, PersistenceError> {
        Ok(self.stored())
    }

    fn save(&self, map: &IdentityMap) -> Result<(), PersistenceError> {
        if self.shared.fail_saves.load(Ordering::SeqCst) {
            return Err(PersistenceError::Io(std::io::Error::other(
                "memory store set to fail",
            )));
        }
        *self.shared.stored.lock() = Some(map.clone());
        self.shared.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
