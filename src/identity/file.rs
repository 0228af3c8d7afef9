//! JSON side-file backend.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{IdentityMap, Persist, PersistenceError};

/// Stores the identity map as pretty-printed JSON.
///
/// Writes go to `<path>.tmp`, are synced, then renamed over `<path>`, so a
/// crash leaves either the old or the new file in place.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }
}

impl Persist for JsonFileStore {
    fn load(&self) -> Result<Option<IdentityMap>, PersistenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        IdentityMap::from_json(&raw).map(Some)
    }

    fn save(&self, map: &IdentityMap) -> Result<(), PersistenceError> {
        let json = map.to_json()?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        // Write to temp file first
        let temp_path = self.sibling(".tmp");
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;

        // Atomic rename
        fs::rename(&temp_path, &self.path)?;

        debug!(path = %self.path.display(), "Identity map saved");
        Ok(())
    }

    fn quarantine(&self) {
        let aside = self.sibling(".corrupt");
        match fs::copy(&self.path, &aside) {
            Ok(_) => warn!(path = %aside.display(), "Unreadable identity file copied aside"),
            Err(e) => warn!(error = %e, "Failed to copy unreadable identity file aside"),
        }
    }
}
