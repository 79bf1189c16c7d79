//! File-backed implementation of the persistence port.
//!
//! Progress is a single JSON document holding the last completed level
//! index. Read failures are reported to the caller and never touch game
//! state; the engine keeps running on a failed write.

use std::fs;
use std::path::PathBuf;

use glade_core::{PersistenceError, PersistencePort};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct SaveData {
    last_completed_level: usize,
}

/// Save file recording the most recently completed level index.
#[derive(Debug)]
pub(crate) struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PersistencePort for FileStore {
    fn load_last_level(&self) -> Result<Option<usize>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        let data: SaveData = serde_json::from_str(&text)?;
        Ok(Some(data.last_completed_level))
    }

    fn store_last_level(&mut self, index: usize) -> Result<(), PersistenceError> {
        let text = serde_json::to_string_pretty(&SaveData {
            last_completed_level: index,
        })?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}
