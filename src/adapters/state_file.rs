//! JSON state file adapter.
//!
//! Implements [`StatePort`] over a single JSON document:
//!
//! ```json
//! {"last_level": 254, "last_temp": [50, 0], "is_off": false}
//! ```
//!
//! Saves go to a sibling temp file which is then renamed over the target,
//! so a crash mid-save leaves either the old or the new snapshot.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app::ports::StatePort;
use crate::error::StorageError;
use crate::state::LampState;

#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StatePort for JsonStateStore {
    fn load(&self) -> Result<LampState, StorageError> {
        let text = fs::read_to_string(&self.path)?;
        serde_json::from_str(&text).map_err(|_| StorageError::Corrupted)
    }

    fn save(&mut self, state: &LampState) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_vec_pretty(state).map_err(|_| StorageError::Corrupted)?;

        let tmp = self.tmp_path();
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&json)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
