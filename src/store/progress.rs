use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::session::stats::Stats;

const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no data directory available")]
    NoDataDir,
}

/// Partially typed file, saved so the session can be rehydrated later
/// without replaying keystrokes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedProgress {
    pub schema_version: u32,
    pub repository_id: u64,
    pub file_item_id: u64,
    pub typed_text_lines: Vec<String>,
    pub cursor_positions: Vec<usize>,
    pub cursor_line: usize,
    pub stats: Stats,
    pub saved_at: DateTime<Utc>,
}

impl SavedProgress {
    pub fn new(
        repository_id: u64,
        file_item_id: u64,
        typed_text_lines: Vec<String>,
        cursor_positions: Vec<usize>,
        cursor_line: usize,
        stats: Stats,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            repository_id,
            file_item_id,
            typed_text_lines,
            cursor_positions,
            cursor_line,
            stats,
            saved_at: Utc::now(),
        }
    }

    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}

pub struct ProgressStore {
    base_dir: PathBuf,
}

impl ProgressStore {
    pub fn new() -> Result<Self, StoreError> {
        let base_dir = dirs::data_dir()
            .ok_or(StoreError::NoDataDir)?
            .join("repotype")
            .join("progress");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, repository_id: u64, file_item_id: u64) -> PathBuf {
        self.base_dir
            .join(format!("{repository_id}_{file_item_id}.json"))
    }

    /// Missing, unreadable or stale files all read as "no progress".
    pub fn load(&self, repository_id: u64, file_item_id: u64) -> Option<SavedProgress> {
        let path = self.file_path(repository_id, file_item_id);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<SavedProgress>(&content) {
            Ok(saved) if !saved.needs_reset() => Some(saved),
            Ok(_) => None,
            Err(err) => {
                warn!(path = %path.display(), %err, "discarding unreadable progress");
                None
            }
        }
    }

    pub fn save(&self, progress: &SavedProgress) -> Result<(), StoreError> {
        let path = self.file_path(progress.repository_id, progress.file_item_id);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(progress)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn remove(&self, repository_id: u64, file_item_id: u64) -> Result<(), StoreError> {
        let path = self.file_path(repository_id, file_item_id);
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
