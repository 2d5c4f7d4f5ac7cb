use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::ProgressError;
use crate::gameplay::Progress;

const APP_DIR: &str = "liquid_sort";
const PROGRESS_FILE: &str = "progress.json";

/// JSON file holding the unlocked-level watermark and the sound flag.
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self, ProgressError> {
        let dir = dirs::data_dir().ok_or(ProgressError::NoDataDir)?;
        Ok(Self::new(dir.join(APP_DIR).join(PROGRESS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file means a fresh player.
    pub fn load(&self) -> Result<Progress, ProgressError> {
        if !self.path.exists() {
            debug!("No progress at {}, starting fresh.", self.path.display());
            return Ok(Progress::default());
        }
        let text = fs::read_to_string(&self.path).map_err(|source| ProgressError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ProgressError::Format {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, progress: &Progress) -> Result<(), ProgressError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ProgressError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let text = serde_json::to_string_pretty(progress).map_err(|source| ProgressError::Format {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, text).map_err(|source| ProgressError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
