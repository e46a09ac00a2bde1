//! # pressgate-adapter-press-log
//!
//! Append-only text log of accepted presses, one line per notified target:
//!
//! ```text
//! 2025-03-14T18:05:09.042Z - pin:19 - quadra02_camera01
//! ```
//!
//! The file is opened in append mode for every record so that external
//! rotation (move or truncate) is picked up without a restart.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Deserialize;

use pressgate_app::ports::PressLog;
use pressgate_domain::error::PressLogError;
use pressgate_domain::press::PressRecord;

/// Where the press log lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PressLogConfig {
    pub directory: PathBuf,
    pub file_name: String,
}

impl PressLogConfig {
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

impl Default for PressLogConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_name: "button_presses_details.txt".to_string(),
        }
    }
}

/// [`PressLog`] backed by a plain text file.
#[derive(Debug)]
pub struct FilePressLog {
    path: PathBuf,
    // serialises appends coming from different line tasks
    guard: Mutex<()>,
}

impl FilePressLog {
    /// Create the log directory (recursively) and return a log writing to
    /// `config.directory/config.file_name`.
    ///
    /// # Errors
    ///
    /// Returns [`PressLogError::Io`] if the directory cannot be created.
    pub fn new(config: &PressLogConfig) -> Result<Self, PressLogError> {
        fs::create_dir_all(&config.directory)?;
        let path = config.path();
        tracing::debug!(path = %path.display(), "press log ready");
        Ok(Self {
            path,
            guard: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PressLog for FilePressLog {
    fn append(&self, record: &PressRecord) -> Result<(), PressLogError> {
        let line = format!("{record}\n");
        let _lock = self
            .guard
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}
