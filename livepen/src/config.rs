//! Project configuration, read from `livepen.json` in the project directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlaygroundError, Result};
use crate::snapshot::BufferKind;

/// Name of the optional config file inside a project directory.
pub const CONFIG_FILE: &str = "livepen.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaygroundConfig {
    /// Dev server port.
    pub port: u16,
    /// Commit automatically after the debounce period.
    pub auto_run: bool,
    pub debounce_ms: u64,
    pub markup_file: PathBuf,
    pub styles_file: PathBuf,
    pub script_file: PathBuf,
    /// Persisted layout, relative to the project directory.
    pub layout_file: PathBuf,
    /// Assembled documents larger than this fail to mount.
    pub max_document_bytes: usize,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            port: 3333,
            auto_run: true,
            debounce_ms: 500,
            markup_file: PathBuf::from("index.html"),
            styles_file: PathBuf::from("style.css"),
            script_file: PathBuf::from("script.js"),
            layout_file: PathBuf::from(".livepen/layout.json"),
            max_document_bytes: 2 * 1024 * 1024,
        }
    }
}

impl PlaygroundConfig {
    /// Load `livepen.json` from `dir`, or defaults when it does not exist.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(PlaygroundError::io(path, e)),
        };
        serde_json::from_str(&text).map_err(|e| PlaygroundError::config(path, e))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Relative file name holding `kind`.
    pub fn file_for(&self, kind: BufferKind) -> &Path {
        match kind {
            BufferKind::Markup => &self.markup_file,
            BufferKind::Styles => &self.styles_file,
            BufferKind::Script => &self.script_file,
        }
    }
}
