use std::path::PathBuf;

use thiserror::Error;

/// All errors produced by the playground.
///
/// The preview pipeline itself (sanitize, assemble) never fails; errors only
/// come from the edges: the filesystem, configuration, the file watcher and
/// render surfaces.
#[derive(Debug, Error)]
pub enum PlaygroundError {
    /// Reading or writing a project file failed.
    #[error("cannot access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config or layout file exists but is not valid JSON for its schema.
    #[error("invalid config '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The project directory watcher could not be started.
    #[cfg(not(target_arch = "wasm32"))]
    #[error("file watcher failed: {0}")]
    Watch(#[from] notify::Error),

    /// A render surface refused to mount an assembled document.
    #[error("render surface failed: {0}")]
    Surface(String),

    /// A buffer name on the wire did not match `markup`, `styles` or `script`.
    #[error("unknown buffer: {0}")]
    UnknownBuffer(String),
}

pub type Result<T> = std::result::Result<T, PlaygroundError>;

/// Shorthand constructors.
impl PlaygroundError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Config {
            path: path.into(),
            source,
        }
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }
}
