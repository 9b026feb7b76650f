//! A project directory on disk: the three source files plus optional config.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::PlaygroundConfig;
use crate::error::{PlaygroundError, Result};
use crate::layout::LayoutStore;
use crate::snapshot::{BufferKind, SourceBuffers};

const STARTER_MARKUP: &str = r##"<main>
  <h1>Hello, livepen</h1>
  <p>Edit the HTML, CSS and JS panes. The preview refreshes as you type.</p>
  <p><a href="https://developer.mozilla.org/">Open MDN</a> · <a href="#">Placeholder link</a></p>
  <button id="greet">Click me</button>
</main>
"##;

const STARTER_STYLES: &str = r#"body {
  font-family: system-ui, sans-serif;
  margin: 2rem;
}

h1 {
  color: #4f46e5;
}
"#;

const STARTER_SCRIPT: &str = r#"document.getElementById('greet').addEventListener('click', () => {
  alert('Hello from the preview!');
});
"#;

#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: PlaygroundConfig,
}

impl Project {
    /// Open `root`, reading its config file if present.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = PlaygroundConfig::load(&root)?;
        Ok(Self { root, config })
    }

    pub fn with_config(root: impl Into<PathBuf>, config: PlaygroundConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Display name: the directory name.
    pub fn name(&self) -> String {
        self.root
            .canonicalize()
            .ok()
            .as_deref()
            .unwrap_or(&self.root)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    }

    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PlaygroundConfig {
        &mut self.config
    }

    pub fn path_for(&self, kind: BufferKind) -> PathBuf {
        self.root.join(self.config.file_for(kind))
    }

    /// Which buffer, if any, lives at `path`.
    pub fn kind_for_path(&self, path: &Path) -> Option<BufferKind> {
        BufferKind::ALL
            .into_iter()
            .find(|&kind| same_file(&self.path_for(kind), path))
    }

    /// Read all three files. A missing file is an empty buffer.
    pub fn load_buffers(&self) -> Result<SourceBuffers> {
        let mut buffers = SourceBuffers::default();
        for kind in BufferKind::ALL {
            let text = self.read(kind)?;
            buffers.set(kind, &text);
        }
        Ok(buffers)
    }

    pub fn read(&self, kind: BufferKind) -> Result<String> {
        let path = self.path_for(kind);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "missing source file, starting empty");
                Ok(String::new())
            }
            Err(e) => Err(PlaygroundError::io(path, e)),
        }
    }

    /// Write every buffer whose file content differs. Returns the kinds
    /// written.
    pub fn save_buffers(&self, buffers: &SourceBuffers) -> Result<Vec<BufferKind>> {
        let mut written = Vec::new();
        for kind in BufferKind::ALL {
            if self.read(kind)? == buffers.get(kind) {
                continue;
            }
            let path = self.path_for(kind);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| PlaygroundError::io(parent, e))?;
            }
            std::fs::write(&path, buffers.get(kind)).map_err(|e| PlaygroundError::io(&path, e))?;
            written.push(kind);
        }
        if !written.is_empty() {
            info!(files = written.len(), "project saved");
        }
        Ok(written)
    }

    pub fn layout_store(&self) -> LayoutStore {
        LayoutStore::new(self.root.join(&self.config.layout_file))
    }
}

/// Scaffold a starter project in `dir`. Existing files are left alone.
/// Returns the files created.
pub fn init(dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| PlaygroundError::io(dir, e))?;
    let project = Project::with_config(dir, PlaygroundConfig::default());
    let mut created = Vec::new();
    for (kind, text) in [
        (BufferKind::Markup, STARTER_MARKUP),
        (BufferKind::Styles, STARTER_STYLES),
        (BufferKind::Script, STARTER_SCRIPT),
    ] {
        let path = project.path_for(kind);
        if path.exists() {
            continue;
        }
        std::fs::write(&path, text).map_err(|e| PlaygroundError::io(&path, e))?;
        created.push(path);
    }
    Ok(created)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("livepen-project-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn init_then_load() {
        let dir = temp_dir("init");
        let created = init(&dir).unwrap();
        assert_eq!(created.len(), 3);
        assert!(init(&dir).unwrap().is_empty());

        let project = Project::open(&dir).unwrap();
        let buffers = project.load_buffers().unwrap();
        assert!(buffers.markup.contains("Hello, livepen"));
        assert!(buffers.markup.contains(r##"<a href="#">Placeholder link</a>"##));
        assert!(buffers.markup.trim_end().ends_with("</main>"));
        assert!(buffers.script.contains("addEventListener"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_files_are_empty_buffers() {
        let dir = temp_dir("empty");
        std::fs::create_dir_all(&dir).unwrap();
        let project = Project::open(&dir).unwrap();
        assert_eq!(project.load_buffers().unwrap(), SourceBuffers::default());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_writes_only_changed_files() {
        let dir = temp_dir("save");
        init(&dir).unwrap();
        let project = Project::open(&dir).unwrap();
        let mut buffers = project.load_buffers().unwrap();
        buffers.set(BufferKind::Styles, "body { margin: 0 }");
        assert_eq!(project.save_buffers(&buffers).unwrap(), vec![BufferKind::Styles]);
        assert_eq!(project.read(BufferKind::Styles).unwrap(), "body { margin: 0 }");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn kind_for_path_matches_configured_files() {
        let dir = temp_dir("kind");
        init(&dir).unwrap();
        let project = Project::open(&dir).unwrap();
        assert_eq!(project.kind_for_path(&dir.join("style.css")), Some(BufferKind::Styles));
        assert_eq!(project.kind_for_path(&dir.join("other.txt")), None);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
