//! Source buffers, committed preview snapshots and render tokens.
//!
//! Buffers are what the user is typing; a snapshot is what the preview is
//! showing. The two only meet when the editor shell commits.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::PlaygroundError;

/// One of the three editable sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferKind {
    Markup,
    Styles,
    Script,
}

impl BufferKind {
    pub const ALL: [BufferKind; 3] = [BufferKind::Markup, BufferKind::Styles, BufferKind::Script];

    pub fn as_str(self) -> &'static str {
        match self {
            BufferKind::Markup => "markup",
            BufferKind::Styles => "styles",
            BufferKind::Script => "script",
        }
    }

    /// Editor pane label.
    pub fn label(self) -> &'static str {
        match self {
            BufferKind::Markup => "HTML",
            BufferKind::Styles => "CSS",
            BufferKind::Script => "JS",
        }
    }
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BufferKind {
    type Err = PlaygroundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "markup" | "html" => Ok(BufferKind::Markup),
            "styles" | "css" => Ok(BufferKind::Styles),
            "script" | "js" => Ok(BufferKind::Script),
            other => Err(PlaygroundError::UnknownBuffer(other.to_string())),
        }
    }
}

/// The live, editable text of all three buffers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBuffers {
    pub markup: String,
    pub styles: String,
    pub script: String,
}

impl SourceBuffers {
    pub fn new(
        markup: impl Into<String>,
        styles: impl Into<String>,
        script: impl Into<String>,
    ) -> Self {
        Self {
            markup: markup.into(),
            styles: styles.into(),
            script: script.into(),
        }
    }

    pub fn get(&self, kind: BufferKind) -> &str {
        match kind {
            BufferKind::Markup => &self.markup,
            BufferKind::Styles => &self.styles,
            BufferKind::Script => &self.script,
        }
    }

    /// Replace one buffer. Returns `false` when the text is unchanged.
    pub fn set(&mut self, kind: BufferKind, text: &str) -> bool {
        let slot = match kind {
            BufferKind::Markup => &mut self.markup,
            BufferKind::Styles => &mut self.styles,
            BufferKind::Script => &mut self.script,
        };
        if slot == text {
            return false;
        }
        slot.clear();
        slot.push_str(text);
        true
    }

    /// Freeze the current text into an immutable snapshot.
    pub fn snapshot(&self) -> PreviewSnapshot {
        PreviewSnapshot::new(&self.markup, &self.styles, &self.script)
    }

    /// True when the buffers hold exactly what `snapshot` renders.
    pub fn matches(&self, snapshot: &PreviewSnapshot) -> bool {
        self.markup == snapshot.markup()
            && self.styles == snapshot.styles()
            && self.script == snapshot.script()
    }
}

/// Immutable (markup, styles, script) triple that the preview renders.
///
/// Cloning is cheap; the text is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSnapshot {
    markup: Arc<str>,
    styles: Arc<str>,
    script: Arc<str>,
}

impl PreviewSnapshot {
    pub fn new(markup: &str, styles: &str, script: &str) -> Self {
        Self {
            markup: Arc::from(markup),
            styles: Arc::from(styles),
            script: Arc::from(script),
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn styles(&self) -> &str {
        &self.styles
    }

    pub fn script(&self) -> &str {
        &self.script
    }
}

impl Default for PreviewSnapshot {
    fn default() -> Self {
        Self::new("", "", "")
    }
}

/// Monotonic key identifying one committed snapshot.
///
/// A new token means the render context must be destroyed and rebuilt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderToken(u64);

impl RenderToken {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for RenderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_reports_unchanged_text() {
        let mut buffers = SourceBuffers::new("<p>hi</p>", "", "");
        assert!(!buffers.set(BufferKind::Markup, "<p>hi</p>"));
        assert!(buffers.set(BufferKind::Markup, "<p>bye</p>"));
        assert_eq!(buffers.get(BufferKind::Markup), "<p>bye</p>");
    }

    #[test]
    fn snapshot_is_detached_from_buffers() {
        let mut buffers = SourceBuffers::new("a", "b", "c");
        let snap = buffers.snapshot();
        buffers.set(BufferKind::Script, "changed");
        assert_eq!(snap.script(), "c");
        assert!(!buffers.matches(&snap));
    }

    #[test]
    fn buffer_kind_parses_aliases() {
        assert_eq!("html".parse::<BufferKind>().unwrap(), BufferKind::Markup);
        assert_eq!("styles".parse::<BufferKind>().unwrap(), BufferKind::Styles);
        assert!("python".parse::<BufferKind>().is_err());
    }

    #[test]
    fn tokens_increase() {
        let t = RenderToken::default();
        assert!(t.next() > t);
        assert_eq!(t.next().next().get(), 2);
    }
}
