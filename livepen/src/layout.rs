//! Resizable pane layout: the main editor/preview split, the three editor
//! panes and pointer-driven resizing.
//!
//! Pointer moves during a drag are recorded but only published once per
//! animation frame (`flush_frame`). Only the main split size persists.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PlaygroundError, Result};

pub const MAIN_SPLIT_MIN: f64 = 20.0;
pub const MAIN_SPLIT_MAX: f64 = 80.0;
pub const DEFAULT_MAIN_SPLIT: f64 = 50.0;
pub const EDITOR_SPLIT_MIN: f64 = 10.0;
pub const DEFAULT_EDITOR_SPLITS: [f64; 3] = [33.0, 33.0, 34.0];

/// Where the editor column sits relative to the preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrangement {
    #[default]
    Left,
    Right,
    Bottom,
    /// Editors hidden, preview fills the viewport.
    Hidden,
}

impl Arrangement {
    /// True when the main split runs along the x axis.
    fn is_horizontal(self) -> bool {
        matches!(self, Arrangement::Left | Arrangement::Right)
    }

    /// Moving the pointer in the positive direction grows the editors.
    fn grows_with_pointer(self) -> bool {
        matches!(self, Arrangement::Left)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaneLayout {
    pub arrangement: Arrangement,
    /// Editor share of the main split, in percent.
    pub editor_panel_size: f64,
    pub code_panel_hidden: bool,
    /// Markup, styles, script pane sizes in percent; sum to 100.
    pub editor_splits: [f64; 3],
}

impl Default for PaneLayout {
    fn default() -> Self {
        Self {
            arrangement: Arrangement::default(),
            editor_panel_size: DEFAULT_MAIN_SPLIT,
            code_panel_hidden: false,
            editor_splits: DEFAULT_EDITOR_SPLITS,
        }
    }
}

impl PaneLayout {
    pub fn editors_visible(&self) -> bool {
        self.arrangement != Arrangement::Hidden && !self.code_panel_hidden
    }
}

/// Which divider is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "index")]
pub enum SplitHandle {
    /// Between the editor column and the preview.
    Main,
    /// Between editor pane `i` and `i + 1` (0 or 1).
    Editor(usize),
}

/// Pointer position in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Container size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Transient state of one drag, from pointer-down to pointer-up.
#[derive(Debug, Clone)]
struct DragSession {
    handle: SplitHandle,
    origin: Point,
    container: Size,
    start: PaneLayout,
    pending: Option<PaneLayout>,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    layout: PaneLayout,
    drag: Option<DragSession>,
}

impl LayoutEngine {
    pub fn new(layout: PaneLayout) -> Self {
        Self { layout, drag: None }
    }

    pub fn layout(&self) -> &PaneLayout {
        &self.layout
    }

    pub fn set_arrangement(&mut self, arrangement: Arrangement) {
        self.cancel_drag();
        self.layout.arrangement = arrangement;
    }

    pub fn toggle_code_panel(&mut self) -> bool {
        self.cancel_drag();
        self.layout.code_panel_hidden = !self.layout.code_panel_hidden;
        self.layout.code_panel_hidden
    }

    /// Set the main split directly (keyboard, restored state), clamped.
    pub fn set_editor_panel_size(&mut self, size: f64) {
        self.layout.editor_panel_size = clamp_main(size);
    }

    /// Start dragging `handle`. Returns `false` (and does nothing) when the
    /// handle is not on screen or the container has no size.
    pub fn begin_drag(&mut self, handle: SplitHandle, origin: Point, container: Size) -> bool {
        let valid_handle = match handle {
            SplitHandle::Main => self.layout.editors_visible(),
            SplitHandle::Editor(i) => self.layout.editors_visible() && i < 2,
        };
        if !valid_handle || container.width <= 0.0 || container.height <= 0.0 {
            return false;
        }
        debug!(?handle, "drag started");
        self.drag = Some(DragSession {
            handle,
            origin,
            container,
            start: self.layout,
            pending: None,
        });
        true
    }

    /// Record a pointer move. Nothing is published until the next frame.
    pub fn drag_to(&mut self, pointer: Point) {
        let arrangement = self.layout.arrangement;
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let (delta, extent) = match (drag.handle, arrangement.is_horizontal()) {
            (SplitHandle::Main, true) | (SplitHandle::Editor(_), false) => {
                (pointer.x - drag.origin.x, drag.container.width)
            }
            (SplitHandle::Main, false) | (SplitHandle::Editor(_), true) => {
                (pointer.y - drag.origin.y, drag.container.height)
            }
        };
        let percent = delta * 100.0 / extent;
        if !percent.is_finite() {
            return;
        }

        let mut next = drag.start;
        match drag.handle {
            SplitHandle::Main => {
                let signed = if arrangement.grows_with_pointer() {
                    percent
                } else {
                    -percent
                };
                next.editor_panel_size = clamp_main(drag.start.editor_panel_size + signed);
            }
            SplitHandle::Editor(i) => {
                next.editor_splits = resize_pair(drag.start.editor_splits, i, percent);
            }
        }
        drag.pending = Some(next);
    }

    /// Publish the latest recorded move, at most once per frame.
    pub fn flush_frame(&mut self) -> Option<PaneLayout> {
        let pending = self.drag.as_mut()?.pending.take()?;
        self.layout = pending;
        Some(pending)
    }

    /// Pointer released. Applies the last move and reports whether the
    /// persisted main split changed.
    pub fn end_drag(&mut self) -> bool {
        let Some(mut drag) = self.drag.take() else {
            return false;
        };
        if let Some(pending) = drag.pending.take() {
            self.layout = pending;
        }
        debug!(size = self.layout.editor_panel_size, "drag ended");
        drag.handle == SplitHandle::Main
            && self.layout.editor_panel_size != drag.start.editor_panel_size
    }

    /// Abort the drag and restore the layout from before it.
    pub fn cancel_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            self.layout = drag.start;
        }
    }

    /// The full-viewport overlay that keeps the preview from swallowing
    /// pointer events is shown exactly while a drag is active.
    pub fn overlay_visible(&self) -> bool {
        self.drag.is_some()
    }
}

/// Clamp a main split value to [20, 80]; NaN falls back to the default.
pub fn clamp_main(size: f64) -> f64 {
    if size.is_nan() {
        return DEFAULT_MAIN_SPLIT;
    }
    size.clamp(MAIN_SPLIT_MIN, MAIN_SPLIT_MAX)
}

/// Move the divider between panes `i` and `i + 1` by `delta` percent,
/// keeping both at or above the minimum and the total unchanged.
fn resize_pair(mut splits: [f64; 3], i: usize, delta: f64) -> [f64; 3] {
    if i >= 2 {
        return splits;
    }
    let pair = splits[i] + splits[i + 1];
    let first = (splits[i] + delta).clamp(EDITOR_SPLIT_MIN, (pair - EDITOR_SPLIT_MIN).max(EDITOR_SPLIT_MIN));
    splits[i] = first;
    splits[i + 1] = pair - first;
    splits
}

// ── Persistence ───────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PersistedLayout {
    editor_panel_size: f64,
}

/// Stores the main split size as a small JSON file.
#[derive(Debug, Clone)]
pub struct LayoutStore {
    path: PathBuf,
}

impl LayoutStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Defaults with the persisted main split applied. Missing, unreadable or
    /// out-of-range data yields plain defaults.
    pub fn load(&self) -> PaneLayout {
        let mut layout = PaneLayout::default();
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return layout,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read layout, using defaults");
                return layout;
            }
        };
        match serde_json::from_str::<PersistedLayout>(&text) {
            Ok(p)
                if p.editor_panel_size.is_finite()
                    && (MAIN_SPLIT_MIN..=MAIN_SPLIT_MAX).contains(&p.editor_panel_size) =>
            {
                layout.editor_panel_size = p.editor_panel_size;
            }
            Ok(p) => {
                warn!(size = p.editor_panel_size, "persisted layout out of range, using defaults");
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "invalid layout file, using defaults");
            }
        }
        layout
    }

    pub fn save(&self, layout: &PaneLayout) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| PlaygroundError::io(parent, e))?;
            }
        }
        let json = serde_json::to_string_pretty(&PersistedLayout {
            editor_panel_size: clamp_main(layout.editor_panel_size),
        })
        .map_err(|e| PlaygroundError::config(&self.path, e))?;
        std::fs::write(&self.path, json).map_err(|e| PlaygroundError::io(&self.path, e))
    }
}
