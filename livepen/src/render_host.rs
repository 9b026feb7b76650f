//! Isolated render host: owns the single live render context and replaces
//! it wholesale on every new render token.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{PlaygroundError, Result};
use crate::relay::MessageRelay;
use crate::runtime::{assemble_with, AssembledDocument};
use crate::runtime::helpers::attr_escape;
use crate::snapshot::{PreviewSnapshot, RenderToken};

/// Title of the local fallback shown when a mount fails.
pub const FAILED_TITLE: &str = "Preview Failed";

// ── Modes ─────────────────────────────────────────────────────────────

/// How a preview is rendered. Each mode has a fixed capability set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// The main editor preview.
    #[default]
    Interactive,
    /// Thumbnails and grids: static, no input.
    Passive,
}

/// What the isolated context is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// iframe `sandbox` tokens. Never includes `allow-same-origin`.
    pub sandbox: &'static [&'static str],
    pub modals: bool,
    pub pointer_events: bool,
    pub freeze_motion: bool,
}

const INTERACTIVE: Capabilities = Capabilities {
    sandbox: &["allow-scripts", "allow-modals"],
    modals: true,
    pointer_events: true,
    freeze_motion: false,
};

const PASSIVE: Capabilities = Capabilities {
    sandbox: &["allow-scripts"],
    modals: false,
    pointer_events: false,
    freeze_motion: true,
};

impl RenderMode {
    pub const fn capabilities(self) -> Capabilities {
        match self {
            RenderMode::Interactive => INTERACTIVE,
            RenderMode::Passive => PASSIVE,
        }
    }

    /// Value of the iframe `sandbox` attribute.
    pub fn sandbox_attr(self) -> String {
        self.capabilities().sandbox.join(" ")
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Interactive => f.write_str("interactive"),
            RenderMode::Passive => f.write_str("passive"),
        }
    }
}

/// Markup of the iframe that hosts the render context for `token`.
///
/// The token is part of the element so a host page can tell frames apart and
/// replace, never patch, the element when the token changes.
pub fn frame_markup(token: RenderToken, mode: RenderMode, src: &str) -> String {
    let style = if mode.capabilities().pointer_events {
        ""
    } else {
        r#" style="pointer-events:none""#
    };
    format!(
        r#"<iframe class="preview-frame" title="Preview" sandbox="{sandbox}" referrerpolicy="no-referrer" data-render-token="{token}" data-render-mode="{mode}" src="{src}"{style}></iframe>"#,
        sandbox = mode.sandbox_attr(),
        src = attr_escape(src),
    )
}

// ── Surfaces ──────────────────────────────────────────────────────────

/// Where assembled documents are mounted: a browser frame, a served
/// document slot, a test double.
pub trait RenderSurface {
    /// Create a fresh context for `token` showing `document`.
    fn mount(&mut self, token: RenderToken, document: &AssembledDocument) -> Result<()>;

    /// Destroy the current context, if any.
    fn unmount(&mut self);
}

/// Surface that keeps the mounted document in memory so a server can hand
/// it to the browser frame. Documents over `max_bytes` are refused.
#[derive(Debug, Clone)]
pub struct DocumentSurface {
    max_bytes: usize,
    mounted: Option<(RenderToken, String)>,
}

impl DocumentSurface {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            mounted: None,
        }
    }

    /// Currently mounted document, if any.
    pub fn document(&self) -> Option<(RenderToken, &str)> {
        self.mounted.as_ref().map(|(t, d)| (*t, d.as_str()))
    }
}

impl RenderSurface for DocumentSurface {
    fn mount(&mut self, token: RenderToken, document: &AssembledDocument) -> Result<()> {
        if document.len() > self.max_bytes {
            return Err(PlaygroundError::surface(format!(
                "document is {} bytes, limit is {}",
                document.len(),
                self.max_bytes
            )));
        }
        self.mounted = Some((token, document.as_str().to_string()));
        Ok(())
    }

    fn unmount(&mut self) {
        self.mounted = None;
    }
}

// ── Host ──────────────────────────────────────────────────────────────

/// What the host currently shows in place of the preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HostView {
    /// Nothing mounted yet.
    Empty,
    Live { token: RenderToken },
    /// Mount failed; the host shows [`FAILED_TITLE`] and a retry action.
    Failed { token: RenderToken, message: String },
}

/// Owns one surface and the relay bound to its lifetime.
#[derive(Debug)]
pub struct RenderHost<S> {
    surface: S,
    mode: RenderMode,
    relay: MessageRelay,
    view: HostView,
    current: Option<(RenderToken, PreviewSnapshot)>,
}

impl<S: RenderSurface> RenderHost<S> {
    pub fn new(surface: S, mode: RenderMode) -> Self {
        Self {
            surface,
            mode,
            relay: MessageRelay::new(),
            view: HostView::Empty,
            current: None,
        }
    }

    /// Show `snapshot` under `token`. Tokens not newer than the current one
    /// are ignored: the last commit wins. Failures never escape; they become
    /// [`HostView::Failed`].
    pub fn present(&mut self, token: RenderToken, snapshot: &PreviewSnapshot) -> &HostView {
        if let Some((current, _)) = &self.current {
            if token <= *current {
                debug!(%token, current = %current, "ignoring stale render token");
                return &self.view;
            }
        }
        self.current = Some((token, snapshot.clone()));
        self.mount(token, snapshot.clone())
    }

    /// Remount the last snapshot with the same token after a failure.
    pub fn retry(&mut self) -> &HostView {
        if !matches!(self.view, HostView::Failed { .. }) {
            return &self.view;
        }
        match self.current.clone() {
            Some((token, snapshot)) => {
                info!(%token, "retrying preview mount");
                self.mount(token, snapshot)
            }
            None => &self.view,
        }
    }

    /// Tear down the context and stop listening to it.
    pub fn unmount(&mut self) {
        self.surface.unmount();
        self.relay.unsubscribe();
        self.view = HostView::Empty;
    }

    fn mount(&mut self, token: RenderToken, snapshot: PreviewSnapshot) -> &HostView {
        self.surface.unmount();
        self.relay.unsubscribe();

        let document = assemble_with(&snapshot, self.mode);
        self.view = match self.surface.mount(token, &document) {
            Ok(()) => {
                self.relay.subscribe();
                debug!(%token, bytes = document.len(), "preview mounted");
                HostView::Live { token }
            }
            Err(e) => {
                warn!(%token, error = %e, "preview mount failed");
                HostView::Failed {
                    token,
                    message: e.to_string(),
                }
            }
        };
        &self.view
    }

    pub fn view(&self) -> &HostView {
        &self.view
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn token(&self) -> Option<RenderToken> {
        self.current.as_ref().map(|(t, _)| *t)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn relay(&self) -> &MessageRelay {
        &self.relay
    }

    pub fn relay_mut(&mut self) -> &mut MessageRelay {
        &mut self.relay
    }
}
