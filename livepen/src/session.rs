//! A preview session wires the editor shell, render host and relay together
//! the way a host page does: commits go to the host, edits clear the error
//! banner, messages from the frame go through the relay.

use std::time::Instant;

use crate::editor::{Commit, EditorShell};
use crate::layout::{LayoutEngine, PaneLayout};
use crate::relay::{InboundMessage, RelayAction};
use crate::render_host::{HostView, RenderHost, RenderMode, RenderSurface};
use crate::snapshot::{BufferKind, RenderToken};

#[derive(Debug)]
pub struct PreviewSession<S> {
    shell: EditorShell,
    host: RenderHost<S>,
    layout: LayoutEngine,
}

impl<S: RenderSurface> PreviewSession<S> {
    /// Mount the shell's initial commit on `surface`.
    pub fn new(shell: EditorShell, surface: S, layout: PaneLayout) -> Self {
        let mut host = RenderHost::new(surface, RenderMode::Interactive);
        let initial = shell.initial_commit();
        host.present(initial.token, &initial.snapshot);
        Self {
            shell,
            host,
            layout: LayoutEngine::new(layout),
        }
    }

    /// Apply an edit. Any real change acknowledges the current error.
    pub fn edit(&mut self, kind: BufferKind, text: &str, now: Instant) -> bool {
        let changed = self.shell.edit(kind, text, now);
        if changed {
            self.host.relay_mut().on_buffer_changed();
        }
        changed
    }

    /// Fire a due auto-run commit.
    pub fn poll(&mut self, now: Instant) -> Option<RenderToken> {
        let commit = self.shell.poll(now)?;
        Some(self.present(commit))
    }

    pub fn run(&mut self) -> RenderToken {
        let commit = self.shell.run();
        self.present(commit)
    }

    pub fn refresh(&mut self) -> RenderToken {
        let commit = self.shell.refresh();
        self.present(commit)
    }

    pub fn retry(&mut self) -> &HostView {
        self.host.retry()
    }

    pub fn set_auto_run(&mut self, enabled: bool) {
        self.shell.set_auto_run(enabled);
    }

    pub fn receive(&mut self, message: InboundMessage) -> RelayAction {
        self.host.relay_mut().receive(message)
    }

    pub fn dismiss_error(&mut self) {
        self.host.relay_mut().dismiss();
    }

    pub fn error(&self) -> Option<&str> {
        self.host.relay().banner()
    }

    pub fn shell(&self) -> &EditorShell {
        &self.shell
    }

    pub fn host(&self) -> &RenderHost<S> {
        &self.host
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut LayoutEngine {
        &mut self.layout
    }

    fn present(&mut self, commit: Commit) -> RenderToken {
        self.host.present(commit.token, &commit.snapshot);
        commit.token
    }
}
