//! Editor shell: owns the three buffers and decides when the preview
//! refreshes.
//!
//! Time is passed in explicitly. The caller (a server task, a UI loop, a
//! test) asks for [`EditorShell::deadline`], sleeps until then and calls
//! [`EditorShell::poll`].

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::snapshot::{BufferKind, PreviewSnapshot, RenderToken, SourceBuffers};

/// Quiet period after the last edit before an auto-run commit.
pub const AUTO_RUN_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitState {
    /// Buffers differ from the preview and nothing is scheduled.
    Editing,
    /// An auto-run commit fires at `deadline` unless re-armed or pre-empted.
    PendingCommit { deadline: Instant },
    /// The preview shows the buffers as they are.
    Committed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitReason {
    InitialLoad,
    AutoRun,
    ExplicitRun,
    Refresh,
}

/// A new snapshot for the render host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub token: RenderToken,
    pub snapshot: PreviewSnapshot,
    pub reason: CommitReason,
}

#[derive(Debug, Clone)]
pub struct EditorShell {
    buffers: SourceBuffers,
    committed: PreviewSnapshot,
    token: RenderToken,
    state: CommitState,
    auto_run: bool,
    debounce: Duration,
}

impl EditorShell {
    /// Start with `buffers` already committed under token 1.
    pub fn new(buffers: SourceBuffers) -> Self {
        let committed = buffers.snapshot();
        Self {
            buffers,
            committed,
            token: RenderToken::default().next(),
            state: CommitState::Committed,
            auto_run: true,
            debounce: AUTO_RUN_DEBOUNCE,
        }
    }

    #[must_use]
    pub fn with_auto_run(mut self, enabled: bool) -> Self {
        self.auto_run = enabled;
        self
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// The commit made at construction.
    pub fn initial_commit(&self) -> Commit {
        Commit {
            token: self.token,
            snapshot: self.committed.clone(),
            reason: CommitReason::InitialLoad,
        }
    }

    /// Apply a user edit. Returns `false` when the text did not change, in
    /// which case no timer is armed.
    pub fn edit(&mut self, kind: BufferKind, text: &str, now: Instant) -> bool {
        if !self.buffers.set(kind, text) {
            return false;
        }
        self.state = if self.auto_run {
            CommitState::PendingCommit {
                deadline: now + self.debounce,
            }
        } else {
            CommitState::Editing
        };
        debug!(buffer = %kind, len = text.len(), state = ?self.state, "buffer edited");
        true
    }

    /// When the pending auto-run commit is due.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            CommitState::PendingCommit { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// Fire the auto-run commit if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<Commit> {
        match self.state {
            CommitState::PendingCommit { deadline } if now >= deadline => {
                Some(self.commit(CommitReason::AutoRun))
            }
            _ => None,
        }
    }

    /// Commit immediately, cancelling any pending auto-run.
    pub fn run(&mut self) -> Commit {
        self.commit(CommitReason::ExplicitRun)
    }

    /// Re-commit the current buffers under a new token even if unchanged.
    pub fn refresh(&mut self) -> Commit {
        self.commit(CommitReason::Refresh)
    }

    /// Turning auto-run off cancels a pending commit; turning it on does not
    /// commit by itself.
    pub fn set_auto_run(&mut self, enabled: bool) {
        self.auto_run = enabled;
        if !enabled && matches!(self.state, CommitState::PendingCommit { .. }) {
            self.state = CommitState::Editing;
        }
        debug!(enabled, "auto-run toggled");
    }

    fn commit(&mut self, reason: CommitReason) -> Commit {
        self.token = self.token.next();
        self.committed = self.buffers.snapshot();
        self.state = CommitState::Committed;
        info!(token = %self.token, ?reason, "preview committed");
        Commit {
            token: self.token,
            snapshot: self.committed.clone(),
            reason,
        }
    }

    pub fn buffers(&self) -> &SourceBuffers {
        &self.buffers
    }

    pub fn committed(&self) -> &PreviewSnapshot {
        &self.committed
    }

    pub fn token(&self) -> RenderToken {
        self.token
    }

    pub fn state(&self) -> CommitState {
        self.state
    }

    pub fn auto_run(&self) -> bool {
        self.auto_run
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Buffers hold edits the preview does not show yet.
    pub fn is_dirty(&self) -> bool {
        !self.buffers.matches(&self.committed)
    }
}
