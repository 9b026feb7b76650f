pub mod config;
pub mod editor;
pub mod error;
pub mod intercept;
pub mod layout;
pub mod lexer;
pub mod project;
pub mod relay;
pub mod render_host;
pub mod runtime;
pub mod sanitize;
pub mod session;
pub mod snapshot;
pub mod tag;
pub mod token;

#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
#[cfg(not(target_arch = "wasm32"))]
pub mod server;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::PlaygroundConfig;
pub use editor::{Commit, CommitReason, CommitState, EditorShell};
pub use error::{PlaygroundError, Result};
pub use intercept::{InterceptEvent, LinkAction, RuntimeShim, ShimEvent, ShimOutcome};
pub use layout::{Arrangement, LayoutEngine, LayoutStore, PaneLayout};
pub use project::Project;
pub use relay::{InboundMessage, MessageRelay, RelayAction};
pub use render_host::{
    frame_markup, DocumentSurface, HostView, RenderHost, RenderMode, RenderSurface,
};
pub use runtime::{assemble, assemble_with, AssembledDocument};
pub use sanitize::sanitize;
pub use session::PreviewSession;
pub use snapshot::{BufferKind, PreviewSnapshot, RenderToken, SourceBuffers};

/// Assemble the interactive document for the committed state of `buffers`.
pub fn preview_document(buffers: &SourceBuffers) -> AssembledDocument {
    assemble_with(&buffers.snapshot(), RenderMode::Interactive)
}
