use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use notify::{Event, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch, Notify};
use tracing::{debug, info, warn};

use crate::editor::EditorShell;
use crate::intercept::{InterceptEvent, RuntimeShim};
use crate::layout::{Arrangement, LayoutStore, PaneLayout, Point, Size, SplitHandle};
use crate::project::Project;
use crate::relay::{InboundMessage, RelayAction};
use crate::render_host::{DocumentSurface, HostView, RenderMode};
use crate::runtime::assemble_with;
use crate::session::PreviewSession;
use crate::snapshot::{BufferKind, RenderToken};

mod css;
mod inline_js;
mod page;
mod panels;
mod toolbar;
pub(crate) mod util;

/// How long `GET /state` waits for a change before answering anyway.
const LONG_POLL: Duration = Duration::from_secs(25);

/// Server clock. Follows tokio's clock so a paused runtime drives the
/// debounce deadlines too.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// Highest client sequence number applied to each buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EditSeq {
    pub markup: u64,
    pub styles: u64,
    pub script: u64,
}

impl EditSeq {
    fn slot(&mut self, kind: BufferKind) -> &mut u64 {
        match kind {
            BufferKind::Markup => &mut self.markup,
            BufferKind::Styles => &mut self.styles,
            BufferKind::Script => &mut self.script,
        }
    }
}

struct DevState {
    project: Project,
    session: PreviewSession<DocumentSurface>,
    layout_store: LayoutStore,
    rev: u64,
    /// Bumped when a project file changes on disk.
    disk_rev: u64,
    edit_seq: EditSeq,
    /// Text this server last wrote to each file.
    written: HashMap<BufferKind, String>,
    /// Interception state of the mounted frame; reset for every token.
    shim: RuntimeShim,
    shim_token: RenderToken,
}

/// Everything the browser needs to render the preview region.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedState {
    pub rev: u64,
    pub disk_rev: u64,
    pub token: RenderToken,
    pub view: HostView,
    pub error: Option<String>,
    pub auto_run: bool,
    pub pending: bool,
    pub dirty: bool,
    pub sandbox: String,
    pub edit_seq: EditSeq,
}

impl DevState {
    fn published(&self) -> PublishedState {
        let shell = self.session.shell();
        PublishedState {
            rev: self.rev,
            disk_rev: self.disk_rev,
            token: shell.token(),
            view: self.session.host().view().clone(),
            error: self.session.error().map(str::to_string),
            auto_run: shell.auto_run(),
            pending: shell.deadline().is_some(),
            dirty: shell.is_dirty(),
            sandbox: self.session.host().mode().sandbox_attr(),
            edit_seq: self.edit_seq,
        }
    }
}

/// Shared server state: the session behind a mutex, the published view of
/// it and the debounce task's wake-up signal.
#[derive(Clone)]
pub struct AppState {
    dev: Arc<Mutex<DevState>>,
    published: Arc<watch::Sender<PublishedState>>,
    wake: Arc<Notify>,
}

impl AppState {
    fn dev(&self) -> MutexGuard<'_, DevState> {
        self.dev.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push the current state to long-polling browsers.
    fn publish(&self) {
        let state = {
            let mut dev = self.dev();
            dev.rev += 1;
            dev.published()
        };
        self.published.send_replace(state);
    }

    pub fn current(&self) -> PublishedState {
        self.published.borrow().clone()
    }

    /// Apply one client edit. `seq` orders edits of the same buffer; an edit
    /// at or below the last applied number arrived late and is dropped.
    fn apply_edit(&self, kind: BufferKind, text: &str, seq: Option<u64>) -> bool {
        let changed = {
            let mut dev = self.dev();
            if let Some(seq) = seq {
                let last = dev.edit_seq.slot(kind);
                if seq <= *last {
                    debug!(buffer = %kind, seq, last = *last, "dropping stale edit");
                    return false;
                }
                *last = seq;
            }
            dev.session.edit(kind, text, now())
        };
        if changed {
            self.wake.notify_one();
            self.publish();
        }
        changed
    }

    /// Write the buffers to disk, remembering the text of every file written.
    fn save(&self) -> crate::Result<Vec<BufferKind>> {
        let mut dev = self.dev();
        let buffers = dev.session.shell().buffers().clone();
        let written = dev.project.save_buffers(&buffers)?;
        for &kind in &written {
            dev.written.insert(kind, buffers.get(kind).to_string());
        }
        Ok(written)
    }

    /// Re-read a changed project file into its buffer. Reading back exactly
    /// what this server last wrote is not a change.
    fn apply_disk_change(&self, path: &Path) {
        let changed = {
            let mut dev = self.dev();
            let Some(kind) = dev.project.kind_for_path(path) else {
                return;
            };
            let text = match dev.project.read(kind) {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "cannot reload changed file");
                    return;
                }
            };
            if dev.written.get(&kind).is_some_and(|own| *own == text) {
                debug!(buffer = %kind, "ignoring own write");
                return;
            }
            dev.written.remove(&kind);
            let changed = dev.session.edit(kind, &text, now());
            if changed {
                dev.disk_rev += 1;
                info!(buffer = %kind, "reloaded from disk");
            }
            changed
        };
        if changed {
            self.wake.notify_one();
            self.publish();
        }
    }
}

/// Load `project` and build the server state around it.
pub fn build_state(project: Project) -> crate::Result<AppState> {
    let config = project.config().clone();
    let buffers = project.load_buffers()?;
    let layout_store = project.layout_store();
    let shell = EditorShell::new(buffers)
        .with_auto_run(config.auto_run)
        .with_debounce(config.debounce());
    let session = PreviewSession::new(
        shell,
        DocumentSurface::new(config.max_document_bytes),
        layout_store.load(),
    );
    let dev = DevState {
        project,
        session,
        layout_store,
        rev: 0,
        disk_rev: 0,
        edit_seq: EditSeq::default(),
        written: HashMap::new(),
        shim: RuntimeShim::new(),
        shim_token: RenderToken::default(),
    };
    let (published, _) = watch::channel(dev.published());
    Ok(AppState {
        dev: Arc::new(Mutex::new(dev)),
        published: Arc::new(published),
        wake: Arc::new(Notify::new()),
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_shell))
        .route("/preview", get(serve_preview))
        .route("/thumbnail", get(serve_thumbnail))
        .route("/state", get(serve_state))
        .route("/buffers", get(serve_buffers))
        .route("/edit", post(serve_edit))
        .route("/run", post(serve_run))
        .route("/refresh", post(serve_refresh))
        .route("/retry", post(serve_retry))
        .route("/auto-run", post(serve_auto_run))
        .route("/relay", post(serve_relay))
        .route("/relay/dismiss", post(serve_relay_dismiss))
        .route("/intercept", post(serve_intercept))
        .route("/layout", get(serve_layout).post(serve_set_layout))
        .route("/drag/begin", post(serve_drag_begin))
        .route("/drag/move", post(serve_drag_move))
        .route("/drag/end", post(serve_drag_end))
        .route("/drag/cancel", post(serve_drag_cancel))
        .route("/save", post(serve_save))
        .with_state(state)
}

/// Start the dev server for a project directory.
pub async fn run_dev_server(project: Project) -> anyhow::Result<()> {
    let root = project.root().to_path_buf();
    let port = project.config().port;
    let state = build_state(project)?;

    let (tx, rx) = mpsc::unbounded_channel::<PathBuf>();
    let watcher = watch_project(&root, tx)?;

    tokio::spawn(watch_loop(state.clone(), rx));
    tokio::spawn(debounce_loop(state.clone()));

    let app = router(state);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    eprintln!("livepen dev server");
    eprintln!("  project:    {}", root.display());
    eprintln!("  editor:     http://localhost:{port}/");
    eprintln!("  preview:    http://localhost:{port}/preview");
    eprintln!("  thumbnail:  http://localhost:{port}/thumbnail");
    eprintln!("  watching for changes...");
    info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    // Keep watcher alive
    drop(watcher);
    Ok(())
}

/// Watch the project directory, forwarding changed paths to `tx`.
fn watch_project(
    root: &Path,
    tx: mpsc::UnboundedSender<PathBuf>,
) -> crate::Result<notify::RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
            for path in event.paths {
                let _ = tx.send(path);
            }
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "file watcher error"),
    })?;
    watcher.watch(root, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

// ── Background tasks ─────────────────────────────────────────────────

/// Sleeps until the shell's auto-run deadline; every edit wakes it to pick
/// up the re-armed deadline.
async fn debounce_loop(state: AppState) {
    loop {
        let deadline = state.dev().session.shell().deadline();
        match deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {
                        let committed = state.dev().session.poll(now());
                        if let Some(token) = committed {
                            debug!(%token, "auto-run commit");
                            state.publish();
                        }
                    }
                    _ = state.wake.notified() => {}
                }
            }
            None => state.wake.notified().await,
        }
    }
}

async fn watch_loop(state: AppState, mut rx: mpsc::UnboundedReceiver<PathBuf>) {
    while let Some(path) = rx.recv().await {
        state.apply_disk_change(&path);
    }
}

// ── Shared response types ────────────────────────────────────────────

#[derive(Serialize)]
struct ActionResponse {
    ok: bool,
    error: Option<String>,
    token: Option<RenderToken>,
}

impl ActionResponse {
    fn ok(token: Option<RenderToken>) -> Json<Self> {
        Json(Self {
            ok: true,
            error: None,
            token,
        })
    }

    fn err(error: impl std::fmt::Display) -> Json<Self> {
        Json(Self {
            ok: false,
            error: Some(error.to_string()),
            token: None,
        })
    }
}

fn sandboxed_document(mode: RenderMode, html: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_SECURITY_POLICY, format!("sandbox {}", mode.sandbox_attr())),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        html,
    )
        .into_response()
}

// ── Pages and documents ──────────────────────────────────────────────

/// Serve the editor shell.
async fn serve_shell(State(state): State<AppState>) -> Html<String> {
    // Read under one lock so the page's edit sequence matches its buffers.
    let (name, buffers, layout, published) = {
        let dev = state.dev();
        (
            dev.project.name(),
            dev.session.shell().buffers().clone(),
            *dev.session.layout().layout(),
            dev.published(),
        )
    };
    Html(page::build_shell_page(&name, &buffers, &layout, &published))
}

/// Serve the mounted interactive document. The `token` query parameter only
/// defeats caching.
async fn serve_preview(State(state): State<AppState>) -> Response {
    let (document, view) = {
        let dev = state.dev();
        let host = dev.session.host();
        (
            host.surface().document().map(|(_, html)| html.to_string()),
            host.view().clone(),
        )
    };
    match document {
        Some(html) => sandboxed_document(RenderMode::Interactive, html),
        None => {
            let message = match view {
                HostView::Failed { message, .. } => message,
                _ => "nothing mounted".to_string(),
            };
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Html(page::build_failed_page(&message)),
            )
                .into_response()
        }
    }
}

/// Serve the committed snapshot as a static passive document.
async fn serve_thumbnail(State(state): State<AppState>) -> Response {
    let snapshot = state.dev().session.shell().committed().clone();
    let document = assemble_with(&snapshot, RenderMode::Passive);
    sandboxed_document(RenderMode::Passive, document.into_string())
}

// ── GET /state: long-poll ────────────────────────────────────────────

#[derive(Deserialize)]
struct StateQuery {
    rev: Option<u64>,
}

async fn serve_state(
    State(state): State<AppState>,
    Query(query): Query<StateQuery>,
) -> Json<PublishedState> {
    let mut rx = state.published.subscribe();
    if let Some(rev) = query.rev {
        let seen = rx.borrow_and_update().rev;
        if seen == rev {
            let _ = tokio::time::timeout(LONG_POLL, rx.changed()).await;
        }
    }
    let current = rx.borrow().clone();
    Json(current)
}

async fn serve_buffers(State(state): State<AppState>) -> Json<crate::SourceBuffers> {
    Json(state.dev().session.shell().buffers().clone())
}

// ── Editing and commits ──────────────────────────────────────────────

#[derive(Deserialize)]
struct EditRequest {
    buffer: String,
    text: String,
    /// Per-buffer counter, incremented by the editor on every input.
    seq: Option<u64>,
}

async fn serve_edit(
    State(state): State<AppState>,
    Json(req): Json<EditRequest>,
) -> Json<ActionResponse> {
    let kind: BufferKind = match req.buffer.parse() {
        Ok(kind) => kind,
        Err(e) => return ActionResponse::err(e),
    };
    state.apply_edit(kind, &req.text, req.seq);
    ActionResponse::ok(None)
}

async fn serve_run(State(state): State<AppState>) -> Json<ActionResponse> {
    let token = state.dev().session.run();
    state.wake.notify_one();
    state.publish();
    ActionResponse::ok(Some(token))
}

async fn serve_refresh(State(state): State<AppState>) -> Json<ActionResponse> {
    let token = state.dev().session.refresh();
    state.wake.notify_one();
    state.publish();
    ActionResponse::ok(Some(token))
}

async fn serve_retry(State(state): State<AppState>) -> Json<ActionResponse> {
    let view = state.dev().session.retry().clone();
    state.publish();
    match view {
        HostView::Failed { message, .. } => ActionResponse::err(message),
        HostView::Live { token } => ActionResponse::ok(Some(token)),
        HostView::Empty => ActionResponse::ok(None),
    }
}

#[derive(Deserialize)]
struct AutoRunRequest {
    enabled: bool,
}

async fn serve_auto_run(
    State(state): State<AppState>,
    Json(req): Json<AutoRunRequest>,
) -> Json<ActionResponse> {
    state.dev().session.set_auto_run(req.enabled);
    state.wake.notify_one();
    state.publish();
    ActionResponse::ok(None)
}

// ── Relay ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RelayResponse {
    action: &'static str,
    url: Option<String>,
}

impl RelayResponse {
    fn ignored() -> Self {
        Self {
            action: "ignored",
            url: None,
        }
    }
}

impl AppState {
    /// Carry out a relay action on the server side and describe it for the
    /// browser.
    fn relay_response(&self, action: RelayAction) -> RelayResponse {
        match action {
            RelayAction::ShowError(_) => {
                self.publish();
                RelayResponse {
                    action: "show-error",
                    url: None,
                }
            }
            RelayAction::OpenInNewTab(url) => RelayResponse {
                action: "open-in-new-tab",
                url: Some(url),
            },
            RelayAction::Ignored => RelayResponse::ignored(),
        }
    }
}

async fn serve_relay(
    State(state): State<AppState>,
    Json(raw): Json<serde_json::Value>,
) -> Json<RelayResponse> {
    let Some(message) = InboundMessage::from_value(raw) else {
        return Json(RelayResponse::ignored());
    };
    let action = state.dev().session.receive(message);
    Json(state.relay_response(action))
}

async fn serve_relay_dismiss(State(state): State<AppState>) -> Json<ActionResponse> {
    state.dev().session.dismiss_error();
    state.publish();
    ActionResponse::ok(None)
}

// ── POST /intercept: decisions for the runtime shim ─────────────────

#[derive(Deserialize)]
struct InterceptRequest {
    /// Token of the frame the event came from.
    token: RenderToken,
    event: InterceptEvent,
}

#[derive(Serialize)]
struct InterceptResponse {
    prevent_default: bool,
    notice: Option<&'static str>,
    #[serde(flatten)]
    relay: RelayResponse,
}

async fn serve_intercept(
    State(state): State<AppState>,
    Json(req): Json<InterceptRequest>,
) -> Json<InterceptResponse> {
    let (outcome, action) = {
        let mut dev = state.dev();
        let mounted =
            matches!(dev.session.host().view(), HostView::Live { token } if *token == req.token);
        if !mounted {
            debug!(token = %req.token, "event from a frame that is no longer mounted");
            return Json(InterceptResponse {
                prevent_default: true,
                notice: None,
                relay: RelayResponse::ignored(),
            });
        }
        if dev.shim_token != req.token {
            dev.shim = RuntimeShim::new();
            dev.shim_token = req.token;
        }
        let outcome = dev.shim.intercept(&req.event, now());
        let action = match outcome.message.clone() {
            Some(message) => dev.session.receive(message),
            None => RelayAction::Ignored,
        };
        (outcome, action)
    };
    Json(InterceptResponse {
        prevent_default: outcome.prevent_default,
        notice: outcome.notice,
        relay: state.relay_response(action),
    })
}

// ── Layout ───────────────────────────────────────────────────────────

async fn serve_layout(State(state): State<AppState>) -> Json<PaneLayout> {
    Json(*state.dev().session.layout().layout())
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutRequest {
    editor_panel_size: Option<f64>,
    arrangement: Option<Arrangement>,
    code_panel_hidden: Option<bool>,
}

async fn serve_set_layout(
    State(state): State<AppState>,
    Json(req): Json<LayoutRequest>,
) -> Json<ActionResponse> {
    let mut dev = state.dev();
    let engine = dev.session.layout_mut();
    if let Some(arrangement) = req.arrangement {
        engine.set_arrangement(arrangement);
    }
    if let Some(hidden) = req.code_panel_hidden {
        if engine.layout().code_panel_hidden != hidden {
            engine.toggle_code_panel();
        }
    }
    let Some(size) = req.editor_panel_size else {
        return ActionResponse::ok(None);
    };
    engine.set_editor_panel_size(size);
    let layout = *engine.layout();
    match dev.layout_store.save(&layout) {
        Ok(()) => ActionResponse::ok(None),
        Err(e) => {
            warn!(error = %e, "cannot persist layout");
            ActionResponse::err(e)
        }
    }
}

// ── Divider drags ────────────────────────────────────────────────────
//
// The browser reports pointer positions, at most one move per animation
// frame; the layout engine owns the drag and answers with the layout to
// apply.

#[derive(Deserialize)]
struct DragBeginRequest {
    handle: SplitHandle,
    origin: Point,
    container: Size,
}

#[derive(Deserialize)]
struct DragPointerRequest {
    #[serde(default)]
    pointer: Option<Point>,
}

#[derive(Serialize)]
struct DragResponse {
    active: bool,
    layout: PaneLayout,
}

async fn serve_drag_begin(
    State(state): State<AppState>,
    Json(req): Json<DragBeginRequest>,
) -> Json<DragResponse> {
    let mut dev = state.dev();
    let engine = dev.session.layout_mut();
    let active = engine.begin_drag(req.handle, req.origin, req.container);
    Json(DragResponse {
        active,
        layout: *engine.layout(),
    })
}

async fn serve_drag_move(
    State(state): State<AppState>,
    Json(req): Json<DragPointerRequest>,
) -> Json<DragResponse> {
    let mut dev = state.dev();
    let engine = dev.session.layout_mut();
    if let Some(pointer) = req.pointer {
        engine.drag_to(pointer);
    }
    engine.flush_frame();
    Json(DragResponse {
        active: engine.overlay_visible(),
        layout: *engine.layout(),
    })
}

async fn serve_drag_end(
    State(state): State<AppState>,
    Json(req): Json<DragPointerRequest>,
) -> Json<DragResponse> {
    let mut dev = state.dev();
    let engine = dev.session.layout_mut();
    if let Some(pointer) = req.pointer {
        engine.drag_to(pointer);
    }
    let persist = engine.end_drag();
    let layout = *engine.layout();
    if persist {
        if let Err(e) = dev.layout_store.save(&layout) {
            warn!(error = %e, "cannot persist layout");
        }
    }
    Json(DragResponse {
        active: false,
        layout,
    })
}

async fn serve_drag_cancel(State(state): State<AppState>) -> Json<DragResponse> {
    let mut dev = state.dev();
    let engine = dev.session.layout_mut();
    engine.cancel_drag();
    Json(DragResponse {
        active: false,
        layout: *engine.layout(),
    })
}

// ── POST /save: write buffers to disk ────────────────────────────────

async fn serve_save(State(state): State<AppState>) -> Json<ActionResponse> {
    match state.save() {
        Ok(_) => ActionResponse::ok(None),
        Err(e) => ActionResponse::err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::config::PlaygroundConfig;

    struct TempDir(PathBuf);

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn project(name: &str, auto_run: bool) -> (TempDir, Project) {
        let dir = std::env::temp_dir().join(format!("livepen-server-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), "<p>start</p>").unwrap();
        std::fs::write(dir.join("style.css"), "").unwrap();
        std::fs::write(dir.join("script.js"), "").unwrap();
        let config = PlaygroundConfig {
            auto_run,
            ..PlaygroundConfig::default()
        };
        let project = Project::with_config(&dir, config);
        (TempDir(dir), project)
    }

    async fn edit(app: &Router, text: &str) {
        let body = json!({ "buffer": "markup", "text": text }).to_string();
        let response = app
            .clone()
            .oneshot(
                Request::post("/edit")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    /// Let the spawned debounce task observe wake-ups and fired timers.
    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_loop_commits_once_after_typing_burst() {
        let (_dir, project) = project("debounce", true);
        let debounce = project.config().debounce();
        let state = build_state(project).unwrap();
        tokio::spawn(debounce_loop(state.clone()));
        let app = router(state.clone());

        for (i, text) in ["<p>a</p>", "<p>ab</p>", "<p>abc</p>"].into_iter().enumerate() {
            if i > 0 {
                tokio::time::advance(Duration::from_millis(100)).await;
            }
            edit(&app, text).await;
            settle().await;
        }
        assert!(state.current().pending);
        assert_eq!(state.current().token, RenderToken::new(1));

        tokio::time::advance(debounce - Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(state.current().token, RenderToken::new(1));

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        let published = state.current();
        assert_eq!(published.token, RenderToken::new(2));
        assert!(!published.pending);
        assert!(!published.dirty);

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(state.current().token, RenderToken::new(2));

        let dev = state.dev();
        let (token, html) = dev.session.host().surface().document().unwrap();
        assert_eq!(token, RenderToken::new(2));
        assert!(html.contains("<p>abc</p>"));
    }

    #[test]
    fn own_save_is_not_read_back_by_the_watcher() {
        let (dir, project) = project("selfwrite", false);
        let markup = dir.0.join("index.html");
        let state = build_state(project).unwrap();

        assert!(state.apply_edit(BufferKind::Markup, "A", None));
        assert_eq!(state.save().unwrap(), vec![BufferKind::Markup]);
        assert!(state.apply_edit(BufferKind::Markup, "AB", None));

        // The watcher reports the save after the newer edit landed.
        state.apply_disk_change(&markup);
        assert_eq!(state.dev().session.shell().buffers().get(BufferKind::Markup), "AB");
        assert_eq!(state.current().disk_rev, 0);

        std::fs::write(&markup, "X").unwrap();
        state.apply_disk_change(&markup);
        assert_eq!(state.dev().session.shell().buffers().get(BufferKind::Markup), "X");
        assert_eq!(state.current().disk_rev, 1);
    }

    #[test]
    fn late_edit_with_lower_seq_is_dropped() {
        let (_dir, project) = project("seq", false);
        let state = build_state(project).unwrap();

        assert!(state.apply_edit(BufferKind::Script, "abc", Some(3)));
        assert!(!state.apply_edit(BufferKind::Script, "ab", Some(2)));
        assert!(!state.apply_edit(BufferKind::Script, "abcd", Some(3)));
        // Sequences are per buffer.
        assert!(state.apply_edit(BufferKind::Styles, "p {}", Some(1)));
        assert_eq!(state.dev().session.shell().buffers().get(BufferKind::Script), "abc");
        assert_eq!(state.current().edit_seq.script, 3);
        assert_eq!(state.current().edit_seq.styles, 1);
    }
}
