use std::path::PathBuf;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use livepen::server::{build_state, router};
use livepen::{PlaygroundConfig, Project};

struct TempProject {
    dir: PathBuf,
}

impl TempProject {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "livepen-routes-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("index.html"),
            r#"<link rel="stylesheet" href="style.css"><h1 id="top">Hello</h1>"#,
        )
        .unwrap();
        std::fs::write(dir.join("style.css"), "h1 { color: teal; }").unwrap();
        std::fs::write(dir.join("script.js"), "console.log('ready');").unwrap();
        Self { dir }
    }

    fn app(&self, config: PlaygroundConfig) -> Router {
        let project = Project::with_config(&self.dir, config);
        router(build_state(project).unwrap())
    }
}

impl Drop for TempProject {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn manual_config() -> PlaygroundConfig {
    PlaygroundConfig {
        auto_run: false,
        ..PlaygroundConfig::default()
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, header::HeaderMap, String) {
    let response = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post(app: &Router, uri: &str, body: Value) -> Value {
    let response = app
        .clone()
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "POST {uri}");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn state(app: &Router) -> Value {
    let (status, _, body) = get(app, "/state").await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_str(&body).unwrap()
}

#[tokio::test]
async fn shell_embeds_sandboxed_frame() {
    let project = TempProject::new("shell");
    let app = project.app(manual_config());

    let (status, _, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"sandbox="allow-scripts allow-modals""#));
    assert!(!body.contains("allow-same-origin"));
    assert!(body.contains(r#"id="editor-markup""#));
}

#[tokio::test]
async fn preview_is_sanitized_and_carries_sandbox_policy() {
    let project = TempProject::new("preview");
    let app = project.app(manual_config());

    let (status, headers, body) = get(&app, "/preview?token=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_SECURITY_POLICY],
        "sandbox allow-scripts allow-modals"
    );
    assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    assert!(body.contains(r#"<h1 id="top">Hello</h1>"#));
    assert!(!body.contains(r#"href="style.css""#));
    assert!(body.contains("h1 { color: teal; }"));
}

#[tokio::test]
async fn thumbnail_is_passive() {
    let project = TempProject::new("thumb");
    let app = project.app(manual_config());

    let (status, headers, body) = get(&app, "/thumbnail").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_SECURITY_POLICY], "sandbox allow-scripts");
    assert!(body.contains("animation-duration: 0s !important"));
}

#[tokio::test]
async fn edits_wait_for_explicit_run() {
    let project = TempProject::new("run");
    let app = project.app(manual_config());

    let resp = post(&app, "/edit", json!({ "buffer": "markup", "text": "<p>Changed</p>" })).await;
    assert_eq!(resp["ok"], true);

    let s = state(&app).await;
    assert_eq!(s["token"], 1);
    assert_eq!(s["dirty"], true);
    let (_, _, body) = get(&app, "/preview").await;
    assert!(body.contains("Hello"));

    let resp = post(&app, "/run", json!({})).await;
    assert_eq!(resp["token"], 2);
    let s = state(&app).await;
    assert_eq!(s["view"], json!({ "status": "live", "token": 2 }));
    assert_eq!(s["dirty"], false);
    let (_, _, body) = get(&app, "/preview").await;
    assert!(body.contains("<p>Changed</p>"));

    let (_, _, buffers) = get(&app, "/buffers").await;
    let buffers: Value = serde_json::from_str(&buffers).unwrap();
    assert_eq!(buffers["markup"], "<p>Changed</p>");
}

#[tokio::test]
async fn refresh_bumps_token_without_edits() {
    let project = TempProject::new("refresh");
    let app = project.app(manual_config());

    let resp = post(&app, "/refresh", json!({})).await;
    assert_eq!(resp["token"], 2);
    assert_eq!(state(&app).await["token"], 2);
}

#[tokio::test]
async fn unknown_buffer_is_rejected() {
    let project = TempProject::new("badbuf");
    let app = project.app(manual_config());

    let resp = post(&app, "/edit", json!({ "buffer": "python", "text": "" })).await;
    assert_eq!(resp["ok"], false);
    assert!(resp["error"].as_str().is_some());
}

#[tokio::test]
async fn relay_shows_error_until_next_edit() {
    let project = TempProject::new("relay");
    let app = project.app(manual_config());

    let resp = post(
        &app,
        "/relay",
        json!({ "type": "preview-error", "message": "ReferenceError: x is not defined" }),
    )
    .await;
    assert_eq!(resp["action"], "show-error");
    assert_eq!(state(&app).await["error"], "ReferenceError: x is not defined");

    post(&app, "/edit", json!({ "buffer": "script", "text": "let x = 1;" })).await;
    assert_eq!(state(&app).await["error"], Value::Null);
}

#[tokio::test]
async fn relay_dismiss_clears_banner() {
    let project = TempProject::new("dismiss");
    let app = project.app(manual_config());

    post(&app, "/relay", json!({ "type": "preview-error", "message": "boom" })).await;
    post(&app, "/relay/dismiss", json!({})).await;
    assert_eq!(state(&app).await["error"], Value::Null);
}

#[tokio::test]
async fn relay_filters_urls_and_unknown_messages() {
    let project = TempProject::new("urls");
    let app = project.app(manual_config());

    let resp = post(
        &app,
        "/relay",
        json!({ "type": "preview-open-url", "url": "https://example.com/docs" }),
    )
    .await;
    assert_eq!(resp["action"], "open-in-new-tab");
    assert_eq!(resp["url"], "https://example.com/docs");

    let resp = post(
        &app,
        "/relay",
        json!({ "type": "preview-open-url", "url": "javascript:alert(1)" }),
    )
    .await;
    assert_eq!(resp["action"], "ignored");

    let resp = post(&app, "/relay", json!({ "type": "navigate", "to": "/" })).await;
    assert_eq!(resp["action"], "ignored");
    assert_eq!(state(&app).await["error"], Value::Null);
}

#[tokio::test]
async fn oversized_document_fails_and_retry_reports() {
    let project = TempProject::new("fail");
    let config = PlaygroundConfig {
        max_document_bytes: 64,
        ..manual_config()
    };
    let app = project.app(config);

    let s = state(&app).await;
    assert_eq!(s["view"]["status"], "failed");

    let (status, _, body) = get(&app, "/preview").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("Preview Failed"));

    let resp = post(&app, "/retry", json!({})).await;
    assert_eq!(resp["ok"], false);
    assert_eq!(state(&app).await["token"], 1);

    // A failed mount has no live document, so the relay is not listening.
    let resp = post(&app, "/relay", json!({ "type": "preview-error", "message": "late" })).await;
    assert_eq!(resp["action"], "ignored");
}

#[tokio::test]
async fn layout_clamps_and_persists_panel_size() {
    let project = TempProject::new("layout");
    let app = project.app(manual_config());

    let resp = post(&app, "/layout", json!({ "editor_panel_size": 95.0 })).await;
    assert_eq!(resp["ok"], true);

    let (_, _, body) = get(&app, "/layout").await;
    let layout: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(layout["editor_panel_size"], 80.0);

    let saved = std::fs::read_to_string(project.dir.join(".livepen/layout.json")).unwrap();
    assert!(saved.contains("80"));

    // A fresh server picks the persisted size back up.
    let app = project.app(manual_config());
    let (_, _, body) = get(&app, "/layout").await;
    let layout: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(layout["editor_panel_size"], 80.0);
}

#[tokio::test]
async fn arrangement_change_is_not_persisted() {
    let project = TempProject::new("arrange");
    let app = project.app(manual_config());

    post(&app, "/layout", json!({ "arrangement": "bottom" })).await;
    let (_, _, body) = get(&app, "/layout").await;
    let layout: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(layout["arrangement"], "bottom");
    assert!(!project.dir.join(".livepen/layout.json").exists());
}

#[tokio::test]
async fn save_writes_buffers_to_disk() {
    let project = TempProject::new("save");
    let app = project.app(manual_config());

    post(&app, "/edit", json!({ "buffer": "styles", "text": "body { margin: 0; }" })).await;
    let resp = post(&app, "/save", json!({})).await;
    assert_eq!(resp["ok"], true);
    assert_eq!(
        std::fs::read_to_string(project.dir.join("style.css")).unwrap(),
        "body { margin: 0; }"
    );
}

#[tokio::test]
async fn state_long_poll_returns_immediately_for_stale_rev() {
    let project = TempProject::new("poll");
    let app = project.app(manual_config());

    let rev = state(&app).await["rev"].as_u64().unwrap();
    post(&app, "/run", json!({})).await;
    let (status, _, body) = get(&app, &format!("/state?rev={rev}")).await;
    assert_eq!(status, StatusCode::OK);
    let s: Value = serde_json::from_str(&body).unwrap();
    assert!(s["rev"].as_u64().unwrap() > rev);
}

#[tokio::test]
async fn out_of_order_edit_is_not_saved() {
    let project = TempProject::new("order");
    let app = project.app(manual_config());

    post(&app, "/edit", json!({ "buffer": "markup", "text": "<p>abc</p>", "seq": 2 })).await;
    post(&app, "/edit", json!({ "buffer": "markup", "text": "<p>ab</p>", "seq": 1 })).await;
    post(&app, "/run", json!({})).await;
    let resp = post(&app, "/save", json!({})).await;
    assert_eq!(resp["ok"], true);

    assert_eq!(
        std::fs::read_to_string(project.dir.join("index.html")).unwrap(),
        "<p>abc</p>"
    );
    let (_, _, body) = get(&app, "/preview").await;
    assert!(body.contains("<p>abc</p>"));
    assert_eq!(state(&app).await["edit_seq"]["markup"], 2);
}

#[tokio::test]
async fn shell_page_resumes_edit_sequence() {
    let project = TempProject::new("resume");
    let app = project.app(manual_config());

    post(&app, "/edit", json!({ "buffer": "styles", "text": "p {}", "seq": 7 })).await;
    let (_, _, body) = get(&app, "/").await;
    assert!(body.contains(r#""edit_seq":{"markup":0,"styles":7,"script":0}"#));
}

#[tokio::test]
async fn intercepted_links_get_one_decision_each() {
    let project = TempProject::new("intercept");
    let app = project.app(manual_config());

    let d = post(
        &app,
        "/intercept",
        json!({ "token": 1, "event": { "kind": "link", "href": "#" } }),
    )
    .await;
    assert_eq!(d["prevent_default"], true);
    assert_eq!(d["notice"], "This link isn't connected yet");
    assert_eq!(d["action"], "ignored");

    let d = post(
        &app,
        "/intercept",
        json!({ "token": 1, "event": { "kind": "link", "href": "https://example.com/" } }),
    )
    .await;
    assert_eq!(d["prevent_default"], true);
    assert_eq!(d["action"], "open-in-new-tab");
    assert_eq!(d["url"], "https://example.com/");

    let d = post(
        &app,
        "/intercept",
        json!({ "token": 1, "event": { "kind": "link", "href": "#top", "anchor": true } }),
    )
    .await;
    assert_eq!(d["prevent_default"], false);
    assert_eq!(d["notice"], Value::Null);

    let d = post(
        &app,
        "/intercept",
        json!({ "token": 1, "event": { "kind": "navigate", "url": "http://localhost/page.html" } }),
    )
    .await;
    assert_eq!(d["prevent_default"], true);
    assert_eq!(d["notice"], "Navigation is disabled in the preview.");
}

#[tokio::test]
async fn intercepted_errors_reach_banner_unless_noise() {
    let project = TempProject::new("intercept-err");
    let app = project.app(manual_config());

    let d = post(
        &app,
        "/intercept",
        json!({ "token": 1, "event": { "kind": "error", "message": "Script error." } }),
    )
    .await;
    assert_eq!(d["action"], "ignored");
    assert_eq!(state(&app).await["error"], Value::Null);

    let d = post(
        &app,
        "/intercept",
        json!({ "token": 1, "event": { "kind": "rejection", "reason": "Error: nope" } }),
    )
    .await;
    assert_eq!(d["action"], "show-error");
    assert_eq!(state(&app).await["error"], "Error: nope");

    // Events from a frame that has been replaced are dropped.
    post(&app, "/refresh", json!({})).await;
    let d = post(
        &app,
        "/intercept",
        json!({ "token": 1, "event": { "kind": "error", "message": "late" } }),
    )
    .await;
    assert_eq!(d["action"], "ignored");
    assert_eq!(d["notice"], Value::Null);
}

#[tokio::test]
async fn divider_drag_runs_on_the_server() {
    let project = TempProject::new("drag");
    let app = project.app(manual_config());

    let r = post(
        &app,
        "/drag/begin",
        json!({
            "handle": { "kind": "main" },
            "origin": { "x": 500.0, "y": 300.0 },
            "container": { "width": 1000.0, "height": 600.0 }
        }),
    )
    .await;
    assert_eq!(r["active"], true);

    let r = post(&app, "/drag/move", json!({ "pointer": { "x": 600.0, "y": 300.0 } })).await;
    assert_eq!(r["layout"]["editor_panel_size"], 60.0);
    let r = post(&app, "/drag/move", json!({ "pointer": { "x": 990.0, "y": 300.0 } })).await;
    assert_eq!(r["layout"]["editor_panel_size"], 80.0);

    let r = post(&app, "/drag/end", json!({ "pointer": { "x": 650.0, "y": 300.0 } })).await;
    assert_eq!(r["active"], false);
    assert_eq!(r["layout"]["editor_panel_size"], 65.0);
    let saved = std::fs::read_to_string(project.dir.join(".livepen/layout.json")).unwrap();
    assert!(saved.contains("65"));

    // Moves after the drag ended change nothing.
    let r = post(&app, "/drag/move", json!({ "pointer": { "x": 100.0, "y": 300.0 } })).await;
    assert_eq!(r["active"], false);
    assert_eq!(r["layout"]["editor_panel_size"], 65.0);
}

#[tokio::test]
async fn editor_drag_can_be_cancelled() {
    let project = TempProject::new("drag-cancel");
    let app = project.app(manual_config());

    let r = post(
        &app,
        "/drag/begin",
        json!({
            "handle": { "kind": "editor", "index": 0 },
            "origin": { "x": 0.0, "y": 0.0 },
            "container": { "width": 400.0, "height": 800.0 }
        }),
    )
    .await;
    assert_eq!(r["active"], true);
    let r = post(&app, "/drag/move", json!({ "pointer": { "x": 0.0, "y": -800.0 } })).await;
    assert_eq!(r["layout"]["editor_splits"][0], 10.0);

    let r = post(&app, "/drag/cancel", json!({})).await;
    assert_eq!(r["layout"]["editor_splits"], json!([33.0, 33.0, 34.0]));
    assert!(!project.dir.join(".livepen/layout.json").exists());

    post(&app, "/layout", json!({ "arrangement": "hidden" })).await;
    let r = post(
        &app,
        "/drag/begin",
        json!({
            "handle": { "kind": "main" },
            "origin": { "x": 0.0, "y": 0.0 },
            "container": { "width": 400.0, "height": 800.0 }
        }),
    )
    .await;
    assert_eq!(r["active"], false);
}
