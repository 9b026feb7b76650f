use super::css::build_css;
use super::inline_js::build_inline_js;
use super::panels::{build_editor_panes, build_preview_panel};
use super::toolbar::{arrangement_attr, build_toolbar};
use super::util::html_escape;
use super::PublishedState;
use crate::layout::PaneLayout;
use crate::render_host::FAILED_TITLE;
use crate::snapshot::SourceBuffers;

pub(super) fn build_shell_page(
    project_name: &str,
    buffers: &SourceBuffers,
    layout: &PaneLayout,
    state: &PublishedState,
) -> String {
    let css = build_css();
    let toolbar = build_toolbar(project_name, state.auto_run, layout);
    let editors = build_editor_panes(buffers, layout);
    let preview = build_preview_panel(&state.view, state.error.as_deref());
    let inline_js = build_inline_js(state, layout);
    let arrangement = arrangement_attr(layout);
    let code_hidden = if layout.code_panel_hidden {
        r#" class="code-hidden""#
    } else {
        ""
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>livepen — {title}</title>
<style>
{css}
</style>
</head>
<body data-arrangement="{arrangement}"{code_hidden}>
{toolbar}
<div class="workspace" id="workspace" style="--editor-size: {editor_size}%">
{editors}
<div class="split-main" id="split-main"></div>
{preview}
</div>
<div class="drag-overlay" id="drag-overlay" hidden></div>
{inline_js}
</body>
</html>"##,
        title = html_escape(project_name),
        editor_size = layout.editor_panel_size,
    )
}

/// Body of `/preview` when nothing could be mounted.
pub(super) fn build_failed_page(message: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{FAILED_TITLE}</title>
<style>
  html, body {{ height: 100%; margin: 0; background: #0A0A0A; color: #A0A0A0;
    font-family: 'JetBrains Mono', monospace; }}
  .box {{ max-width: 560px; margin: 80px auto; padding: 24px;
    border: 1px solid #3F1818; border-radius: 8px; }}
  h1 {{ font-size: 14px; color: #EF4444; margin: 0 0 12px; }}
  p {{ font-size: 12px; white-space: pre-wrap; word-break: break-word; }}
</style>
</head>
<body>
<div class="box">
  <h1>{FAILED_TITLE}</h1>
  <p>{message}</p>
</div>
</body>
</html>"##,
        message = html_escape(message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_host::HostView;
    use crate::snapshot::RenderToken;

    fn state(view: HostView) -> PublishedState {
        PublishedState {
            rev: 1,
            disk_rev: 0,
            token: RenderToken::new(1),
            view,
            error: None,
            auto_run: false,
            pending: false,
            dirty: false,
            sandbox: "allow-scripts allow-modals".into(),
            edit_seq: Default::default(),
        }
    }

    #[test]
    fn shell_page_contains_sandboxed_frame_and_editors() {
        let buffers = SourceBuffers::new("<p>a</p>", "p{}", "go()");
        let html = build_shell_page(
            "demo",
            &buffers,
            &PaneLayout::default(),
            &state(HostView::Live {
                token: RenderToken::new(1),
            }),
        );
        assert!(html.contains(r#"sandbox="allow-scripts allow-modals""#));
        assert!(!html.contains("allow-same-origin"));
        assert!(html.contains(r#"data-render-token="1""#));
        assert!(html.contains("&lt;p&gt;a&lt;/p&gt;</textarea>"));
        assert!(html.contains(r#"id="auto-run">"#));
        assert!(html.contains(r#"<body data-arrangement="left">"#));
    }

    #[test]
    fn shell_page_shows_failure_fallback() {
        let html = build_shell_page(
            "demo",
            &SourceBuffers::default(),
            &PaneLayout::default(),
            &state(HostView::Failed {
                token: RenderToken::new(1),
                message: "too big".into(),
            }),
        );
        assert!(html.contains(r#"<div class="preview-failed" id="preview-failed">"#));
        assert!(html.contains("Preview Failed"));
        assert!(html.contains("too big"));
        assert!(!html.contains("<iframe"));
    }
}
