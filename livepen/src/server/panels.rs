use super::util::html_escape;
use crate::layout::PaneLayout;
use crate::render_host::{frame_markup, HostView, RenderMode, FAILED_TITLE};
use crate::snapshot::{BufferKind, SourceBuffers};

/// The three editor panes with the two dividers between them.
pub(super) fn build_editor_panes(buffers: &SourceBuffers, layout: &PaneLayout) -> String {
    let mut html = String::from(r#"<div class="editors" id="editors">"#);
    for (i, kind) in BufferKind::ALL.into_iter().enumerate() {
        if i > 0 {
            html.push_str(&format!(
                r#"<div class="split-editor" data-index="{}"></div>"#,
                i - 1
            ));
        }
        html.push_str(&format!(
            r#"
  <div class="editor-pane" data-buffer="{name}" style="flex: 0 0 {size}%">
    <div class="panel-label">{label}</div>
    <textarea id="editor-{name}" data-buffer="{name}" spellcheck="false" autocomplete="off">{text}</textarea>
  </div>"#,
            name = kind.as_str(),
            label = kind.label(),
            size = layout.editor_splits[i],
            text = html_escape(buffers.get(kind)),
        ));
    }
    html.push_str("\n</div>");
    html
}

/// Preview region: the frame for the live token, the failure fallback and
/// the error banner.
pub(super) fn build_preview_panel(view: &HostView, error: Option<&str>) -> String {
    let frame = match view {
        HostView::Live { token } => {
            frame_markup(*token, RenderMode::Interactive, &format!("/preview?token={token}"))
        }
        _ => String::new(),
    };
    let (failed_hidden, failed_message) = match view {
        HostView::Failed { message, .. } => ("", html_escape(message)),
        _ => (" hidden", String::new()),
    };
    let (banner_hidden, banner_message) = match error {
        Some(message) => ("", html_escape(message)),
        None => (" hidden", String::new()),
    };

    format!(
        r#"<div class="preview" id="preview">
  <div class="frame-host" id="frame-host" style="height:100%">{frame}</div>
  <div class="preview-failed" id="preview-failed"{failed_hidden}>
    <h2>{FAILED_TITLE}</h2>
    <p id="preview-failed-message">{failed_message}</p>
    <button id="retry-btn">Retry</button>
  </div>
  <div class="error-banner" id="error-banner" role="alert"{banner_hidden}>
    <span class="message" id="error-message">{banner_message}</span>
    <button id="error-dismiss" title="Dismiss">&times;</button>
  </div>
</div>"#
    )
}
