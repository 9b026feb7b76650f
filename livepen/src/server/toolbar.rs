use super::util::html_escape;
use crate::layout::{Arrangement, PaneLayout};

pub(super) fn build_toolbar(project_name: &str, auto_run: bool, layout: &PaneLayout) -> String {
    let checked = if auto_run { " checked" } else { "" };
    let options: String = [
        (Arrangement::Left, "Editor left"),
        (Arrangement::Right, "Editor right"),
        (Arrangement::Bottom, "Editor bottom"),
        (Arrangement::Hidden, "Preview only"),
    ]
    .iter()
    .map(|(arrangement, label)| {
        let value = arrangement_value(*arrangement);
        let selected = if *arrangement == layout.arrangement {
            " selected"
        } else {
            ""
        };
        format!(r#"<option value="{value}"{selected}>{label}</option>"#)
    })
    .collect();

    format!(
        r#"<div class="toolbar">
  <span class="label">livepen</span>
  <span class="sep">|</span>
  <span class="project">{project}</span>
  <span class="status" id="status"></span>
  <div class="actions">
    <button class="primary" id="run-btn" title="Run (Ctrl+Enter)">&#9654; Run</button>
    <label title="Refresh the preview automatically while typing"><input type="checkbox" id="auto-run"{checked}> Auto-run</label>
    <button id="refresh-btn" title="Reload the preview">Refresh</button>
    <button id="toggle-code" title="Show or hide the code panel">Code</button>
    <select id="arrangement" title="Layout">{options}</select>
    <button id="save-btn" title="Write buffers to disk (Ctrl+S)">Save</button>
    <a href="/preview" target="_blank" rel="noopener" title="Open the preview document">Open</a>
  </div>
</div>"#,
        project = html_escape(project_name),
    )
}

fn arrangement_value(arrangement: Arrangement) -> &'static str {
    match arrangement {
        Arrangement::Left => "left",
        Arrangement::Right => "right",
        Arrangement::Bottom => "bottom",
        Arrangement::Hidden => "hidden",
    }
}

pub(super) fn arrangement_attr(layout: &PaneLayout) -> &'static str {
    arrangement_value(layout.arrangement)
}
