//! Document assembler: turns a snapshot into one self-contained HTML page.

use std::sync::OnceLock;

use super::helpers::escape_closing_tag;
use super::shim::{shim_js, NOTICE_ELEMENT_ID, REPORT_FN};
use crate::render_host::RenderMode;
use crate::sanitize::sanitize;
use crate::snapshot::PreviewSnapshot;

/// A complete preview document, regenerated on every commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDocument {
    html: String,
    mode: RenderMode,
}

impl AssembledDocument {
    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_string(self) -> String {
        self.html
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.html.len()
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}

/// Assemble an interactive preview document from the three buffers.
pub fn assemble(markup: &str, styles: &str, script: &str) -> String {
    assemble_with(
        &PreviewSnapshot::new(markup, styles, script),
        RenderMode::Interactive,
    )
    .into_string()
}

/// Assemble `snapshot` for the given render mode.
///
/// Pure and deterministic: the same snapshot and mode always give the same
/// bytes.
pub fn assemble_with(snapshot: &PreviewSnapshot, mode: RenderMode) -> AssembledDocument {
    let runtime_css = if mode.capabilities().freeze_motion {
        format!("{}\n{}", notice_css(), FREEZE_CSS)
    } else {
        notice_css().to_string()
    };
    let styles = escape_closing_tag(snapshot.styles(), "style");
    let script = escape_closing_tag(snapshot.script(), "script");
    let markup = sanitize(snapshot.markup());

    let html = format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<style data-livepen="runtime">
{runtime_css}
</style>
<style>
{styles}
</style>
<script data-livepen="shim">
{shim}
</script>
</head>
<body>
{markup}
<script>
try {{
{script}
}} catch (e) {{
  window.{REPORT_FN}(e);
}}
</script>
</body>
</html>
"##,
        shim = shim_js(),
    );

    AssembledDocument { html, mode }
}

/// Notice element rules and their keyframes, built once per process.
fn notice_css() -> &'static str {
    static CSS: OnceLock<String> = OnceLock::new();
    CSS.get_or_init(|| {
        format!(
            r##"@keyframes livepen-notice-in {{
  from {{ opacity: 0; transform: translate(-50%, 8px); }}
  to {{ opacity: 1; transform: translate(-50%, 0); }}
}}
#{id} {{
  position: fixed;
  left: 50%;
  bottom: 16px;
  transform: translateX(-50%);
  max-width: calc(100% - 32px);
  padding: 8px 14px;
  border-radius: 6px;
  background: rgba(20, 20, 24, 0.92);
  color: #f4f4f5;
  font: 13px/1.4 system-ui, -apple-system, sans-serif;
  box-shadow: 0 4px 16px rgba(0, 0, 0, 0.3);
  pointer-events: none;
  z-index: 2147483647;
  display: none;
}}
#{id}.visible {{
  display: block;
  animation: livepen-notice-in 0.18s ease-out;
}}"##,
            id = NOTICE_ELEMENT_ID,
        )
    })
}

const FREEZE_CSS: &str = r##"*, *::before, *::after {
  animation-duration: 0s !important;
  animation-delay: 0s !important;
  animation-iteration-count: 1 !important;
  transition-duration: 0s !important;
  transition-delay: 0s !important;
  caret-color: transparent !important;
}
html, body {
  pointer-events: none !important;
  scroll-behavior: auto !important;
  overflow: hidden !important;
}"##;
