//! WASM bindings for the preview pipeline.
//!
//! Lets an in-browser host assemble preview documents without a server.
//! Build with: `wasm-pack build --target web --features wasm`

use wasm_bindgen::prelude::*;

use crate::intercept::{classify_link, LinkAction};
use crate::relay::InboundMessage;
use crate::render_host::RenderMode;
use crate::snapshot::PreviewSnapshot;

/// Sanitize user markup: strip local resource references.
#[wasm_bindgen]
pub fn sanitize_markup(markup: &str) -> String {
    crate::sanitize::sanitize(markup)
}

/// Assemble the interactive preview document for the three buffers.
#[wasm_bindgen]
pub fn assemble_document(markup: &str, styles: &str, script: &str) -> String {
    crate::runtime::assemble(markup, styles, script)
}

/// Assemble a passive (thumbnail) document: no modals, no pointer events,
/// animations frozen.
#[wasm_bindgen]
pub fn assemble_thumbnail(markup: &str, styles: &str, script: &str) -> String {
    let snapshot = PreviewSnapshot::new(markup, styles, script);
    crate::runtime::assemble_with(&snapshot, RenderMode::Passive).into_string()
}

/// The iframe `sandbox` attribute for `"interactive"` or `"passive"`.
#[wasm_bindgen]
pub fn sandbox_for(mode: &str) -> Result<String, JsError> {
    let mode = match mode {
        "interactive" => RenderMode::Interactive,
        "passive" => RenderMode::Passive,
        other => return Err(JsError::new(&format!("unknown render mode '{other}'"))),
    };
    Ok(mode.sandbox_attr())
}

/// Validate a message posted by the preview.
///
/// Returns the typed message (`{ type, message }` or `{ type, url }`), or
/// `null` when the shape is not one the host accepts.
#[wasm_bindgen]
pub fn parse_preview_message(value: JsValue) -> JsValue {
    let message: Option<InboundMessage> = serde_wasm_bindgen::from_value(value).ok();
    match message {
        Some(message) => serde_wasm_bindgen::to_value(&message).unwrap_or(JsValue::NULL),
        None => JsValue::NULL,
    }
}

/// Classify a link href the way the runtime shim does. `anchor_exists`
/// says whether the `#fragment` target is present in the document.
///
/// Returns one of `"scroll"`, `"passthrough"`, `"not-connected"`,
/// `"local-file"`, `"open-external"`.
#[wasm_bindgen]
pub fn classify_link_href(href: &str, anchor_exists: bool) -> String {
    let action = match classify_link(href, |_| anchor_exists) {
        LinkAction::ScrollInPage => "scroll",
        LinkAction::Passthrough => "passthrough",
        LinkAction::NotConnected => "not-connected",
        LinkAction::LocalFile => "local-file",
        LinkAction::OpenExternal(_) => "open-external",
    };
    action.to_string()
}
