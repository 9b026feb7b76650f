use serde::Serialize;

pub(super) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Serialize `value` for embedding in an inline `<script>`. `</` is written
/// as `<\/` so the HTML parser cannot close the block early.
pub(super) fn json_inline<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .map(|json| json.replace("</", "<\\/"))
        .unwrap_or_else(|_| "null".to_string())
}
