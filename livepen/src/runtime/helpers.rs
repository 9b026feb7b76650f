//! Escaping helpers shared by the document assembler and the shim generator.

/// Encode `s` as a JS string literal safe to embed in an inline `<script>`.
/// `</` becomes `<\/` so the HTML parser cannot see a closing tag.
pub(crate) fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut prev = '\0';
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            '/' if prev == '<' => out.push_str("\\/"),
            c if c < '\x20' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
        prev = c;
    }
    out.push('"');
    out
}

/// Neutralise `</tag` (any case) inside raw text so user code cannot close
/// the element it is embedded in.
pub(crate) fn escape_closing_tag(text: &str, tag: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut i = 0;
    while let Some(offset) = text[i..].find("</") {
        let at = i + offset;
        let name = &bytes[at + 2..];
        if name.len() >= tag.len() && name[..tag.len()].eq_ignore_ascii_case(tag.as_bytes()) {
            out.push_str(&text[last..at]);
            out.push_str("<\\/");
            last = at + 2;
        }
        i = at + 2;
    }
    out.push_str(&text[last..]);
    out
}

/// Escape text for a double-quoted HTML attribute value.
pub(crate) fn attr_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
