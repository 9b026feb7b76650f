//! Resource sanitizer: strips references to local files that cannot resolve
//! inside an isolated preview document.
//!
//! Best-effort, not a full HTML parser. Anything it does not recognise passes
//! through byte-for-byte, and running it twice gives the same result as
//! running it once.

use crate::lexer;
use crate::tag::OpenTag;
use crate::token::{Spanned, Token};

/// 1×1 transparent GIF used in place of local image sources.
pub const PLACEHOLDER_IMAGE: &str =
    "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";

const REMOTE_PREFIXES: [&str; 4] = ["data:", "http://", "https://", "blob:"];

/// True when `url` is a same-origin/local reference: anything that does not
/// start with `data:`, `http://`, `https://` or `blob:`.
pub fn is_local_reference(url: &str) -> bool {
    let url = url.trim_start();
    !REMOTE_PREFIXES.iter().any(|prefix| {
        url.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

fn is_css_path(url: &str) -> bool {
    let path = url
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or(url)
        .trim_end();
    path.len()
        .checked_sub(4)
        .and_then(|at| path.get(at..))
        .is_some_and(|ext| ext.eq_ignore_ascii_case(".css"))
}

/// Comment left where a local resource reference used to be.
fn removal_marker(kind: &str, target: &str) -> String {
    // Keep the comment well-formed whatever the path contains.
    let target = target.trim().replace("--", "- -").replace('>', "&gt;");
    format!("<!-- livepen: local {kind} \"{target}\" is not available in the preview -->")
}

/// Rewrite `markup` so the preview never requests local files.
///
/// - `<script src=local>` elements (tag, body and close tag) become a comment
///   marker; inline scripts are untouched.
/// - `<link href=local.css>` becomes a comment marker; remote stylesheets stay.
/// - `<img src=local>` gets [`PLACEHOLDER_IMAGE`] as its source.
pub fn sanitize(markup: &str) -> String {
    let tokens = lexer::lex(markup);
    let mut out = String::with_capacity(markup.len());
    let mut i = 0;

    while i < tokens.len() {
        let raw = &markup[tokens[i].span.clone()];
        if tokens[i].token != Token::OpenTag {
            out.push_str(raw);
            i += 1;
            continue;
        }

        let tag = OpenTag::parse(raw);
        match tag.name.as_str() {
            "script" => {
                if let Some(src) = tag.value("src").filter(|s| is_local_reference(s)) {
                    out.push_str(&removal_marker("script", src));
                    i = skip_element(&tokens, markup, i, "script");
                    continue;
                }
                out.push_str(raw);
            }
            "link" => match tag.value("href") {
                Some(href) if is_local_reference(href) && is_css_path(href) => {
                    out.push_str(&removal_marker("stylesheet", href));
                }
                _ => out.push_str(raw),
            },
            "img" => match tag.attr("src") {
                Some(attr) if attr.value.is_some_and(is_local_reference) => {
                    let span = attr.value_span.clone().unwrap_or(0..0);
                    out.push_str(&raw[..span.start]);
                    if attr.quoted {
                        out.push_str(PLACEHOLDER_IMAGE);
                    } else {
                        out.push('"');
                        out.push_str(PLACEHOLDER_IMAGE);
                        out.push('"');
                    }
                    out.push_str(&raw[span.end..]);
                }
                _ => out.push_str(raw),
            },
            _ => out.push_str(raw),
        }
        i += 1;
    }

    out
}

/// Index just past the element opened at `open`: its raw body (if any) and
/// its close tag (if present).
fn skip_element(tokens: &[Spanned], source: &str, open: usize, name: &str) -> usize {
    let mut i = open + 1;
    if tokens.get(i).is_some_and(|t| t.token == Token::Text) {
        i += 1;
    }
    if let Some(t) = tokens.get(i) {
        if t.token == Token::CloseTag
            && crate::tag::tag_name(&source[t.span.clone()]).eq_ignore_ascii_case(name)
        {
            i += 1;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_remote_image_unchanged() {
        let src = r#"<img src="https://example.com/a.png">"#;
        assert_eq!(sanitize(src), src);
    }

    #[test]
    fn sanitize_local_image_gets_placeholder() {
        let out = sanitize(r#"<p><img alt="logo" src="local.png" width="4"></p>"#);
        assert_eq!(
            out,
            format!(r#"<p><img alt="logo" src="{PLACEHOLDER_IMAGE}" width="4"></p>"#)
        );
        assert!(!out.contains("local.png"));
    }

    #[test]
    fn sanitize_sees_images_after_empty_comments() {
        let out = sanitize(r#"<!--><img src="local.png"><!---><img src='b.png'><!-- end -->"#);
        assert!(!out.contains("local.png"));
        assert!(!out.contains("b.png"));
        assert_eq!(out.matches(PLACEHOLDER_IMAGE).count(), 2);
        assert!(out.ends_with("<!-- end -->"));
    }

    #[test]
    fn sanitize_unquoted_image_src_is_quoted() {
        let out = sanitize("<img src=img/cat.jpg>");
        assert_eq!(out, format!(r#"<img src="{PLACEHOLDER_IMAGE}">"#));
    }

    #[test]
    fn sanitize_keeps_data_and_blob_images() {
        let src = r#"<img src="data:image/png;base64,AAAA"><img src="blob:https://x/1"><img src='HTTP://X/y.png'>"#;
        assert_eq!(sanitize(src), src);
    }

    #[test]
    fn sanitize_drops_local_script_element() {
        let out = sanitize(r#"<h1>x</h1><script src="app.js"></script><p>y</p>"#);
        assert_eq!(
            out,
            r#"<h1>x</h1><!-- livepen: local script "app.js" is not available in the preview --><p>y</p>"#
        );
    }

    #[test]
    fn sanitize_keeps_inline_and_remote_scripts() {
        let src = r#"<script>let a = "<img src='x.png'>";</script><script src="https://cdn.example.com/lib.js"></script>"#;
        assert_eq!(sanitize(src), src);
    }

    #[test]
    fn sanitize_local_script_with_body_and_odd_case() {
        let out = sanitize(r#"<SCRIPT SRC='./main.js'>ignored()</SCRIPT>done"#);
        assert!(out.starts_with("<!-- livepen: local script \"./main.js\""));
        assert!(out.ends_with("-->done"));
        assert!(!out.contains("ignored"));
    }

    #[test]
    fn sanitize_local_stylesheet_replaced() {
        let out = sanitize(r#"<link rel="stylesheet" href="css/site.css?v=2">"#);
        assert_eq!(
            out,
            r#"<!-- livepen: local stylesheet "css/site.css?v=2" is not available in the preview -->"#
        );
    }

    #[test]
    fn sanitize_remote_stylesheet_and_other_links_kept() {
        let src = r#"<link rel="stylesheet" href="https://fonts.example.com/a.css"><link rel="icon" href="favicon.ico">"#;
        assert_eq!(sanitize(src), src);
    }

    #[test]
    fn sanitize_marker_cannot_break_out_of_comment() {
        let out = sanitize(r#"<script src="a-->b.js"></script>"#);
        assert_eq!(out.matches("-->").count(), 1);
        assert!(out.ends_with("-->"));
    }

    #[test]
    fn sanitize_is_idempotent_on_mixed_input() {
        let src = r#"<!doctype html><link href="a.css" rel=stylesheet><img src=x.png>
<script src="b.js">x</script><script>if (a < b) {}</script><img src="https://e/x.png"> < stray"#;
        let once = sanitize(src);
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn sanitize_malformed_input_passes_through() {
        let src = "<div <<p>> </ <img src=\"unterminated";
        assert_eq!(sanitize(src), src);
    }

    #[test]
    fn local_reference_rules() {
        assert!(is_local_reference("img/a.png"));
        assert!(is_local_reference("/abs/a.png"));
        assert!(is_local_reference(""));
        assert!(!is_local_reference("  https://x"));
        assert!(!is_local_reference("DATA:text/plain,hi"));
        assert!(!is_local_reference("blob:abc"));
    }
}
