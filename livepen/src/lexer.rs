use logos::Logos;

use crate::tag::tag_name;
use crate::token::{Spanned, Token};

/// Elements whose content is raw text: never scanned for tags.
const RAW_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "textarea", "title"];

/// Tokenize markup into spanned tokens.
///
/// Never fails. Input the scanner cannot classify is emitted as `Text`, and
/// the body of a raw-text element (everything up to its closing tag) is
/// emitted as a single `Text` token so that `<img src=...>` inside a script
/// string is not mistaken for an image.
pub fn lex(source: &str) -> Vec<Spanned> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => {
                tokens.push(Spanned {
                    token,
                    span: span.clone(),
                });
                if token != Token::OpenTag {
                    continue;
                }
                let name = tag_name(&source[span.clone()]);
                if let Some(raw) = RAW_TEXT_ELEMENTS
                    .iter()
                    .find(|el| name.eq_ignore_ascii_case(el))
                {
                    let body = raw_text_len(lexer.remainder(), raw);
                    if body > 0 {
                        lexer.bump(body);
                        tokens.push(Spanned {
                            token: Token::Text,
                            span: span.end..span.end + body,
                        });
                    }
                }
            }
            Err(()) => tokens.push(Spanned {
                token: Token::Text,
                span,
            }),
        }
    }

    tokens
}

/// Byte length of a raw-text body: up to `</name` followed by a delimiter,
/// or the rest of the input when the element is never closed.
fn raw_text_len(rest: &str, name: &str) -> usize {
    let bytes = rest.as_bytes();
    let needle_len = name.len() + 2;
    let mut i = 0;
    while let Some(offset) = rest[i..].find("</") {
        let at = i + offset;
        let candidate = &bytes[at + 2..];
        if candidate.len() >= name.len()
            && candidate[..name.len()].eq_ignore_ascii_case(name.as_bytes())
        {
            match bytes.get(at + needle_len) {
                None | Some(b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r' | b'\x0c') => return at,
                _ => {}
            }
        }
        i = at + 2;
    }
    rest.len()
}
