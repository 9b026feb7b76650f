//! Attribute scanner for a single open tag.
//!
//! Works on the exact slice of one `Token::OpenTag`. Value spans are byte
//! offsets into that slice so a caller can splice a new value in place and
//! leave every other byte of the tag alone.

use std::ops::Range;

/// Tag name of an open or close tag slice (`<img ...>` → `img`).
pub fn tag_name(tag: &str) -> &str {
    let body = tag
        .strip_prefix("</")
        .or_else(|| tag.strip_prefix('<'))
        .unwrap_or(tag);
    let end = body
        .find(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>')
        .unwrap_or(body.len());
    &body[..end]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr<'a> {
    /// Lowercased attribute name.
    pub name: String,
    pub value: Option<&'a str>,
    /// Span of the value inside the tag, excluding quotes.
    pub value_span: Option<Range<usize>>,
    pub quoted: bool,
}

#[derive(Debug, Clone)]
pub struct OpenTag<'a> {
    /// Lowercased tag name.
    pub name: String,
    pub attrs: Vec<Attr<'a>>,
}

impl<'a> OpenTag<'a> {
    /// Scan `tag`, which must start with `<` and end with `>`.
    pub fn parse(tag: &'a str) -> Self {
        let name = tag_name(tag).to_ascii_lowercase();
        let bytes = tag.as_bytes();
        let end = tag.len().saturating_sub(1);
        let mut i = 1 + name.len();
        let mut attrs = Vec::new();

        while i < end {
            // Skip whitespace and stray slashes between attributes.
            while i < end && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
                i += 1;
            }
            if i >= end {
                break;
            }

            let name_start = i;
            while i < end
                && !bytes[i].is_ascii_whitespace()
                && !matches!(bytes[i], b'=' | b'/' | b'>')
            {
                i += 1;
            }
            // A lone `=` with no name: consume it so the loop progresses.
            if i == name_start {
                i += 1;
                continue;
            }
            let attr_name = tag[name_start..i].to_ascii_lowercase();

            let mut j = i;
            while j < end && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j >= end || bytes[j] != b'=' {
                attrs.push(Attr {
                    name: attr_name,
                    value: None,
                    value_span: None,
                    quoted: false,
                });
                continue;
            }
            j += 1;
            while j < end && bytes[j].is_ascii_whitespace() {
                j += 1;
            }

            let (span, quoted, next) = match bytes.get(j) {
                Some(&q) if j < end && (q == b'"' || q == b'\'') => {
                    let start = j + 1;
                    let close = tag[start..end]
                        .find(q as char)
                        .map(|k| start + k)
                        .unwrap_or(end);
                    (start..close, true, (close + 1).min(end))
                }
                _ => {
                    let start = j;
                    let mut k = j;
                    while k < end && !bytes[k].is_ascii_whitespace() {
                        k += 1;
                    }
                    (start..k, false, k)
                }
            };

            attrs.push(Attr {
                name: attr_name,
                value: Some(&tag[span.clone()]),
                value_span: Some(span),
                quoted,
            });
            i = next;
        }

        Self { name, attrs }
    }

    /// First attribute with the given (lowercase) name.
    pub fn attr(&self, name: &str) -> Option<&Attr<'a>> {
        self.attrs.iter().find(|a| a.name == name)
    }

    /// Value of the first attribute with the given (lowercase) name.
    pub fn value(&self, name: &str) -> Option<&'a str> {
        self.attr(name).and_then(|a| a.value)
    }
}
