use logos::{Lexer, Logos};

/// Tokens produced by scanning user markup.
///
/// Design: the scanner only finds tag boundaries. Everything else is opaque
/// text, and tags are never re-serialized: callers slice the source by span,
/// so bytes the sanitizer does not touch come out exactly as they went in.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    // ── Markup structure ───────────────────────────────────────────────
    /// `<!-- ... -->`, up to the first `-->` or `--!>` (or end of input).
    /// `<!-->` and `<!--->` are complete empty comments.
    #[token("<!--", comment_body)]
    Comment,

    /// `<!DOCTYPE ...>` and other `<!...>` / `<?...>` declarations.
    #[regex(r"<![^->][^>]*>")]
    #[regex(r"<\?[^>]*>")]
    Declaration,

    /// `<name attr="value" ...>`; quoted values may contain `>`.
    #[regex(r#"<[a-zA-Z]([^>"']|"[^"]*"|'[^']*')*>"#)]
    OpenTag,

    /// `</name>`
    #[regex(r"</[a-zA-Z][^>]*>")]
    CloseTag,

    // ── Content ────────────────────────────────────────────────────────
    #[regex(r"[^<]+")]
    Text,

    /// A `<` that does not start any recognised construct.
    #[token("<")]
    Lt,
}

fn comment_body(lex: &mut Lexer<Token>) -> bool {
    let rest = lex.remainder();
    let len = if rest.starts_with('>') {
        1
    } else if rest.starts_with("->") {
        2
    } else {
        let close = rest.find("-->").map(|i| i + 3);
        let bang = rest.find("--!>").map(|i| i + 4);
        match (close, bang) {
            (Some(a), Some(b)) => a.min(b),
            (Some(end), None) | (None, Some(end)) => end,
            (None, None) => rest.len(),
        }
    };
    lex.bump(len);
    true
}

/// A token with its byte range in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub span: std::ops::Range<usize>,
}
