//! # Lexer
//!
//! Breaks source text into tokens using the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! Every byte of the input appears in exactly one token, which is what lets
//! the tree reproduce the message text exactly:
//!
//! ```
//! use jbm_syntax::lexer::lex;
//!
//! let input = "**hi** <@01ARZ3NDEKTSV4RRFFQ69G5FAV>\n";
//! let reconstructed: String = lex(input).iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! Tokens are context-free. The lexer does not know whether `*` opens
//! emphasis, a list item or a thematic break, or whether `<` starts a
//! mention, an autolink or HTML; the grammar decides. Runs of ordinary
//! characters are grouped into single `TEXT` tokens.
//!
//! The one exception is bare `http(s)://` URLs: they are lexed as a single
//! `GFM_AUTOLINK` token because their characters would otherwise be split
//! into punctuation tokens the grammar could not reassemble. Trailing
//! sentence punctuation is left out of the URL token.
//!
//! A backslash before ASCII punctuation lexes as one `ESCAPE` token, so an
//! escaped `*` or `[` never reaches the grammar as a delimiter. A backslash
//! before anything else is plain text.

use logos::Logos;

use crate::syntax_kind::SyntaxKind;

/// Token kinds produced by the Logos lexer.
///
/// Separate from [`SyntaxKind`] because Logos needs to derive on it.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Horizontal whitespace (spaces, tabs)
    #[regex(r"[ \t]+")]
    Whitespace,

    /// Line ending (LF or CRLF)
    #[regex(r"\r?\n")]
    Newline,

    #[token(">")]
    Gt,

    #[token("<")]
    Lt,

    #[token("-")]
    Dash,

    #[token("*")]
    Star,

    #[token("_")]
    Underscore,

    #[token("+")]
    Plus,

    #[token("`")]
    Backtick,

    #[token("~")]
    Tilde,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("#")]
    Hash,

    #[token("|")]
    Pipe,

    #[token("!")]
    Exclaim,

    #[token(":")]
    Colon,

    #[token("\"")]
    DoubleQuote,

    #[token("'")]
    SingleQuote,

    #[token("$")]
    Dollar,

    /// Backslash escape of one ASCII punctuation character
    #[regex(r"\\[!-/:-@\[-`{-~]")]
    Escape,

    /// Backslash that escapes nothing
    #[token("\\")]
    Backslash,

    /// Bare URL, without trailing punctuation
    #[regex(r#"https?://[^\s<>()\[\]]*[^\s<>()\[\].,:;!?'"*_~]"#)]
    Url,

    /// Plain text - anything not matched by other rules
    #[regex(r#"[^\s\[\]()<>`*_+#|~!:"'$\-\\]+"#)]
    Text,
}

impl TokenKind {
    /// Convert to SyntaxKind.
    pub fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            TokenKind::Whitespace => SyntaxKind::WHITESPACE,
            TokenKind::Newline => SyntaxKind::NEWLINE,
            TokenKind::Gt => SyntaxKind::GT,
            TokenKind::Lt => SyntaxKind::LT,
            TokenKind::Dash => SyntaxKind::DASH,
            TokenKind::Star => SyntaxKind::STAR,
            TokenKind::Underscore => SyntaxKind::UNDERSCORE,
            TokenKind::Plus => SyntaxKind::PLUS,
            TokenKind::Backtick => SyntaxKind::BACKTICK,
            TokenKind::Tilde => SyntaxKind::TILDE,
            TokenKind::LBracket => SyntaxKind::LBRACKET,
            TokenKind::RBracket => SyntaxKind::RBRACKET,
            TokenKind::LParen => SyntaxKind::LPAREN,
            TokenKind::RParen => SyntaxKind::RPAREN,
            TokenKind::Hash => SyntaxKind::HASH,
            TokenKind::Pipe => SyntaxKind::PIPE,
            TokenKind::Exclaim => SyntaxKind::EXCLAIM,
            TokenKind::Colon => SyntaxKind::COLON,
            TokenKind::DoubleQuote => SyntaxKind::DOUBLE_QUOTE,
            TokenKind::SingleQuote => SyntaxKind::SINGLE_QUOTE,
            TokenKind::Dollar => SyntaxKind::DOLLAR,
            TokenKind::Escape => SyntaxKind::ESCAPE,
            TokenKind::Backslash => SyntaxKind::TEXT,
            TokenKind::Url => SyntaxKind::GFM_AUTOLINK,
            TokenKind::Text => SyntaxKind::TEXT,
        }
    }
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let text = lexer.slice();
        let kind = match result {
            Ok(token_kind) => token_kind.to_syntax_kind(),
            // Unrecognized characters (lone `\r`, form feeds, unicode
            // whitespace) are kept as text
            Err(()) => SyntaxKind::TEXT,
        };
        tokens.push(Token { kind, text });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn token(kind: SyntaxKind, text: &str) -> Token<'_> {
        Token { kind, text }
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(lex(""), vec![]);
    }

    #[test]
    fn lex_newline_crlf() {
        assert_eq!(lex("\r\n"), vec![token(SyntaxKind::NEWLINE, "\r\n")]);
    }

    #[test]
    fn lex_strong_delimiters_are_separate_tokens() {
        assert_eq!(
            lex("**bold**"),
            vec![
                token(SyntaxKind::STAR, "*"),
                token(SyntaxKind::STAR, "*"),
                token(SyntaxKind::TEXT, "bold"),
                token(SyntaxKind::STAR, "*"),
                token(SyntaxKind::STAR, "*"),
            ]
        );
    }

    #[test]
    fn lex_user_mention() {
        assert_eq!(
            lex("<@01ARZ3NDEKTSV4RRFFQ69G5FAV>"),
            vec![
                token(SyntaxKind::LT, "<"),
                token(SyntaxKind::TEXT, "@01ARZ3NDEKTSV4RRFFQ69G5FAV"),
                token(SyntaxKind::GT, ">"),
            ]
        );
    }

    #[test]
    fn lex_custom_emote() {
        assert_eq!(
            lex(":01ARZ3NDEKTSV4RRFFQ69G5FAV:"),
            vec![
                token(SyntaxKind::COLON, ":"),
                token(SyntaxKind::TEXT, "01ARZ3NDEKTSV4RRFFQ69G5FAV"),
                token(SyntaxKind::COLON, ":"),
            ]
        );
    }

    #[test]
    fn lex_timestamp() {
        assert_eq!(
            lex("<t:1700000000:R>"),
            vec![
                token(SyntaxKind::LT, "<"),
                token(SyntaxKind::TEXT, "t"),
                token(SyntaxKind::COLON, ":"),
                token(SyntaxKind::TEXT, "1700000000"),
                token(SyntaxKind::COLON, ":"),
                token(SyntaxKind::TEXT, "R"),
                token(SyntaxKind::GT, ">"),
            ]
        );
    }

    #[test]
    fn lex_bare_url_drops_trailing_punctuation() {
        assert_eq!(
            lex("see https://example.com/a-b_c."),
            vec![
                token(SyntaxKind::TEXT, "see"),
                token(SyntaxKind::WHITESPACE, " "),
                token(SyntaxKind::GFM_AUTOLINK, "https://example.com/a-b_c"),
                token(SyntaxKind::TEXT, "."),
            ]
        );
    }

    #[test]
    fn lex_url_stops_at_closing_paren() {
        let kinds: Vec<_> = lex("(https://example.com)").iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::LPAREN,
                SyntaxKind::GFM_AUTOLINK,
                SyntaxKind::RPAREN
            ]
        );
    }

    #[test]
    fn lex_escaped_punctuation() {
        assert_eq!(
            lex(r"a\*b\\"),
            vec![
                token(SyntaxKind::TEXT, "a"),
                token(SyntaxKind::ESCAPE, r"\*"),
                token(SyntaxKind::TEXT, "b"),
                token(SyntaxKind::ESCAPE, r"\\"),
            ]
        );
    }

    #[test]
    fn lex_backslash_before_letter_is_text() {
        assert_eq!(
            lex(r"C:\dir"),
            vec![
                token(SyntaxKind::TEXT, "C"),
                token(SyntaxKind::COLON, ":"),
                token(SyntaxKind::TEXT, r"\"),
                token(SyntaxKind::TEXT, "dir"),
            ]
        );
    }

    #[test]
    fn lex_word_http_is_plain_text() {
        assert_eq!(lex("http"), vec![token(SyntaxKind::TEXT, "http")]);
    }

    #[test]
    fn lex_ordered_list_marker() {
        assert_eq!(
            lex("12. x"),
            vec![
                token(SyntaxKind::TEXT, "12."),
                token(SyntaxKind::WHITESPACE, " "),
                token(SyntaxKind::TEXT, "x"),
            ]
        );
    }

    #[test]
    fn all_bytes_preserved_complex() {
        let input = "## Heading\n\n> A *quote* with [link](url)\n\n- [x] done\n  1) nested\n\n```rust\ncode\n```\u{a0}\r";
        let reconstructed: String = lex(input).iter().map(|t| t.text).collect();
        assert_eq!(input, reconstructed);
    }
}
