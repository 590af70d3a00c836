//! # Parser - Event-Based Tree Construction
//!
//! Transforms the token stream into a syntax tree using the event-based
//! architecture from rust-analyzer.
//!
//! The grammar never builds tree nodes directly. It emits a flat list of
//! [`Event`]s (Start, Token, Finish) and the [`Sink`] replays them into a
//! Rowan `GreenNodeBuilder`. Speculative parses (is this `*` the start of
//! emphasis?) are decided by looking ahead over the token slice before any
//! event is emitted, so there is nothing to roll back.
//!
//! ## The Marker System
//!
//! `parser.start()` returns a [`Marker`] that **must** be completed or
//! abandoned. Dropping one on the floor panics:
//!
//! ```ignore
//! let m = parser.start();
//! parser.bump();
//! m.complete(parser, SyntaxKind::PARAGRAPH);
//! ```
//!
//! ## Regrouping tokens
//!
//! The lexer is context-free, so the grammar regroups and reclassifies raw
//! tokens as it goes: `bump_n` merges several raw tokens into one composite
//! token (a `##` heading marker, a whole fenced code line) and `bump_remap`
//! gives a single token its structural meaning (`>` as a block quote
//! marker).
//!
//! ## Public API
//!
//! ```
//! use jbm_syntax::{parse, SyntaxKind};
//!
//! let tree = parse("**hi**");
//! let paragraph = tree.first_child().unwrap();
//! assert_eq!(paragraph.first_child().unwrap().kind(), SyntaxKind::STRONG);
//! ```

pub mod event;
pub mod sink;

mod grammar;

use rowan::GreenNode;

use crate::flavor::Flavor;
use crate::lexer::{Token, lex};
use crate::syntax_kind::{SyntaxKind, SyntaxNode};
use event::Event;
use sink::Sink;

/// The parser state machine.
///
/// Holds the token stream, current position, the enabled extensions and the
/// accumulated events. Grammar functions receive `&mut Parser` and use its
/// methods to:
///
/// - Inspect tokens: `current()`, `nth()`, `at()`, `kind_at()`, `text_at()`
/// - Consume tokens: `bump()`, `eat()`, `bump_n()`, `bump_remap()`
/// - Build structure: `start()` → `Marker` → `complete()`/`abandon()`
pub struct Parser<'t, 'input> {
    tokens: &'t [Token<'input>],
    pos: usize,
    events: Vec<Event>,
    flavor: Flavor,
}

impl<'t, 'input> Parser<'t, 'input> {
    /// Create a new parser from a slice of tokens.
    pub fn new(tokens: &'t [Token<'input>], flavor: Flavor) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            flavor,
        }
    }

    /// Parse the tokens and return the green tree.
    pub fn parse(mut self) -> GreenNode {
        grammar::root(&mut self);
        let sink = Sink::new(self.tokens, self.events);
        sink.finish()
    }

    /// The extensions enabled for this parse.
    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Start a new node and return a marker.
    pub fn start(&mut self) -> Marker {
        let pos = self.events.len();
        self.events.push(Event::Placeholder);
        Marker {
            pos,
            completed: false,
        }
    }

    /// Index of the current token.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Current token kind, or EOF if past end.
    pub fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Look ahead n tokens.
    pub fn nth(&self, n: usize) -> SyntaxKind {
        self.kind_at(self.pos + n)
    }

    /// Raw kind of the token at an absolute index, or EOF past the end.
    pub fn kind_at(&self, idx: usize) -> SyntaxKind {
        self.tokens
            .get(idx)
            .map(|t| t.kind)
            .unwrap_or(SyntaxKind::EOF)
    }

    /// Text of the token at an absolute index, or `""` past the end.
    pub fn text_at(&self, idx: usize) -> &'input str {
        self.tokens.get(idx).map(|t| t.text).unwrap_or("")
    }

    /// Get the text of the current token.
    pub fn current_text(&self) -> &'input str {
        self.text_at(self.pos)
    }

    /// Index of the NEWLINE ending the line that contains `idx`, or the
    /// token count when the line runs to the end of input.
    pub fn line_end(&self, idx: usize) -> usize {
        (idx..self.tokens.len())
            .find(|&i| self.tokens[i].kind == SyntaxKind::NEWLINE)
            .unwrap_or(self.tokens.len())
    }

    /// Check if at end of input.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Check if current token is of given kind.
    pub fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume the current token if it matches, giving it a new kind.
    pub fn eat_remap(&mut self, kind: SyntaxKind, as_kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump_remap(as_kind);
            true
        } else {
            false
        }
    }

    /// Consume the current token unconditionally.
    pub fn bump(&mut self) {
        if !self.at_end() {
            let kind = self.current();
            self.events.push(Event::token(kind));
            self.pos += 1;
        }
    }

    /// Consume the current token under a different kind.
    pub fn bump_remap(&mut self, kind: SyntaxKind) {
        self.bump_n(1, kind);
    }

    /// Consume n tokens as a single composite token.
    pub fn bump_n(&mut self, n: usize, kind: SyntaxKind) {
        if n > 0 && self.pos + n <= self.tokens.len() {
            self.events.push(Event::Token {
                kind,
                n_raw_tokens: n as u32,
            });
            self.pos += n;
        }
    }

    /// Consume tokens up to (not including) the absolute index `end`.
    pub fn bump_to(&mut self, end: usize) {
        while self.pos < end && !self.at_end() {
            self.bump();
        }
    }
}

/// A marker for a node being constructed.
///
/// `parser.start()` pushes a `Placeholder` event and returns a `Marker`
/// pointing at it. The marker must be completed (the placeholder becomes a
/// `Start` and a `Finish` is pushed) or abandoned (the placeholder is
/// removed or left inert). Dropping it otherwise panics.
#[must_use = "Markers must be completed or abandoned, dropping them is a bug"]
pub struct Marker {
    /// Position in the events vector where our Placeholder lives
    pos: usize,
    /// Tracks whether complete() or abandon() was called
    completed: bool,
}

impl Marker {
    /// Complete this marker, creating a node of the given kind.
    pub fn complete(mut self, p: &mut Parser<'_, '_>, kind: SyntaxKind) -> CompletedMarker {
        self.completed = true;
        let event_at_pos = &mut p.events[self.pos];
        assert!(matches!(event_at_pos, Event::Placeholder));
        *event_at_pos = Event::Start {
            kind,
            forward_parent: None,
        };
        p.events.push(Event::Finish);
        CompletedMarker { pos: self.pos }
    }

    /// Abandon this marker without creating a node.
    ///
    /// Only removes the placeholder if it's the last event; otherwise the
    /// placeholder stays inert and the Sink skips it.
    pub fn abandon(mut self, p: &mut Parser<'_, '_>) {
        self.completed = true;
        if self.pos == p.events.len() - 1 {
            match p.events.pop() {
                Some(Event::Placeholder) => {}
                _ => unreachable!(),
            }
        }
    }
}

impl Drop for Marker {
    fn drop(&mut self) {
        if !self.completed && !std::thread::panicking() {
            panic!("Marker must be either completed or abandoned");
        }
    }
}

/// A marker for a node that has been completed.
///
/// `precede()` wraps the completed node in a new parent through a forward
/// parent link the Sink resolves.
#[derive(Debug, Clone, Copy)]
pub struct CompletedMarker {
    /// Position of the Start event for this completed node
    pos: usize,
}

impl CompletedMarker {
    /// Create a new parent node that will contain this node.
    pub fn precede(self, p: &mut Parser<'_, '_>) -> Marker {
        let new_pos = p.events.len();
        p.events.push(Event::Placeholder);

        if let Event::Start { forward_parent, .. } = &mut p.events[self.pos] {
            *forward_parent = Some(new_pos);
        }

        Marker {
            pos: new_pos,
            completed: false,
        }
    }
}

/// Parse chat Markdown into a thread-safe green tree.
///
/// `GreenNode` is `Send + Sync` and cheap to clone, which is what a parse
/// cache should hold. Wrap it with [`SyntaxNode::new_root`] to walk it.
pub fn parse_green(source: &str, flavor: Flavor) -> GreenNode {
    let tokens = lex(source);
    Parser::new(&tokens, flavor).parse()
}

/// Parse with an explicit extension set.
pub fn parse_with(source: &str, flavor: Flavor) -> SyntaxNode {
    SyntaxNode::new_root(parse_green(source, flavor))
}

/// Parse with every chat extension enabled.
pub fn parse(source: &str) -> SyntaxNode {
    parse_with(source, Flavor::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_empty_input() {
        let tree = parse("");
        assert_eq!(tree.kind(), SyntaxKind::ROOT);
        assert_eq!(tree.children().count(), 0);
    }

    #[test]
    fn parse_preserves_all_text() {
        let input = "Hello, world!";
        let tree = parse(input);
        assert_eq!(tree.text(), input);
    }

    #[test]
    fn parse_simple_paragraph() {
        let tree = parse("Hello");
        let para = tree.children().next().unwrap();
        assert_eq!(para.kind(), SyntaxKind::PARAGRAPH);
    }

    #[test]
    fn line_end_finds_newline_or_end() {
        let tokens = lex("a b\nc");
        let p = Parser::new(&tokens, Flavor::default());
        assert_eq!(p.line_end(0), 3);
        assert_eq!(p.line_end(4), 5);
    }

    #[test]
    fn bump_n_merges_tokens() {
        let tokens = lex("### x");
        let mut p = Parser::new(&tokens, Flavor::default());
        let m = p.start();
        p.bump_n(3, SyntaxKind::ATX_HEADER);
        p.bump_to(tokens.len());
        m.complete(&mut p, SyntaxKind::ROOT);
        let tree = SyntaxNode::new_root(Sink::new(&tokens, p.events).finish());
        let first = tree.first_token().unwrap();
        assert_eq!(first.kind(), SyntaxKind::ATX_HEADER);
        assert_eq!(first.text(), "###");
    }

    #[test]
    fn marker_must_be_completed() {
        let result = std::panic::catch_unwind(|| {
            let tokens = lex("test");
            let mut parser = Parser::new(&tokens, Flavor::default());
            let _marker = parser.start();
        });
        assert!(result.is_err());
    }

    #[test]
    fn marker_can_be_abandoned() {
        let tokens = lex("test");
        let mut parser = Parser::new(&tokens, Flavor::default());
        let marker = parser.start();
        marker.abandon(&mut parser);
        assert!(parser.events.is_empty());
    }

    #[test]
    fn precede_wraps_completed_node() {
        let tokens = lex("x");
        let mut p = Parser::new(&tokens, Flavor::default());
        let root = p.start();
        let inner = p.start();
        p.bump();
        let done = inner.complete(&mut p, SyntaxKind::PARAGRAPH);
        let outer = done.precede(&mut p);
        outer.complete(&mut p, SyntaxKind::BLOCK_QUOTE);
        root.complete(&mut p, SyntaxKind::ROOT);

        let tree = SyntaxNode::new_root(Sink::new(&tokens, p.events).finish());
        let quote = tree.first_child().unwrap();
        assert_eq!(quote.kind(), SyntaxKind::BLOCK_QUOTE);
        assert_eq!(quote.first_child().unwrap().kind(), SyntaxKind::PARAGRAPH);
    }
}
