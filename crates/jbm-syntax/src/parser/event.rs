//! # Parser Events
//!
//! Events are the intermediate representation between parsing and tree
//! building. Instead of building the tree directly, the parser emits a flat
//! sequence of events that describe the tree structure:
//!
//! ```text
//! Start(STRONG)
//!   Token(STAR)
//!   Token(STAR)
//!   Token(TEXT)
//!   Token(STAR)
//!   Token(STAR)
//! Finish
//! ```
//!
//! The Sink processes these in order, maintaining a stack of open nodes.
//! Start pushes, Finish pops.
//!
//! The `forward_parent` field in `Start` lets the grammar wrap an
//! already-parsed node after the fact: the Sink follows the chain and opens
//! the nodes outermost first.

use crate::syntax_kind::SyntaxKind;

/// An event emitted by the parser during tree construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Begin a new composite node.
    Start {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
    },

    /// Add a token to the current node.
    ///
    /// `kind` can differ from the lexer kind: the grammar regroups raw
    /// tokens into composite ones (`ATX_HEADER`, `LIST_BULLET`,
    /// `FENCE_CONTENT`) and reclassifies prefixes (`BLOCK_QUOTE_MARKER`).
    /// `n_raw_tokens` says how many lexer tokens this event consumes; a
    /// fenced code line can span many.
    Token { kind: SyntaxKind, n_raw_tokens: u32 },

    /// Finish the current node.
    Finish,

    /// A placeholder left by `Parser::start`; the Sink ignores it.
    Placeholder,
}

impl Event {
    /// Create a start event with no forward parent.
    pub fn start(kind: SyntaxKind) -> Self {
        Event::Start {
            kind,
            forward_parent: None,
        }
    }

    /// Create a token event for a single raw token.
    pub fn token(kind: SyntaxKind) -> Self {
        Event::Token {
            kind,
            n_raw_tokens: 1,
        }
    }
}
