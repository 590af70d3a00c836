//! # Grammar Rules
//!
//! Each rule takes a `&mut Parser`, looks ahead over the token slice to
//! decide what it is looking at, then consumes tokens and wraps them in
//! nodes (`p.start()` → marker → `complete()`).
//!
//! - [`block`] - line oriented structure: headings, lists, quotes, fences
//! - [`inline`] - constructs inside a line: emphasis, code, links, chat tokens
//!
//! ## Error Recovery
//!
//! Rules never fail. Anything that does not match a construct is consumed
//! as plain tokens into the enclosing node, so every input produces a tree
//! that reproduces it byte for byte.

mod block;
mod inline;

use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

/// Parse the root document.
///
/// Blocks end on the NEWLINE that terminates their last line; that token
/// and any blank lines between blocks are children of ROOT.
pub fn root(p: &mut Parser<'_, '_>) {
    let m = p.start();

    while !p.at_end() {
        if p.eat(SyntaxKind::NEWLINE) {
            continue;
        }
        let before = p.pos();
        block::block(p, block::Container::ROOT);
        if p.pos() == before {
            p.bump();
        }
    }

    m.complete(p, SyntaxKind::ROOT);
}
