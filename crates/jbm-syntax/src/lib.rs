//! # jbm-syntax
//!
//! A lossless syntax tree for chat Markdown using [Rowan] + [Logos].
//!
//! [Rowan]: https://docs.rs/rowan
//! [Logos]: https://docs.rs/logos
//!
//! The dialect is the one chat messages are written in: ATX headings,
//! emphasis, strong, strikethrough, code spans and fences, lists with
//! checkboxes, nested block quotes, links, images and autolinks, plus chat
//! tokens for user mentions (`<@ID>`), channel mentions (`<#ID>`), custom
//! emotes (`:ID:`) and timestamps (`<t:SECONDS:STYLE>`).
//!
//! ## Pipeline
//!
//! ```text
//! Source Text → Lexer → Tokens → Parser → Events → Sink → Rowan Tree
//!               (Logos)          (Grammar)        (GreenNodeBuilder)
//! ```
//!
//! The tree keeps every byte of the input, so offsets into it are offsets
//! into the message. Malformed input never fails: unterminated constructs
//! fall back to plain tokens.
//!
//! Delimiters stay as separate child tokens. An `EMPHASIS` node always has
//! exactly one delimiter token at each end, `STRONG` and `STRIKETHROUGH`
//! exactly two, a `CODE_SPAN` the same backtick run at both ends; consumers
//! strip them by position.
//!
//! ## Quick Start
//!
//! ```
//! use jbm_syntax::{parse, SyntaxKind};
//!
//! let tree = parse("# Hello\n");
//! assert_eq!(tree.text().to_string(), "# Hello\n");
//! assert_eq!(tree.first_child().unwrap().kind(), SyntaxKind::HEADING);
//! ```
//!
//! For a parse cache, keep the `GreenNode` from [`parse_green`]: it is
//! `Send + Sync`, unlike the cursor-based [`SyntaxNode`].

pub mod flavor;
pub mod lexer;
pub mod parser;
pub mod syntax_kind;

pub use flavor::Flavor;
pub use parser::{parse, parse_green, parse_with};
pub use rowan::{GreenNode, TextRange, TextSize};
pub use syntax_kind::{ChatMarkdownLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};
