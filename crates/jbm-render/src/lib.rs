//! # jbm-render
//!
//! Turns a chat Markdown syntax tree into a [`StyledDocument`]: flat text
//! with style runs, interaction annotations (links, mentions, emotes,
//! timestamps, checkboxes), inline placeholders and block frames. The host
//! UI lays it out and paints it; hit-testing works on the document alone,
//! without going back to the source.
//!
//! ```
//! use jbm_render::{Action, ParsedMessage, RenderContext, Renderer};
//!
//! let renderer = Renderer::default();
//! let parsed = ParsedMessage::parse("**hi** [docs](https://example.com)");
//! let doc = renderer.render_document(&parsed, &RenderContext::default());
//!
//! assert_eq!(doc.text, "hi docs");
//! assert_eq!(
//!     doc.tap_action(4),
//!     Some(Action::OpenUrl("https://example.com".to_string()))
//! );
//! ```
//!
//! A message is parsed once and can be rendered again with another
//! [`RenderContext`] (font scale, theme, embedding) without re-parsing;
//! [`MessageCache`] keeps recent parses keyed by source text.
//!
//! Rendering never fails as a whole. A node that cannot be rendered turns
//! into a red `[KIND] Error: ...` marker, a node kind without a rendering
//! rule into a cyan `[KIND]{ ... }` wrapper, and the rest of the message
//! renders normally.

pub mod cache;
pub mod context;
pub mod document;
pub mod error;
pub mod highlight;
pub mod interaction;
pub mod node;
mod render;
pub mod styled;

pub use cache::{MessageCache, ParsedMessage};
pub use context::RenderContext;
pub use document::{
    AnnotatedRun, AnnotationKind, BlockFrame, BlockKind, InlinePlaceholder,
    InteractionAnnotation, OBJECT_REPLACEMENT, Overflow, PlaceholderKind, SpanStyle,
    StyledDocument,
};
pub use error::RenderAnomaly;
pub use highlight::{CodeHighlighter, HighlightSpan, Highlighted, SyntectHighlighter};
pub use interaction::Action;
pub use jbm_config::{Argb, Palette, RendererConfig};
pub use node::NodeKind;
pub use render::{MAX_QUOTE_NESTING, Renderer, format_timestamp};
pub use styled::StyledText;
