//! The render walk.
//!
//! Each node renders into its own [`StyledText`] fragment, which the parent
//! splices into its output. A node that fails yields a
//! [`RenderAnomaly`]; the parent swaps it for a visible error marker and
//! carries on with the siblings.

mod block;
mod inline;

pub use block::MAX_QUOTE_NESTING;
pub use inline::format_timestamp;

use jbm_config::{Argb, RendererConfig};
use jbm_syntax::{SyntaxElement, SyntaxNode};

use crate::cache::ParsedMessage;
use crate::context::RenderContext;
use crate::document::{SpanStyle, StyledDocument};
use crate::error::RenderAnomaly;
use crate::highlight::{CodeHighlighter, SyntectHighlighter};
use crate::node::NodeKind;
use crate::styled::StyledText;

const ERROR_COLOR: Argb = Argb(0xFFFF_0000);
const ERROR_BACKGROUND: Argb = Argb(0xFF00_0000);
const UNKNOWN_COLOR: Argb = Argb(0xFF00_FFFF);

pub struct Renderer {
    config: RendererConfig,
    highlighter: Box<dyn CodeHighlighter>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&RendererConfig::default())
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new(config: &RendererConfig) -> Self {
        Self::with_highlighter(config, SyntectHighlighter::new(config.clone()))
    }

    pub fn with_highlighter(
        config: &RendererConfig,
        highlighter: impl CodeHighlighter + 'static,
    ) -> Self {
        Self {
            config: config.clone(),
            highlighter: Box::new(highlighter),
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// A top-level context using the configured palette.
    pub fn context(&self) -> RenderContext {
        RenderContext::with_palette(self.config.palette)
    }

    /// Render a whole message. Never fails: broken nodes show up as error
    /// markers in the output.
    pub fn render_document(&self, parsed: &ParsedMessage, ctx: &RenderContext) -> StyledDocument {
        let root = parsed.syntax();
        StyledDocument::build(self.render_child(&root, ctx), ctx)
    }

    /// Parse and render `source` in one go.
    pub fn render_str(&self, source: &str, ctx: &RenderContext) -> StyledDocument {
        self.render_document(&ParsedMessage::parse(source), ctx)
    }

    /// Render one node and its subtree.
    pub fn render_node(
        &self,
        node: &SyntaxNode,
        ctx: &RenderContext,
    ) -> Result<StyledText, RenderAnomaly> {
        match NodeKind::of(node) {
            NodeKind::Root => Ok(self.root(node, ctx)),
            NodeKind::Paragraph | NodeKind::HtmlBlock | NodeKind::ListItem => {
                Ok(self.inline_children(node, ctx))
            }
            NodeKind::Heading => self.heading(node, ctx),
            NodeKind::ThematicBreak => Ok(self.thematic_break()),
            NodeKind::FencedCode => Ok(self.fenced_code(node, ctx)),
            NodeKind::BlockQuote => Ok(self.block_quote(node, ctx)),
            NodeKind::List { .. } => Ok(self.inline_children(node, &ctx.in_list())),
            NodeKind::LinkDefinition => Ok(self.literal(&node.text().to_string(), ctx)),
            NodeKind::Emphasis => self.delimited(node, ctx, SpanStyle::italic()),
            NodeKind::Strong => self.delimited(node, ctx, SpanStyle::bold()),
            NodeKind::Strikethrough => self.delimited(node, ctx, SpanStyle::strikethrough()),
            NodeKind::CodeSpan => self.code_span(node, ctx),
            NodeKind::InlineLink => self.inline_link(node, ctx),
            NodeKind::Image => self.image(node),
            NodeKind::Autolink => Ok(self.autolink(node, ctx)),
            NodeKind::UserMention => self.user_mention(node, ctx),
            NodeKind::ChannelMention => self.channel_mention(node, ctx),
            NodeKind::CustomEmote => self.custom_emote(node),
            NodeKind::Timestamp => self.timestamp(node),
            NodeKind::Unknown(name) => Ok(self.unknown(node, ctx, &name)),
        }
    }

    /// Render a child node, replacing a failure with an error marker.
    fn render_child(&self, node: &SyntaxNode, ctx: &RenderContext) -> StyledText {
        self.render_node(node, ctx)
            .unwrap_or_else(|err| self.failed(node, &err))
    }

    /// Render a sequence of children inline, one after the other.
    fn render_elements(
        &self,
        elements: impl IntoIterator<Item = SyntaxElement>,
        ctx: &RenderContext,
    ) -> StyledText {
        let mut out = StyledText::new();
        for element in elements {
            match element {
                rowan::NodeOrToken::Node(node) => out.append(self.render_child(&node, ctx)),
                rowan::NodeOrToken::Token(token) => out.append(self.render_token(&token, ctx)),
            }
        }
        out
    }

    fn inline_children(&self, node: &SyntaxNode, ctx: &RenderContext) -> StyledText {
        self.render_elements(node.children_with_tokens(), ctx)
    }

    fn failed(&self, node: &SyntaxNode, err: &RenderAnomaly) -> StyledText {
        log::error!(target: "jbm_render", "failed to render {:?}: {err}", node.kind());
        StyledText::styled(
            &format!("[{:?}] Error: {err}", node.kind()),
            SpanStyle {
                color: Some(ERROR_COLOR),
                background: Some(ERROR_BACKGROUND),
                ..SpanStyle::default()
            },
        )
    }

    /// Kinds without a rendering rule show up wrapped in their name.
    fn unknown(&self, node: &SyntaxNode, ctx: &RenderContext, name: &str) -> StyledText {
        log::debug!("no rendering rule for {name}");
        let mut out = StyledText::plain(&format!("[{name}]{{\n"));
        out.append(self.inline_children(node, ctx));
        out.push_str("\n}");
        out.apply(&SpanStyle::color(UNKNOWN_COLOR));
        out
    }
}
