//! Block layout: headings, code blocks, quotes, and the flow of blocks
//! inside the root and inside quotes.

use jbm_syntax::{SyntaxElement, SyntaxKind, SyntaxNode};
use rowan::NodeOrToken;

use super::Renderer;
use crate::context::RenderContext;
use crate::document::{BlockKind, SpanStyle};
use crate::error::RenderAnomaly;
use crate::highlight::Highlighted;
use crate::node::NodeKind;
use crate::styled::StyledText;

/// Quotes nested deeper than this render as empty containers.
pub const MAX_QUOTE_NESTING: usize = 5;

/// Heading sizes in sp for levels 1 to 6, before scaling.
const HEADING_SIZES: [f32; 6] = [32.0, 24.0, 20.0, 16.0, 14.0, 12.0];

const SPACER_BEFORE_HEADING: f32 = 8.0;
const SPACER_AFTER_BLOCK: f32 = 4.0;

impl Renderer {
    pub(super) fn root(&self, node: &SyntaxNode, ctx: &RenderContext) -> StyledText {
        if ctx.embedded {
            return node
                .children()
                .next()
                .map(|first| self.block_child(&first, ctx))
                .unwrap_or_default();
        }
        self.block_flow(node.children_with_tokens(), ctx)
    }

    /// Blocks one after another, each on its own line. Line endings
    /// between blocks become spacers.
    fn block_flow(
        &self,
        elements: impl IntoIterator<Item = SyntaxElement>,
        ctx: &RenderContext,
    ) -> StyledText {
        let mut out = StyledText::new();
        for element in elements {
            match element {
                NodeOrToken::Node(node) => out.push_block(self.block_child(&node, ctx)),
                NodeOrToken::Token(token) => match token.kind() {
                    SyntaxKind::NEWLINE => out.push_marker_frame(BlockKind::Spacer {
                        height: SPACER_AFTER_BLOCK,
                    }),
                    SyntaxKind::WHITESPACE => {}
                    kind if kind.is_container_prefix() => {}
                    _ => {
                        let mut text = self.render_token(&token, ctx);
                        text.apply(&font_size(ctx.scaled_font_size()));
                        text.frame(BlockKind::Text);
                        out.push_block(text);
                    }
                },
            }
        }
        out
    }

    /// Render a node in block position and give it a frame if it does not
    /// lay itself out.
    fn block_child(&self, node: &SyntaxNode, ctx: &RenderContext) -> StyledText {
        let kind = NodeKind::of(node);
        let (mut out, diagnostic) = match self.render_node(node, ctx) {
            Ok(out) => (out, matches!(kind, NodeKind::Unknown(_))),
            Err(err) => (self.failed(node, &err), true),
        };

        let laid_out = matches!(
            kind,
            NodeKind::Heading
                | NodeKind::FencedCode
                | NodeKind::BlockQuote
                | NodeKind::ThematicBreak
        );
        if diagnostic {
            out.frame(BlockKind::Diagnostic);
        } else if !laid_out && !out.is_empty() {
            out.apply(&font_size(ctx.scaled_font_size()));
            out.frame(BlockKind::Text);
        }
        out
    }

    pub(super) fn heading(
        &self,
        node: &SyntaxNode,
        ctx: &RenderContext,
    ) -> Result<StyledText, RenderAnomaly> {
        let mut children = node.children_with_tokens();
        let marker = children
            .by_ref()
            .find(|e| e.kind() == SyntaxKind::ATX_HEADER)
            .ok_or(RenderAnomaly::MissingChild {
                kind: SyntaxKind::HEADING,
                child: SyntaxKind::ATX_HEADER,
            })?;
        let level = marker.as_token().map_or(0, |t| t.text().len());
        if !(1..=HEADING_SIZES.len()).contains(&level) {
            return Err(RenderAnomaly::InvalidHeadingLevel(level));
        }

        let size = if ctx.embedded {
            ctx.scaled_font_size()
        } else {
            HEADING_SIZES[level - 1] * ctx.font_size_multiplier
        };

        let content = children.skip_while(|e| e.kind() == SyntaxKind::WHITESPACE);
        let mut text = self.render_elements(content, ctx);
        text.apply(&SpanStyle {
            bold: true,
            font_size: Some(size),
            ..SpanStyle::default()
        });
        text.frame(BlockKind::Heading {
            level: level as u8,
            font_size: size,
        });

        let mut out = StyledText::new();
        if follows_content(node) {
            out.push_marker_frame(BlockKind::Spacer {
                height: SPACER_BEFORE_HEADING,
            });
        }
        out.append(text);
        out.push_marker_frame(BlockKind::Spacer {
            height: SPACER_AFTER_BLOCK,
        });
        Ok(out)
    }

    pub(super) fn thematic_break(&self) -> StyledText {
        let mut out = StyledText::new();
        out.push_marker_frame(BlockKind::Rule);
        out
    }

    pub(super) fn fenced_code(&self, node: &SyntaxNode, ctx: &RenderContext) -> StyledText {
        let tokens: Vec<_> = node
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .collect();

        let language = tokens
            .iter()
            .find(|t| t.kind() == SyntaxKind::FENCE_LANG)
            .and_then(|t| t.text().split_whitespace().next().map(str::to_string));
        let closed = tokens.iter().any(|t| t.kind() == SyntaxKind::FENCE_END);

        let mut code = String::new();
        for token in &tokens {
            match token.kind() {
                SyntaxKind::FENCE_CONTENT => code.push_str(token.text()),
                SyntaxKind::NEWLINE => code.push('\n'),
                _ => {}
            }
        }
        let mut code = code.trim().to_string();
        if ctx.embedded {
            code = code.replace('\n', " ");
        }

        // An unterminated fence is still being typed; leave it uncoloured
        let highlighted = if closed {
            self.highlighter
                .highlight(&code, language.as_deref(), ctx.dark_theme)
                .unwrap_or_else(|err| {
                    log::debug!("highlighting fell back to plain text: {err}");
                    Highlighted::plain(&code)
                })
        } else {
            Highlighted::plain(&code)
        };

        let base = SpanStyle {
            monospace: true,
            font_size: Some(ctx.scaled_font_size()),
            ..SpanStyle::default()
        };
        let mut out = StyledText::new();
        let mut at = 0;
        for span in &highlighted.spans {
            if span.range.start < at || span.range.end > highlighted.text.len() {
                continue;
            }
            out.push_styled(&highlighted.text[at..span.range.start], base);
            out.push_styled(
                &highlighted.text[span.range.clone()],
                SpanStyle {
                    color: Some(span.color),
                    bold: span.bold,
                    ..base
                },
            );
            at = span.range.end;
        }
        out.push_styled(&highlighted.text[at..], base);

        let label = highlighted
            .language
            .clone()
            .unwrap_or_else(|| "default".to_string());
        out.frame(BlockKind::CodeBlock {
            language: highlighted.language,
            label,
        });
        out
    }

    pub(super) fn block_quote(&self, node: &SyntaxNode, ctx: &RenderContext) -> StyledText {
        let depth = ctx.quote_depth + 1;
        if ctx.quote_depth >= MAX_QUOTE_NESTING {
            let mut out = StyledText::new();
            out.frame(BlockKind::Quote { depth });
            return out;
        }

        let inner = ctx.in_quote();
        let mut out = if ctx.embedded {
            node.children()
                .next()
                .map(|first| self.block_child(&first, &inner))
                .unwrap_or_default()
        } else {
            self.block_flow(node.children_with_tokens(), &inner)
        };
        out.deepen_quotes();
        out.frame(BlockKind::Quote { depth });
        out
    }
}

fn font_size(size: f32) -> SpanStyle {
    SpanStyle {
        font_size: Some(size),
        ..SpanStyle::default()
    }
}

/// Whether anything other than indentation or quote markers comes before
/// `node` in the document.
fn follows_content(node: &SyntaxNode) -> bool {
    let Some(first) = node.first_token() else {
        return false;
    };
    std::iter::successors(first.prev_token(), |t| t.prev_token()).any(|t| {
        !matches!(t.kind(), SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE)
            && !t.kind().is_container_prefix()
    })
}
