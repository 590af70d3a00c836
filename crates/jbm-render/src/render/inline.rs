//! Inline rendering: tokens, delimited spans, links and chat tokens.

use chrono::DateTime;
use jbm_syntax::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

use super::Renderer;
use crate::context::RenderContext;
use crate::document::{AnnotationKind, PlaceholderKind, SpanStyle};
use crate::error::RenderAnomaly;
use crate::styled::StyledText;

const EMPHASIS_DELIMITERS: &[SyntaxKind] = &[SyntaxKind::STAR, SyntaxKind::UNDERSCORE];
const STRIKETHROUGH_DELIMITERS: &[SyntaxKind] = &[SyntaxKind::TILDE];
const LINK_TEXT_DELIMITERS: &[SyntaxKind] = &[SyntaxKind::LBRACKET, SyntaxKind::RBRACKET];

impl Renderer {
    pub(super) fn render_token(&self, token: &SyntaxToken, ctx: &RenderContext) -> StyledText {
        match token.kind() {
            SyntaxKind::NEWLINE if ctx.embedded => StyledText::plain(" "),
            SyntaxKind::NEWLINE => StyledText::plain("\n"),
            SyntaxKind::ATX_HEADER | SyntaxKind::EOF => StyledText::new(),
            kind if kind.is_container_prefix() => StyledText::new(),
            SyntaxKind::LIST_BULLET => {
                StyledText::plain(&format!("{} • ", " ".repeat(ctx.list_depth)))
            }
            SyntaxKind::LIST_NUMBER => StyledText::styled(
                &format!("{}{} ", " ".repeat(ctx.list_depth), token.text().trim()),
                SpanStyle {
                    tabular_figures: true,
                    ..SpanStyle::default()
                },
            ),
            SyntaxKind::CHECK_BOX => checkbox(token.text()),
            SyntaxKind::GFM_AUTOLINK => url_text(token.text(), token.text(), ctx),
            // Escapes are always `\` plus one ASCII byte.
            SyntaxKind::ESCAPE => StyledText::plain(&token.text()[1..]),
            _ => self.literal(token.text(), ctx),
        }
    }

    /// Source text as-is; embedded previews flatten line breaks.
    pub(super) fn literal(&self, text: &str, ctx: &RenderContext) -> StyledText {
        if ctx.embedded && text.contains('\n') {
            StyledText::plain(&text.replace("\r\n", " ").replace('\n', " "))
        } else {
            StyledText::plain(text)
        }
    }

    /// Emphasis, strong and strikethrough: drop the delimiter tokens at each
    /// end and style what is between.
    pub(super) fn delimited(
        &self,
        node: &SyntaxNode,
        ctx: &RenderContext,
        style: SpanStyle,
    ) -> Result<StyledText, RenderAnomaly> {
        let (count, delimiters) = match node.kind() {
            SyntaxKind::EMPHASIS => (1, EMPHASIS_DELIMITERS),
            SyntaxKind::STRIKETHROUGH => (2, STRIKETHROUGH_DELIMITERS),
            _ => (2, EMPHASIS_DELIMITERS),
        };
        let inner = strip_delimiters(node, count, delimiters)?;
        let mut out = self.render_elements(inner, ctx);
        out.apply(&style);
        Ok(out)
    }

    /// Code spans are literal between backtick runs of equal length.
    pub(super) fn code_span(
        &self,
        node: &SyntaxNode,
        ctx: &RenderContext,
    ) -> Result<StyledText, RenderAnomaly> {
        let ticks = node
            .children_with_tokens()
            .take_while(|e| e.kind() == SyntaxKind::BACKTICK)
            .count();
        let inner = strip_delimiters(node, ticks.max(1), &[SyntaxKind::BACKTICK])?;
        let text: String = inner
            .iter()
            .filter_map(|e| e.as_token().map(|t| t.text().to_string()))
            .collect();
        let mut out = self.literal(&text, ctx);
        out.apply(&SpanStyle::monospace());
        Ok(out)
    }

    pub(super) fn inline_link(
        &self,
        node: &SyntaxNode,
        ctx: &RenderContext,
    ) -> Result<StyledText, RenderAnomaly> {
        let link_text = child_node(node, SyntaxKind::LINK_TEXT)?;
        let inner = strip_delimiters(&link_text, 1, LINK_TEXT_DELIMITERS)?;

        let mut out = self.render_elements(inner, ctx);
        out.apply(&SpanStyle::color(ctx.palette.clickable));
        match destination(node) {
            Some(url) => {
                out.annotate_all(AnnotationKind::Url, &url);
            }
            None => log::debug!("link without destination: {}", node.text()),
        }
        Ok(out)
    }

    pub(super) fn image(&self, node: &SyntaxNode) -> Result<StyledText, RenderAnomaly> {
        let link = child_node(node, SyntaxKind::INLINE_LINK)?;
        let link_text = child_node(&link, SyntaxKind::LINK_TEXT)?;
        let alt: String = strip_delimiters(&link_text, 1, LINK_TEXT_DELIMITERS)?
            .iter()
            .map(element_text)
            .collect();
        let url = destination(&link).unwrap_or_default();

        let mut out = StyledText::new();
        let anchor = out.push_placeholder(PlaceholderKind::Image {
            url: url.clone(),
            alt,
        });
        if !url.is_empty() {
            out.annotate(AnnotationKind::Url, anchor, &url);
        }
        Ok(out)
    }

    pub(super) fn autolink(&self, node: &SyntaxNode, ctx: &RenderContext) -> StyledText {
        let text = node.text().to_string();
        let url = strip_angle_brackets(&text);
        url_text(url, url, ctx)
    }

    pub(super) fn user_mention(
        &self,
        node: &SyntaxNode,
        ctx: &RenderContext,
    ) -> Result<StyledText, RenderAnomaly> {
        let token = child_token(node, SyntaxKind::TEXT)?;
        let id = token.text().trim_start_matches('@');
        Ok(mention(
            &format!("@{id}"),
            AnnotationKind::UserMention,
            id,
            ctx,
        ))
    }

    pub(super) fn channel_mention(
        &self,
        node: &SyntaxNode,
        ctx: &RenderContext,
    ) -> Result<StyledText, RenderAnomaly> {
        let token = child_token(node, SyntaxKind::TEXT)?;
        let id = token.text();
        Ok(mention(
            &format!("#{id}"),
            AnnotationKind::ChannelMention,
            id,
            ctx,
        ))
    }

    pub(super) fn custom_emote(&self, node: &SyntaxNode) -> Result<StyledText, RenderAnomaly> {
        let id = child_token(node, SyntaxKind::TEXT)?.text().to_string();
        let mut out = StyledText::new();
        let anchor = out.push_placeholder(PlaceholderKind::CustomEmote { id: id.clone() });
        out.annotate(AnnotationKind::CustomEmote, anchor, &id);
        Ok(out)
    }

    pub(super) fn timestamp(&self, node: &SyntaxNode) -> Result<StyledText, RenderAnomaly> {
        // `<t:SECONDS>` or `<t:SECONDS:STYLE>`
        let parts: Vec<String> = node
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == SyntaxKind::TEXT)
            .map(|t| t.text().to_string())
            .collect();
        let seconds = parts.get(1).ok_or(RenderAnomaly::MissingChild {
            kind: SyntaxKind::TIMESTAMP,
            child: SyntaxKind::TEXT,
        })?;
        let style = parts.get(2).and_then(|s| s.chars().next());

        let formatted = seconds
            .parse::<i64>()
            .ok()
            .and_then(|secs| format_timestamp(secs, style))
            .ok_or_else(|| RenderAnomaly::InvalidTimestamp(seconds.clone()))?;

        let payload = match style {
            Some(style) => format!("{seconds}:{style}"),
            None => seconds.clone(),
        };
        let mut out = StyledText::plain(&formatted);
        out.annotate_all(AnnotationKind::Timestamp, &payload);
        Ok(out)
    }
}

/// Format a Unix timestamp in UTC for a display style letter.
///
/// `R` (relative) is formatted like `f`; showing "3 hours ago" is up to the
/// host, which knows the current time.
pub fn format_timestamp(seconds: i64, style: Option<char>) -> Option<String> {
    let time = DateTime::from_timestamp(seconds, 0)?;
    let pattern = match style {
        Some('t') => "%H:%M",
        Some('T') => "%H:%M:%S",
        Some('d') => "%d/%m/%Y",
        Some('D') => "%-d %B %Y",
        Some('F') => "%A, %-d %B %Y %H:%M",
        _ => "%-d %B %Y %H:%M",
    };
    Some(time.format(pattern).to_string())
}

/// Children of `node` without `count` delimiter tokens at each end.
fn strip_delimiters(
    node: &SyntaxNode,
    count: usize,
    delimiters: &[SyntaxKind],
) -> Result<Vec<SyntaxElement>, RenderAnomaly> {
    let children: Vec<SyntaxElement> = node.children_with_tokens().collect();
    let is_delimiter = |e: &SyntaxElement| delimiters.contains(&e.kind());

    let len = children.len();
    let wrapped = len >= count * 2
        && children[..count].iter().all(is_delimiter)
        && children[len - count..].iter().all(is_delimiter);
    if !wrapped {
        return Err(RenderAnomaly::MissingDelimiters {
            kind: node.kind(),
            expected: count,
        });
    }
    Ok(children[count..len - count].to_vec())
}

fn child_node(node: &SyntaxNode, kind: SyntaxKind) -> Result<SyntaxNode, RenderAnomaly> {
    node.children()
        .find(|n| n.kind() == kind)
        .ok_or(RenderAnomaly::MissingChild {
            kind: node.kind(),
            child: kind,
        })
}

fn child_token(node: &SyntaxNode, kind: SyntaxKind) -> Result<SyntaxToken, RenderAnomaly> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
        .ok_or(RenderAnomaly::MissingChild {
            kind: node.kind(),
            child: kind,
        })
}

fn element_text(element: &SyntaxElement) -> String {
    match element {
        rowan::NodeOrToken::Node(node) => node.text().to_string(),
        rowan::NodeOrToken::Token(token) => token.text().to_string(),
    }
}

/// Destination of a link: explicit, or an autolink inside the parentheses.
fn destination(link: &SyntaxNode) -> Option<String> {
    link.children()
        .find(|n| matches!(n.kind(), SyntaxKind::LINK_DESTINATION | SyntaxKind::AUTOLINK))
        .map(|n| strip_angle_brackets(&n.text().to_string()).to_string())
        .filter(|url| !url.is_empty())
}

fn strip_angle_brackets(text: &str) -> &str {
    text.strip_prefix('<')
        .and_then(|t| t.strip_suffix('>'))
        .unwrap_or(text)
}

/// `text` in the clickable colour, annotated as a link to `url`.
fn url_text(text: &str, url: &str, ctx: &RenderContext) -> StyledText {
    let mut out = StyledText::styled(text, SpanStyle::color(ctx.palette.clickable));
    out.annotate_all(AnnotationKind::Url, url);
    out
}

fn mention(text: &str, kind: AnnotationKind, id: &str, ctx: &RenderContext) -> StyledText {
    let mut out = StyledText::styled(
        text,
        SpanStyle {
            color: Some(ctx.palette.clickable),
            background: Some(ctx.palette.clickable_background),
            ..SpanStyle::default()
        },
    );
    out.annotate_all(kind, id);
    out
}

fn checkbox(text: &str) -> StyledText {
    let checked = text.trim() != "[ ]";
    let mut out = StyledText::new();
    let anchor = out.push_placeholder(PlaceholderKind::Checkbox { checked });
    out.annotate(
        AnnotationKind::Checkbox,
        anchor,
        if checked { "true" } else { "false" },
    );
    out.push_str(" ");
    out
}
