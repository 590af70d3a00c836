//! Classification of tree nodes for render dispatch.

use jbm_syntax::{SyntaxKind, SyntaxNode};

/// Node kinds the renderer knows how to draw.
///
/// Everything else, tables included, is [`NodeKind::Unknown`] and renders as
/// a visible diagnostic wrapper around its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Paragraph,
    Heading,
    ThematicBreak,
    FencedCode,
    HtmlBlock,
    BlockQuote,
    List { ordered: bool },
    ListItem,
    LinkDefinition,
    Emphasis,
    Strong,
    Strikethrough,
    CodeSpan,
    InlineLink,
    Image,
    Autolink,
    UserMention,
    ChannelMention,
    CustomEmote,
    Timestamp,
    /// Raw name of the syntax kind
    Unknown(String),
}

impl NodeKind {
    pub fn of(node: &SyntaxNode) -> Self {
        Self::from_kind(node.kind())
    }

    pub fn from_kind(kind: SyntaxKind) -> Self {
        match kind {
            SyntaxKind::ROOT => Self::Root,
            SyntaxKind::PARAGRAPH => Self::Paragraph,
            SyntaxKind::HEADING => Self::Heading,
            SyntaxKind::THEMATIC_BREAK => Self::ThematicBreak,
            SyntaxKind::FENCED_CODE => Self::FencedCode,
            SyntaxKind::HTML_BLOCK => Self::HtmlBlock,
            SyntaxKind::BLOCK_QUOTE => Self::BlockQuote,
            SyntaxKind::UNORDERED_LIST => Self::List { ordered: false },
            SyntaxKind::ORDERED_LIST => Self::List { ordered: true },
            SyntaxKind::LIST_ITEM => Self::ListItem,
            SyntaxKind::LINK_DEFINITION => Self::LinkDefinition,
            SyntaxKind::EMPHASIS => Self::Emphasis,
            SyntaxKind::STRONG => Self::Strong,
            SyntaxKind::STRIKETHROUGH => Self::Strikethrough,
            SyntaxKind::CODE_SPAN => Self::CodeSpan,
            SyntaxKind::INLINE_LINK => Self::InlineLink,
            SyntaxKind::IMAGE => Self::Image,
            SyntaxKind::AUTOLINK => Self::Autolink,
            SyntaxKind::USER_MENTION => Self::UserMention,
            SyntaxKind::CHANNEL_MENTION => Self::ChannelMention,
            SyntaxKind::CUSTOM_EMOTE => Self::CustomEmote,
            SyntaxKind::TIMESTAMP => Self::Timestamp,
            other => Self::Unknown(format!("{other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SyntaxKind::TABLE, "TABLE")]
    #[case(SyntaxKind::TABLE_ROW, "TABLE_ROW")]
    #[case(SyntaxKind::ERROR, "ERROR")]
    fn unhandled_kinds_keep_their_name(#[case] kind: SyntaxKind, #[case] name: &str) {
        assert_eq!(NodeKind::from_kind(kind), NodeKind::Unknown(name.to_string()));
    }

    #[test]
    fn list_orderedness() {
        assert_eq!(
            NodeKind::from_kind(SyntaxKind::ORDERED_LIST),
            NodeKind::List { ordered: true }
        );
    }
}
