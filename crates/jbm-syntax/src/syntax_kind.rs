//! SyntaxKind enum for all tokens and nodes in the chat Markdown CST.
//!
//! Tokens and nodes share a single enum. Every byte in the source must
//! appear as a token in the tree.

/// All syntax kinds for the chat Markdown CST.
///
/// The first group are raw lexer tokens, the second group are composite
/// tokens the grammar produces by regrouping raw tokens (delimiter runs,
/// list markers, fence lines), the last group are nodes.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Tokens (lexer output) ===
    /// Horizontal whitespace (spaces, tabs)
    WHITESPACE,
    /// Line ending
    NEWLINE,
    /// Plain text content
    TEXT,
    /// `>` for block quotes and autolinks
    GT,
    /// `<` for autolinks, mentions and HTML
    LT,
    /// `-` for lists and thematic breaks
    DASH,
    /// `*` for lists, emphasis and thematic breaks
    STAR,
    /// `_` for emphasis
    UNDERSCORE,
    /// `+` for lists
    PLUS,
    /// Single backtick
    BACKTICK,
    /// `~` for fences and strikethrough
    TILDE,
    /// `[`
    LBRACKET,
    /// `]`
    RBRACKET,
    /// `(`
    LPAREN,
    /// `)`
    RPAREN,
    /// `#` for headings and channel mentions
    HASH,
    /// `|` for tables
    PIPE,
    /// `!` for images
    EXCLAIM,
    /// `:` for emotes, timestamps and link definitions
    COLON,
    /// `"`
    DOUBLE_QUOTE,
    /// `'`
    SINGLE_QUOTE,
    /// `$`
    DOLLAR,
    /// `\` followed by ASCII punctuation; the character is literal
    ESCAPE,
    /// Bare `http://` or `https://` URL
    GFM_AUTOLINK,

    // === Composite tokens (grammar output) ===
    /// The `#` run opening an ATX heading
    ATX_HEADER,
    /// A bullet list marker including its trailing space
    LIST_BULLET,
    /// An ordered list marker (`1.`, `2)`) including its trailing space
    LIST_NUMBER,
    /// `[ ]` or `[x]` directly after a list marker
    CHECK_BOX,
    /// Opening fence run
    FENCE_START,
    /// Fence info string
    FENCE_LANG,
    /// One line of fenced code
    FENCE_CONTENT,
    /// Closing fence run
    FENCE_END,
    /// `>` consumed as a block quote prefix
    BLOCK_QUOTE_MARKER,
    /// Container indentation that carries no content
    INDENT,
    /// End of file marker
    EOF,

    // === Composite Nodes (parser output) ===
    /// Root document node
    ROOT,
    /// Paragraph block
    PARAGRAPH,
    /// ATX heading (`# ...`)
    HEADING,
    /// Thematic break (`---`, `***`)
    THEMATIC_BREAK,
    /// Fenced code block
    FENCED_CODE,
    /// Raw HTML block, kept literal
    HTML_BLOCK,
    /// Block quote container (`> ...`)
    BLOCK_QUOTE,
    /// Bullet list
    UNORDERED_LIST,
    /// Numbered list
    ORDERED_LIST,
    /// Individual list item
    LIST_ITEM,
    /// `[label]: destination`
    LINK_DEFINITION,
    /// GFM table
    TABLE,
    /// One table line
    TABLE_ROW,
    /// Emphasis `*text*`
    EMPHASIS,
    /// Strong emphasis `**text**`
    STRONG,
    /// Strikethrough `~~text~~`
    STRIKETHROUGH,
    /// Inline code span
    CODE_SPAN,
    /// Inline link `[text](dest)`
    INLINE_LINK,
    /// `[text]` part of a link
    LINK_TEXT,
    /// `dest` part of a link
    LINK_DESTINATION,
    /// `"title"` part of a link
    LINK_TITLE,
    /// Image `![alt](dest)`
    IMAGE,
    /// Autolink `<scheme:...>`
    AUTOLINK,
    /// `<@ID>`
    USER_MENTION,
    /// `<#ID>`
    CHANNEL_MENTION,
    /// `:ID:`
    CUSTOM_EMOTE,
    /// `<t:SECONDS:STYLE>`
    TIMESTAMP,

    /// Error recovery node
    ERROR,
}

impl SyntaxKind {
    /// Returns true if this kind represents a token (lexer or grammar output).
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::EOF as u16)
    }

    /// Returns true if this kind represents a composite node.
    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    /// Returns true if this kind is trivia (whitespace/newlines).
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::NEWLINE)
    }

    /// Returns true for container prefix tokens that carry no content.
    pub fn is_container_prefix(self) -> bool {
        matches!(self, Self::BLOCK_QUOTE_MARKER | Self::INDENT)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChatMarkdownLang {}

impl rowan::Language for ChatMarkdownLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::ERROR as u16);
        // SAFETY: We check bounds above and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type alias for our syntax nodes.
pub type SyntaxNode = rowan::SyntaxNode<ChatMarkdownLang>;
/// Type alias for our syntax tokens.
pub type SyntaxToken = rowan::SyntaxToken<ChatMarkdownLang>;
/// Type alias for syntax elements (node or token).
pub type SyntaxElement = rowan::SyntaxElement<ChatMarkdownLang>;
