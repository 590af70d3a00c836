//! The extension set a parse runs with.

/// Which dialect extensions the grammar recognises.
///
/// Base syntax (headings, emphasis, strong, code, fences, lists, quotes,
/// inline links, `<…>` autolinks, HTML blocks) is always on. A disabled
/// extension leaves its characters as plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flavor {
    /// `~~struck~~`
    pub strikethrough: bool,
    /// Bare `http(s)://` URLs without angle brackets
    pub gfm_autolinks: bool,
    /// `[ ]` / `[x]` after a list marker
    pub checkboxes: bool,
    /// Pipe tables
    pub tables: bool,
    /// Mentions `<@ID>` / `<#ID>`, emotes `:ID:` and timestamps `<t:N:S>`
    pub chat_tokens: bool,
}

impl Flavor {
    /// Plain Markdown, no extensions.
    pub const fn commonmark() -> Self {
        Self {
            strikethrough: false,
            gfm_autolinks: false,
            checkboxes: false,
            tables: false,
            chat_tokens: false,
        }
    }
}

impl Default for Flavor {
    fn default() -> Self {
        Self {
            strikethrough: true,
            gfm_autolinks: true,
            checkboxes: true,
            tables: true,
            chat_tokens: true,
        }
    }
}
