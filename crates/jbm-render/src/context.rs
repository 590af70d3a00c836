use jbm_config::Palette;

/// Base text size in sp when the host does not supply one.
pub const DEFAULT_FONT_SIZE: f32 = 14.0;

/// Settings threaded down the render walk.
///
/// Nodes that change a setting derive a copy for their subtree; a parent's
/// context is never modified by its children.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    /// Enclosing lists
    pub list_depth: usize,
    /// Enclosing block quotes
    pub quote_depth: usize,
    pub font_size_multiplier: f32,
    /// The host's body text size in sp
    pub font_size: f32,
    pub links_clickable: bool,
    pub current_server_id: Option<String>,
    /// Render only the first top-level block, with newlines flattened
    pub embedded: bool,
    /// Limit the document to one ellipsized line
    pub single_line: bool,
    pub palette: Palette,
    /// Pick the dark highlighting theme
    pub dark_theme: bool,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            list_depth: 0,
            quote_depth: 0,
            font_size_multiplier: 1.0,
            font_size: DEFAULT_FONT_SIZE,
            links_clickable: true,
            current_server_id: None,
            embedded: false,
            single_line: false,
            palette: Palette::default(),
            dark_theme: false,
        }
    }
}

impl RenderContext {
    pub fn with_palette(palette: Palette) -> Self {
        Self {
            palette,
            ..Self::default()
        }
    }

    /// Context for the children of a list.
    pub fn in_list(&self) -> Self {
        Self {
            list_depth: self.list_depth + 1,
            ..self.clone()
        }
    }

    /// Context for the children of a block quote.
    pub fn in_quote(&self) -> Self {
        Self {
            quote_depth: self.quote_depth + 1,
            ..self.clone()
        }
    }

    /// Body text size after scaling.
    pub fn scaled_font_size(&self) -> f32 {
        self.font_size * self.font_size_multiplier
    }
}
