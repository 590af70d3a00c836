//! Syntax highlighting for fenced code blocks.
//!
//! The renderer talks to a [`CodeHighlighter`]; the default one is backed by
//! syntect with the extended syntax set from two-face (TypeScript, Kotlin,
//! and friends are missing from syntect's own set).

use std::ops::Range;
use std::sync::OnceLock;

use jbm_config::{Argb, RendererConfig};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, FontStyle, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::error::RenderAnomaly;

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(two_face::syntax::extra_newlines)
}

fn theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    pub range: Range<usize>,
    pub color: Argb,
    pub bold: bool,
}

/// Code with colour spans over byte ranges of `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighted {
    pub text: String,
    pub spans: Vec<HighlightSpan>,
    /// Display name of the language used, `None` when nothing resolved
    pub language: Option<String>,
}

impl Highlighted {
    /// Unstyled code.
    pub fn plain(code: &str) -> Self {
        Self {
            text: code.to_string(),
            spans: Vec::new(),
            language: None,
        }
    }
}

pub trait CodeHighlighter: Send + Sync {
    /// Highlight `code` in the language named by `language`.
    ///
    /// An unknown language is not an error: the result is unstyled with
    /// `language: None`.
    fn highlight(
        &self,
        code: &str,
        language: Option<&str>,
        dark: bool,
    ) -> Result<Highlighted, RenderAnomaly>;
}

/// [`CodeHighlighter`] backed by syntect.
#[derive(Debug, Clone, Default)]
pub struct SyntectHighlighter {
    config: RendererConfig,
}

impl SyntectHighlighter {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Resolve a fence language: alias table, then syntax name ignoring
    /// case, then file extension.
    pub fn find_syntax(&self, hint: &str) -> Option<&'static SyntaxReference> {
        let set = syntax_set();
        let hint = hint.trim();
        if hint.is_empty() {
            return None;
        }

        if let Some(name) = self.config.resolve_alias(hint) {
            match set.find_syntax_by_name(name) {
                Some(syntax) => return Some(syntax),
                None => log::warn!("language alias {hint:?} names unknown syntax {name:?}"),
            }
        }

        set.syntaxes()
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(hint))
            .or_else(|| set.find_syntax_by_token(hint))
    }

    fn theme(&self, dark: bool) -> Option<&'static Theme> {
        let name = self.config.theme_name(dark);
        let theme = theme_set().themes.get(name);
        if theme.is_none() {
            log::warn!("unknown highlighting theme {name:?}");
        }
        theme
    }
}

fn argb(color: Color) -> Argb {
    Argb(
        (color.a as u32) << 24 | (color.r as u32) << 16 | (color.g as u32) << 8 | color.b as u32,
    )
}

impl CodeHighlighter for SyntectHighlighter {
    fn highlight(
        &self,
        code: &str,
        language: Option<&str>,
        dark: bool,
    ) -> Result<Highlighted, RenderAnomaly> {
        let Some(syntax) = language.and_then(|hint| self.find_syntax(hint)) else {
            return Ok(Highlighted::plain(code));
        };
        let Some(theme) = self.theme(dark) else {
            return Ok(Highlighted::plain(code));
        };

        let set = syntax_set();
        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut spans = Vec::new();
        let mut offset = 0;

        for line in LinesWithEndings::from(code) {
            let ranges = highlighter
                .highlight_line(line, set)
                .map_err(|err| RenderAnomaly::Highlight {
                    language: syntax.name.clone(),
                    message: err.to_string(),
                })?;
            for (style, piece) in ranges {
                let end = offset + piece.len();
                if !piece.trim().is_empty() {
                    spans.push(HighlightSpan {
                        range: offset..end,
                        color: argb(style.foreground),
                        bold: style.font_style.contains(FontStyle::BOLD),
                    });
                }
                offset = end;
            }
        }

        Ok(Highlighted {
            text: code.to_string(),
            spans,
            language: Some(syntax.name.clone()),
        })
    }
}
