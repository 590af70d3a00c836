//! The styled document handed to the host for layout and paint.
//!
//! All offsets are UTF-8 byte offsets into [`StyledDocument::text`]. Hosts
//! whose text layout reports character indices convert them with
//! [`StyledDocument::char_to_byte_offset`] before hit-testing.

use std::collections::BTreeSet;
use std::ops::Range;

use jbm_config::Argb;
use serde::{Deserialize, Serialize};

use crate::context::RenderContext;
use crate::styled::StyledText;

/// Character standing in for inline non-text content.
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';

/// Visual attributes of a run of text.
///
/// `None`/`false` means "inherit from the host text style".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanStyle {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub monospace: bool,
    /// Fixed-width digits, for list numbers
    pub tabular_figures: bool,
    pub color: Option<Argb>,
    pub background: Option<Argb>,
    /// Size in sp
    pub font_size: Option<f32>,
}

impl SpanStyle {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Self::default()
        }
    }

    pub fn strikethrough() -> Self {
        Self {
            strikethrough: true,
            ..Self::default()
        }
    }

    pub fn monospace() -> Self {
        Self {
            monospace: true,
            ..Self::default()
        }
    }

    pub fn color(color: Argb) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    /// Layer `outer` underneath this style: attributes already set here win.
    pub fn inherit(&mut self, outer: &SpanStyle) {
        self.bold |= outer.bold;
        self.italic |= outer.italic;
        self.strikethrough |= outer.strikethrough;
        self.monospace |= outer.monospace;
        self.tabular_figures |= outer.tabular_figures;
        self.color = self.color.or(outer.color);
        self.background = self.background.or(outer.background);
        self.font_size = self.font_size.or(outer.font_size);
    }
}

/// What an annotated range points at.
///
/// Declaration order is hit-test priority: when several annotations cover
/// one offset, the earliest kind is the primary target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnnotationKind {
    Url,
    UserMention,
    ChannelMention,
    CustomEmote,
    Timestamp,
    Checkbox,
}

impl AnnotationKind {
    pub fn is_clickable(self) -> bool {
        matches!(
            self,
            Self::Url | Self::UserMention | Self::ChannelMention | Self::CustomEmote
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionAnnotation {
    pub kind: AnnotationKind,
    pub range: Range<usize>,
    pub payload: String,
    pub clickable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaceholderKind {
    Checkbox { checked: bool },
    CustomEmote { id: String },
    Image { url: String, alt: String },
}

/// Non-text content the host draws in place of an [`OBJECT_REPLACEMENT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlinePlaceholder {
    /// Position among the document's placeholders, stable across re-renders
    /// of the same source
    pub id: usize,
    /// Byte offset of the replacement character
    pub anchor: usize,
    pub kind: PlaceholderKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockKind {
    Text,
    Heading { level: u8, font_size: f32 },
    CodeBlock { language: Option<String>, label: String },
    Quote { depth: usize },
    Rule,
    Spacer { height: f32 },
    Diagnostic,
}

/// A block the host lays out around a range of the text.
///
/// Frames nest: a quote frame contains the frames of its children, listed
/// after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockFrame {
    pub kind: BlockKind,
    pub range: Range<usize>,
    /// Number of block quotes around this frame
    pub quote_depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overflow {
    Clip,
    Ellipsis,
}

/// A maximal run of text with one style and one set of annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRun {
    pub range: Range<usize>,
    pub style: SpanStyle,
    /// Indices into [`StyledDocument::annotations`]
    pub annotations: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyledDocument {
    pub text: String,
    pub runs: Vec<AnnotatedRun>,
    pub annotations: Vec<InteractionAnnotation>,
    pub placeholders: Vec<InlinePlaceholder>,
    pub blocks: Vec<BlockFrame>,
    pub line_limit: Option<usize>,
    pub overflow: Overflow,
    pub links_clickable: bool,
    pub current_server_id: Option<String>,
}

impl StyledDocument {
    pub(crate) fn build(fragment: StyledText, ctx: &RenderContext) -> Self {
        let (text, styles, annotations, anchors, blocks) = fragment.into_parts();
        let runs = split_runs(&styles, &annotations);
        let placeholders = anchors
            .into_iter()
            .enumerate()
            .map(|(id, (anchor, kind))| InlinePlaceholder { id, anchor, kind })
            .collect();

        let (line_limit, overflow) = if ctx.single_line {
            (Some(1), Overflow::Ellipsis)
        } else {
            (None, Overflow::Clip)
        };

        Self {
            text,
            runs,
            annotations,
            placeholders,
            blocks,
            line_limit,
            overflow,
            links_clickable: ctx.links_clickable,
            current_server_id: ctx.current_server_id.clone(),
        }
    }

    /// Byte offset of the character at `char_index`, clamped to the end.
    pub fn char_to_byte_offset(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(offset, _)| offset)
    }

    /// The run containing byte `offset`.
    pub fn run_at(&self, offset: usize) -> Option<&AnnotatedRun> {
        self.runs.iter().find(|run| run.range.contains(&offset))
    }

    pub fn placeholder_at(&self, offset: usize) -> Option<&InlinePlaceholder> {
        self.placeholders.iter().find(|p| p.anchor == offset)
    }
}

/// Cut the text into runs at every style and annotation boundary, then
/// merge neighbours that ended up identical.
///
/// `styles` are in text order. Annotation edges are sorted once and swept
/// alongside them, keeping the set of annotations open at the cursor.
fn split_runs(
    styles: &[(Range<usize>, SpanStyle)],
    annotations: &[InteractionAnnotation],
) -> Vec<AnnotatedRun> {
    // (offset, opens, index); closes sort before opens at the same offset.
    let mut edges: Vec<(usize, bool, usize)> = annotations
        .iter()
        .enumerate()
        .filter(|(_, a)| a.range.start < a.range.end)
        .flat_map(|(idx, a)| [(a.range.start, true, idx), (a.range.end, false, idx)])
        .collect();
    edges.sort_unstable();

    let mut open: BTreeSet<usize> = BTreeSet::new();
    let mut next_edge = 0;
    let mut runs: Vec<AnnotatedRun> = Vec::new();

    for (range, style) in styles {
        let mut start = range.start;
        while start < range.end {
            while let Some(&(at, opens, idx)) = edges.get(next_edge) {
                if at > start {
                    break;
                }
                if opens {
                    open.insert(idx);
                } else {
                    open.remove(&idx);
                }
                next_edge += 1;
            }
            let end = edges
                .get(next_edge)
                .map_or(range.end, |&(at, _, _)| at.min(range.end));

            let covering: Vec<usize> = open.iter().copied().collect();
            match runs.last_mut() {
                Some(last)
                    if last.range.end == start
                        && last.style == *style
                        && last.annotations == covering =>
                {
                    last.range.end = end;
                }
                _ => runs.push(AnnotatedRun {
                    range: start..end,
                    style: *style,
                    annotations: covering,
                }),
            }
            start = end;
        }
    }

    runs
}
