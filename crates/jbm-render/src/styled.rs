//! Styled text fragments produced per node and spliced into their parent.

use std::ops::Range;

use crate::document::{
    AnnotationKind, BlockFrame, BlockKind, InteractionAnnotation, OBJECT_REPLACEMENT,
    PlaceholderKind, SpanStyle,
};

/// The rendered output of one node.
///
/// Offsets are relative to the fragment's own text and are shifted when it
/// is appended to another fragment. Every byte of the text is covered by
/// exactly one style run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyledText {
    text: String,
    styles: Vec<(Range<usize>, SpanStyle)>,
    annotations: Vec<InteractionAnnotation>,
    placeholders: Vec<(usize, PlaceholderKind)>,
    blocks: Vec<BlockFrame>,
}

type Parts = (
    String,
    Vec<(Range<usize>, SpanStyle)>,
    Vec<InteractionAnnotation>,
    Vec<(usize, PlaceholderKind)>,
    Vec<BlockFrame>,
);

impl StyledText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: &str) -> Self {
        let mut fragment = Self::new();
        fragment.push_str(text);
        fragment
    }

    pub fn styled(text: &str, style: SpanStyle) -> Self {
        let mut fragment = Self::new();
        fragment.push_styled(text, style);
        fragment
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn annotations(&self) -> &[InteractionAnnotation] {
        &self.annotations
    }

    pub fn blocks(&self) -> &[BlockFrame] {
        &self.blocks
    }

    pub fn placeholders(&self) -> impl Iterator<Item = (usize, &PlaceholderKind)> {
        self.placeholders.iter().map(|(anchor, kind)| (*anchor, kind))
    }

    /// Style of the byte at `offset`.
    pub fn style_at(&self, offset: usize) -> Option<&SpanStyle> {
        self.styles
            .iter()
            .find(|(range, _)| range.contains(&offset))
            .map(|(_, style)| style)
    }

    pub fn push_str(&mut self, text: &str) {
        self.push_styled(text, SpanStyle::default());
    }

    pub fn push_styled(&mut self, text: &str, style: SpanStyle) {
        if text.is_empty() {
            return;
        }
        let start = self.text.len();
        self.text.push_str(text);
        let end = self.text.len();

        match self.styles.last_mut() {
            Some((range, last)) if *last == style && range.end == start => range.end = end,
            _ => self.styles.push((start..end, style)),
        }
    }

    /// Append an object replacement character standing for `kind`; returns
    /// its byte range.
    pub fn push_placeholder(&mut self, kind: PlaceholderKind) -> Range<usize> {
        let start = self.text.len();
        let mut buf = [0u8; 4];
        self.push_str(OBJECT_REPLACEMENT.encode_utf8(&mut buf));
        self.placeholders.push((start, kind));
        start..self.text.len()
    }

    /// Append `other` inline, directly after the current text.
    pub fn append(&mut self, other: StyledText) {
        let shift = self.text.len();
        self.text.push_str(&other.text);

        for (range, style) in other.styles {
            let range = range.start + shift..range.end + shift;
            match self.styles.last_mut() {
                Some((last_range, last)) if *last == style && last_range.end == range.start => {
                    last_range.end = range.end
                }
                _ => self.styles.push((range, style)),
            }
        }
        self.annotations
            .extend(other.annotations.into_iter().map(|mut a| {
                a.range = a.range.start + shift..a.range.end + shift;
                a
            }));
        self.placeholders.extend(
            other
                .placeholders
                .into_iter()
                .map(|(anchor, kind)| (anchor + shift, kind)),
        );
        self.blocks.extend(other.blocks.into_iter().map(|mut frame| {
            frame.range = frame.range.start + shift..frame.range.end + shift;
            frame
        }));
    }

    /// Append `other` as the next block: a newline separates it from the
    /// text so far when both have text. The newline belongs to no frame.
    pub fn push_block(&mut self, other: StyledText) {
        if !self.is_empty() && !other.is_empty() {
            self.push_str("\n");
        }
        self.append(other);
    }

    /// Layer `style` under every run; attributes set by inner nodes win.
    pub fn apply(&mut self, style: &SpanStyle) {
        for (_, run) in &mut self.styles {
            run.inherit(style);
        }
    }

    /// Annotate `range` unless an annotation of the same kind already
    /// overlaps it. Returns whether the annotation was added.
    pub fn annotate(&mut self, kind: AnnotationKind, range: Range<usize>, payload: &str) -> bool {
        let overlaps = self
            .annotations
            .iter()
            .any(|a| a.kind == kind && a.range.start < range.end && range.start < a.range.end);
        if overlaps || range.start >= range.end || range.end > self.text.len() {
            log::debug!("dropping {kind:?} annotation over {range:?}");
            return false;
        }
        self.annotations.push(InteractionAnnotation {
            kind,
            range,
            payload: payload.to_string(),
            clickable: kind.is_clickable(),
        });
        true
    }

    /// Annotate the whole fragment.
    pub fn annotate_all(&mut self, kind: AnnotationKind, payload: &str) -> bool {
        self.annotate(kind, 0..self.text.len(), payload)
    }

    /// Wrap the whole fragment in a frame, outside every existing frame.
    pub fn frame(&mut self, kind: BlockKind) {
        self.blocks.insert(
            0,
            BlockFrame {
                kind,
                range: 0..self.text.len(),
                quote_depth: 0,
            },
        );
    }

    /// Add an empty frame at the end of the text, such as a spacer.
    pub fn push_marker_frame(&mut self, kind: BlockKind) {
        let at = self.text.len();
        self.blocks.push(BlockFrame {
            kind,
            range: at..at,
            quote_depth: 0,
        });
    }

    /// Count one more enclosing quote for every frame so far.
    pub fn deepen_quotes(&mut self) {
        for frame in &mut self.blocks {
            frame.quote_depth += 1;
        }
    }

    pub(crate) fn into_parts(self) -> Parts {
        (
            self.text,
            self.styles,
            self.annotations,
            self.placeholders,
            self.blocks,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jbm_config::Argb;
    use pretty_assertions::assert_eq;

    #[test]
    fn append_shifts_offsets() {
        let mut head = StyledText::plain("ab");
        let mut tail = StyledText::plain("cd");
        tail.annotate_all(AnnotationKind::Url, "x");
        tail.push_placeholder(PlaceholderKind::Checkbox { checked: true });
        tail.frame(BlockKind::Text);

        head.append(tail);
        assert_eq!(head.annotations()[0].range, 2..4);
        assert_eq!(head.placeholders().next().map(|(at, _)| at), Some(4));
        assert_eq!(head.blocks()[0].range, 2..7);
    }

    #[test]
    fn push_block_separates_text() {
        let mut doc = StyledText::plain("one");
        doc.push_block(StyledText::new());
        doc.push_block(StyledText::plain("two"));
        assert_eq!(doc.text(), "one\ntwo");
    }

    #[test]
    fn same_kind_overlap_is_rejected() {
        let mut t = StyledText::plain("abcdef");
        assert!(t.annotate(AnnotationKind::Url, 0..4, "a"));
        assert!(!t.annotate(AnnotationKind::Url, 2..6, "b"));
        assert!(t.annotate(AnnotationKind::UserMention, 2..6, "c"));
        assert_eq!(t.annotations().len(), 2);
    }

    #[test]
    fn annotation_outside_text_is_rejected() {
        let mut t = StyledText::plain("ab");
        assert!(!t.annotate(AnnotationKind::Url, 1..5, "x"));
        assert!(!t.annotate(AnnotationKind::Url, 1..1, "x"));
    }

    #[test]
    fn apply_layers_under_inner_style() {
        let red = Argb(0xFFFF_0000);
        let mut t = StyledText::styled("in", SpanStyle::color(red));
        t.push_str("out");
        t.apply(&SpanStyle {
            bold: true,
            color: Some(Argb(0xFF00_FF00)),
            ..SpanStyle::default()
        });

        assert_eq!(t.style_at(0).and_then(|s| s.color), Some(red));
        assert_eq!(t.style_at(2).and_then(|s| s.color), Some(Argb(0xFF00_FF00)));
        assert!(t.style_at(0).is_some_and(|s| s.bold));
    }

    #[test]
    fn placeholder_is_one_replacement_char() {
        let mut t = StyledText::new();
        let range = t.push_placeholder(PlaceholderKind::CustomEmote { id: "E".into() });
        assert_eq!(&t.text()[range], "\u{FFFC}");
    }
}
