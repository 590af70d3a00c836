//! Block-level grammar rules.
//!
//! Blocks are recognised from the first tokens of a line. Containers (block
//! quotes and list items) check every following line before claiming it:
//! a quote needs its `>` markers repeated, a list item needs the line to be
//! indented past its marker. Lookahead is done with [`Line`], which
//! describes a line without consuming anything.
//!
//! Every rule stops on the NEWLINE ending its last line (or at EOF) and
//! leaves that token to the enclosing container.

use std::sync::OnceLock;

use regex::Regex;

use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

use super::inline;

/// `>` nesting the grammar follows; deeper markers stay plain text.
const MAX_QUOTE_DEPTH: usize = 32;

/// List nesting the grammar follows.
const MAX_LIST_DEPTH: usize = 16;

/// What the enclosing containers require of each line.
#[derive(Debug, Clone, Copy)]
pub(super) struct Container {
    /// Open block quotes; each line repeats this many `>`
    quotes: usize,
    /// Open list items
    lists: usize,
    /// Minimum indent of a paragraph continuation line
    indent: usize,
}

impl Container {
    pub(super) const ROOT: Container = Container {
        quotes: 0,
        lists: 0,
        indent: 0,
    };
}

/// The shape of one line, found by lookahead.
#[derive(Debug, Clone, Copy)]
struct Line {
    /// Indent width after the quote markers
    indent: usize,
    /// Index of the first content token
    content: usize,
    /// Index of the NEWLINE ending the line, or the token count
    end: usize,
}

impl Line {
    /// Describe the line starting at `start`, which must open with
    /// `quotes` block quote markers.
    fn scan(p: &Parser<'_, '_>, start: usize, quotes: usize) -> Option<Line> {
        let mut idx = start;
        for _ in 0..quotes {
            if p.kind_at(idx) == SyntaxKind::WHITESPACE {
                idx += 1;
            }
            if p.kind_at(idx) != SyntaxKind::GT {
                return None;
            }
            idx += 1;
        }
        Some(Line::at(p, idx))
    }

    /// Describe the rest of a line from `idx`, just past any quote markers.
    fn at(p: &Parser<'_, '_>, idx: usize) -> Line {
        let (indent, content) = if p.kind_at(idx) == SyntaxKind::WHITESPACE {
            let mut width = whitespace_width(p.text_at(idx));
            // The first space after `>` belongs to the marker
            if idx > 0 && p.kind_at(idx - 1) == SyntaxKind::GT {
                width = width.saturating_sub(1);
            }
            (width, idx + 1)
        } else {
            (0, idx)
        };
        Line {
            indent,
            content,
            end: p.line_end(content),
        }
    }

    fn is_blank(&self) -> bool {
        self.content == self.end
    }
}

fn whitespace_width(text: &str) -> usize {
    text.chars().map(|c| if c == '\t' { 4 } else { 1 }).sum()
}

/// Find the next non-blank line after the NEWLINE at the current position.
///
/// Returns how many blank lines sit in between, or `None` when the input
/// ends or a line drops out of the enclosing quotes first.
fn next_content_line(p: &Parser<'_, '_>, quotes: usize) -> Option<(usize, Line)> {
    let mut newline = p.pos();
    let mut blanks = 0;
    loop {
        let line = Line::scan(p, newline + 1, quotes)?;
        if !line.is_blank() {
            return Some((blanks, line));
        }
        if p.kind_at(line.end) != SyntaxKind::NEWLINE {
            return None;
        }
        blanks += 1;
        newline = line.end;
    }
}

/// Consume a NEWLINE and the quote markers opening the next line.
fn line_break(p: &mut Parser<'_, '_>, quotes: usize) {
    p.eat(SyntaxKind::NEWLINE);
    for _ in 0..quotes {
        p.eat_remap(SyntaxKind::WHITESPACE, SyntaxKind::INDENT);
        p.eat_remap(SyntaxKind::GT, SyntaxKind::BLOCK_QUOTE_MARKER);
    }
}

fn eat_indent(p: &mut Parser<'_, '_>) {
    p.eat_remap(SyntaxKind::WHITESPACE, SyntaxKind::INDENT);
}

/// Consume `blanks` blank lines followed by the break into the next line.
fn skip_blank_lines(p: &mut Parser<'_, '_>, quotes: usize, blanks: usize) {
    for _ in 0..blanks {
        line_break(p, quotes);
        eat_indent(p);
    }
    line_break(p, quotes);
}

/// Parse one block at the current position, which is just past the
/// container prefix of its first line.
pub(super) fn block(p: &mut Parser<'_, '_>, c: Container) {
    let line = Line::at(p, p.pos());
    eat_indent(p);
    if line.is_blank() {
        return;
    }

    let idx = p.pos();
    if at_thematic_break(p, idx) {
        thematic_break(p);
    } else if let Some(marker) = list_marker(p, idx).filter(|_| c.lists < MAX_LIST_DEPTH) {
        list(p, c, marker, line.indent);
    } else if heading_level(p, idx).is_some() {
        heading(p);
    } else if p.at(SyntaxKind::GT) && c.quotes < MAX_QUOTE_DEPTH {
        block_quote(p, c);
    } else if let Some(fence) = Fence::open(p, idx) {
        fenced_code(p, c, fence);
    } else if at_html_block(p, idx) {
        html_block(p, c);
    } else if at_link_definition(p, idx) {
        link_definition(p);
    } else if p.flavor().tables && at_table(p, c, idx) {
        table(p, c);
    } else {
        paragraph(p, c);
    }
}

/// Whether the line content at `idx` would start a new block and so ends
/// a paragraph.
fn interrupts_paragraph(p: &Parser<'_, '_>, idx: usize) -> bool {
    p.kind_at(idx) == SyntaxKind::GT
        || heading_level(p, idx).is_some()
        || at_thematic_break(p, idx)
        || list_marker(p, idx).is_some()
        || Fence::open(p, idx).is_some()
}

fn paragraph(p: &mut Parser<'_, '_>, c: Container) {
    let m = p.start();

    loop {
        inline::inline_line(p);
        if !p.at(SyntaxKind::NEWLINE) {
            break;
        }
        let Some(next) = Line::scan(p, p.pos() + 1, c.quotes) else {
            break;
        };
        if next.is_blank() || next.indent < c.indent || interrupts_paragraph(p, next.content) {
            break;
        }
        line_break(p, c.quotes);
        eat_indent(p);
    }

    m.complete(p, SyntaxKind::PARAGRAPH);
}

/// Number of `#` opening an ATX heading at `idx`.
fn heading_level(p: &Parser<'_, '_>, idx: usize) -> Option<usize> {
    let level = run_len(p, idx, SyntaxKind::HASH);
    let terminated = matches!(
        p.kind_at(idx + level),
        SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE | SyntaxKind::EOF
    );
    ((1..=6).contains(&level) && terminated).then_some(level)
}

fn heading(p: &mut Parser<'_, '_>) {
    let m = p.start();
    let level = heading_level(p, p.pos()).unwrap_or(1);
    p.bump_n(level, SyntaxKind::ATX_HEADER);
    p.eat(SyntaxKind::WHITESPACE);
    inline::inline_line(p);
    m.complete(p, SyntaxKind::HEADING);
}

fn run_len(p: &Parser<'_, '_>, idx: usize, kind: SyntaxKind) -> usize {
    (idx..).take_while(|&i| p.kind_at(i) == kind).count()
}

/// Three or more `-`, `*` or `_` with nothing else but spaces.
fn at_thematic_break(p: &Parser<'_, '_>, idx: usize) -> bool {
    let marker = p.kind_at(idx);
    if !matches!(
        marker,
        SyntaxKind::DASH | SyntaxKind::STAR | SyntaxKind::UNDERSCORE
    ) {
        return false;
    }

    let mut count = 0;
    for i in idx..p.line_end(idx) {
        match p.kind_at(i) {
            k if k == marker => count += 1,
            SyntaxKind::WHITESPACE => {}
            _ => return false,
        }
    }
    count >= 3
}

fn thematic_break(p: &mut Parser<'_, '_>) {
    let m = p.start();
    let end = p.line_end(p.pos());
    p.bump_to(end);
    m.complete(p, SyntaxKind::THEMATIC_BREAK);
}

fn block_quote(p: &mut Parser<'_, '_>, c: Container) {
    let inner = Container {
        quotes: c.quotes + 1,
        indent: 0,
        ..c
    };
    let m = p.start();
    p.bump_remap(SyntaxKind::BLOCK_QUOTE_MARKER);

    loop {
        if !p.at(SyntaxKind::NEWLINE) && !p.at_end() {
            block(p, inner);
        }
        if !p.at(SyntaxKind::NEWLINE) {
            break;
        }
        if Line::scan(p, p.pos() + 1, inner.quotes).is_none() {
            break;
        }
        line_break(p, inner.quotes);
    }

    m.complete(p, SyntaxKind::BLOCK_QUOTE);
}

#[derive(Debug, Clone, Copy)]
struct ListMarker {
    ordered: bool,
    /// Raw tokens making up the marker, without the trailing space
    len: usize,
}

fn ordered_dot_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{1,9}\.$").expect("Invalid ordered marker regex"))
}

fn ordered_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{1,9}$").expect("Invalid ordered number regex"))
}

/// A list marker at `idx`: `-`, `*`, `+`, `1.` or `1)` followed by a space
/// or the end of the line.
fn list_marker(p: &Parser<'_, '_>, idx: usize) -> Option<ListMarker> {
    let marker = match p.kind_at(idx) {
        SyntaxKind::DASH | SyntaxKind::STAR | SyntaxKind::PLUS => ListMarker {
            ordered: false,
            len: 1,
        },
        SyntaxKind::TEXT if ordered_dot_regex().is_match(p.text_at(idx)) => ListMarker {
            ordered: true,
            len: 1,
        },
        SyntaxKind::TEXT
            if ordered_number_regex().is_match(p.text_at(idx))
                && p.kind_at(idx + 1) == SyntaxKind::RPAREN =>
        {
            ListMarker {
                ordered: true,
                len: 2,
            }
        }
        _ => return None,
    };

    matches!(
        p.kind_at(idx + marker.len),
        SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE | SyntaxKind::EOF
    )
    .then_some(marker)
}

/// A list marker on a line that is not a thematic break (`* * *`).
fn item_marker(p: &Parser<'_, '_>, idx: usize) -> Option<ListMarker> {
    if at_thematic_break(p, idx) {
        return None;
    }
    list_marker(p, idx)
}

/// Parse a list whose first marker is at the current position, `indent`
/// columns in.
fn list(p: &mut Parser<'_, '_>, c: Container, first: ListMarker, indent: usize) {
    let m = p.start();
    let mut marker = first;

    loop {
        list_item(p, c, marker, indent);
        if !p.at(SyntaxKind::NEWLINE) {
            break;
        }
        let Some((blanks, next)) = next_content_line(p, c.quotes) else {
            break;
        };
        let sibling = item_marker(p, next.content)
            .filter(|m| m.ordered == first.ordered && next.indent >= indent);
        let Some(next_marker) = sibling else {
            break;
        };
        skip_blank_lines(p, c.quotes, blanks);
        eat_indent(p);
        marker = next_marker;
    }

    let kind = if first.ordered {
        SyntaxKind::ORDERED_LIST
    } else {
        SyntaxKind::UNORDERED_LIST
    };
    m.complete(p, kind);
}

/// `[ ]`, `[x]` or `[X]` at `idx` followed by a space or the end of the
/// line; returns the raw token count including that space.
fn checkbox_len(p: &Parser<'_, '_>, idx: usize) -> Option<usize> {
    if p.kind_at(idx) != SyntaxKind::LBRACKET || p.kind_at(idx + 2) != SyntaxKind::RBRACKET {
        return None;
    }
    let mark = match (p.kind_at(idx + 1), p.text_at(idx + 1)) {
        (SyntaxKind::WHITESPACE, " ") => true,
        (SyntaxKind::TEXT, "x" | "X") => true,
        _ => false,
    };
    if !mark {
        return None;
    }
    match p.kind_at(idx + 3) {
        SyntaxKind::WHITESPACE => Some(4),
        SyntaxKind::NEWLINE | SyntaxKind::EOF => Some(3),
        _ => None,
    }
}

fn list_item(p: &mut Parser<'_, '_>, c: Container, marker: ListMarker, indent: usize) {
    let m = p.start();

    let mut len = marker.len;
    if p.nth(len) == SyntaxKind::WHITESPACE {
        len += 1;
    }
    let kind = if marker.ordered {
        SyntaxKind::LIST_NUMBER
    } else {
        SyntaxKind::LIST_BULLET
    };
    p.bump_n(len, kind);

    if p.flavor().checkboxes {
        if let Some(len) = checkbox_len(p, p.pos()) {
            p.bump_n(len, SyntaxKind::CHECK_BOX);
        }
    }

    let item = Container {
        lists: c.lists + 1,
        indent,
        ..c
    };

    if !p.at(SyntaxKind::NEWLINE) && !p.at_end() {
        if heading_level(p, p.pos()).is_some() {
            heading(p);
        } else {
            paragraph(p, item);
        }
    }

    // Lines indented past the marker belong to the item
    loop {
        if !p.at(SyntaxKind::NEWLINE) {
            break;
        }
        let Some((blanks, next)) = next_content_line(p, c.quotes) else {
            break;
        };
        if next.indent <= indent {
            break;
        }
        let nested = item_marker(p, next.content);
        if nested.is_some() && item.lists >= MAX_LIST_DEPTH {
            break;
        }

        skip_blank_lines(p, c.quotes, blanks);
        match nested {
            Some(nested) => {
                eat_indent(p);
                list(p, item, nested, next.indent);
            }
            None => block(
                p,
                Container {
                    indent: indent + 1,
                    ..item
                },
            ),
        }
    }

    m.complete(p, SyntaxKind::LIST_ITEM);
}

/// An opening code fence.
#[derive(Debug, Clone, Copy)]
struct Fence {
    kind: SyntaxKind,
    len: usize,
}

impl Fence {
    /// Three or more backticks or tildes at `idx`. A backtick fence's info
    /// string may not contain backticks, so ```` ```x``` ```` stays inline.
    fn open(p: &Parser<'_, '_>, idx: usize) -> Option<Fence> {
        let kind = p.kind_at(idx);
        if !matches!(kind, SyntaxKind::BACKTICK | SyntaxKind::TILDE) {
            return None;
        }
        let len = run_len(p, idx, kind);
        if len < 3 {
            return None;
        }
        if kind == SyntaxKind::BACKTICK
            && (idx + len..p.line_end(idx)).any(|i| p.kind_at(i) == SyntaxKind::BACKTICK)
        {
            return None;
        }
        Some(Fence { kind, len })
    }

    /// Length of the closing run on `line`, if it closes this fence.
    fn closing_len(&self, p: &Parser<'_, '_>, line: &Line) -> Option<usize> {
        let run = run_len(p, line.content, self.kind);
        let rest_blank =
            (line.content + run..line.end).all(|i| p.kind_at(i) == SyntaxKind::WHITESPACE);
        (run >= self.len && rest_blank).then_some(run)
    }
}

fn fenced_code(p: &mut Parser<'_, '_>, c: Container, fence: Fence) {
    let m = p.start();
    p.bump_n(fence.len, SyntaxKind::FENCE_START);
    p.eat(SyntaxKind::WHITESPACE);

    let end = p.line_end(p.pos());
    let mut lang_end = end;
    while lang_end > p.pos() && p.kind_at(lang_end - 1) == SyntaxKind::WHITESPACE {
        lang_end -= 1;
    }
    if lang_end > p.pos() {
        p.bump_n(lang_end - p.pos(), SyntaxKind::FENCE_LANG);
    }
    p.bump_to(end);

    // Unclosed fences run to the end of input or of the enclosing quote
    loop {
        if !p.at(SyntaxKind::NEWLINE) {
            break;
        }
        let Some(line) = Line::scan(p, p.pos() + 1, c.quotes) else {
            break;
        };
        line_break(p, c.quotes);

        if let Some(run) = fence.closing_len(p, &line) {
            eat_indent(p);
            p.bump_n(run, SyntaxKind::FENCE_END);
            p.bump_to(line.end);
            break;
        }

        if c.quotes > 0 && p.at(SyntaxKind::WHITESPACE) && p.current_text() == " " {
            p.bump_remap(SyntaxKind::INDENT);
        }
        if line.end > p.pos() {
            p.bump_n(line.end - p.pos(), SyntaxKind::FENCE_CONTENT);
        }
    }

    m.complete(p, SyntaxKind::FENCED_CODE);
}

fn html_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/?[A-Za-z][A-Za-z0-9-]*/?$").expect("Invalid tag regex"))
}

/// `<tag`, `</tag` or `<!` at `idx`.
fn at_html_block(p: &Parser<'_, '_>, idx: usize) -> bool {
    if p.kind_at(idx) != SyntaxKind::LT {
        return false;
    }
    match p.kind_at(idx + 1) {
        SyntaxKind::EXCLAIM => true,
        SyntaxKind::TEXT => {
            html_tag_regex().is_match(p.text_at(idx + 1))
                && matches!(
                    p.kind_at(idx + 2),
                    SyntaxKind::GT | SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE | SyntaxKind::EOF
                )
        }
        _ => false,
    }
}

/// HTML runs to the next blank line. Each line is kept as one literal
/// TEXT token so nothing inside it is interpreted.
fn html_block(p: &mut Parser<'_, '_>, c: Container) {
    let m = p.start();

    loop {
        let end = p.line_end(p.pos());
        if end > p.pos() {
            p.bump_n(end - p.pos(), SyntaxKind::TEXT);
        }
        if !p.at(SyntaxKind::NEWLINE) {
            break;
        }
        match Line::scan(p, p.pos() + 1, c.quotes) {
            Some(next) if !next.is_blank() => {
                line_break(p, c.quotes);
                eat_indent(p);
            }
            _ => break,
        }
    }

    m.complete(p, SyntaxKind::HTML_BLOCK);
}

/// `[label]: destination` filling the whole line.
fn at_link_definition(p: &Parser<'_, '_>, idx: usize) -> bool {
    if p.kind_at(idx) != SyntaxKind::LBRACKET {
        return false;
    }
    let end = p.line_end(idx);
    let Some(close) = (idx + 1..end).find(|&i| {
        matches!(p.kind_at(i), SyntaxKind::RBRACKET | SyntaxKind::LBRACKET)
    }) else {
        return false;
    };
    if p.kind_at(close) != SyntaxKind::RBRACKET
        || close == idx + 1
        || p.kind_at(close + 1) != SyntaxKind::COLON
    {
        return false;
    }
    (close + 2..end).any(|i| p.kind_at(i) != SyntaxKind::WHITESPACE)
}

fn link_definition(p: &mut Parser<'_, '_>) {
    let m = p.start();
    let end = p.line_end(p.pos());
    p.bump_to(end);
    m.complete(p, SyntaxKind::LINK_DEFINITION);
}

fn table_delimiter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\|?[ \t]*:?-+:?[ \t]*(\|[ \t]*:?-+:?[ \t]*)*\|?[ \t]*$")
            .expect("Invalid table delimiter regex")
    })
}

fn has_pipe(p: &Parser<'_, '_>, from: usize, to: usize) -> bool {
    (from..to).any(|i| p.kind_at(i) == SyntaxKind::PIPE)
}

/// A row containing `|` directly followed by a delimiter row.
fn at_table(p: &Parser<'_, '_>, c: Container, idx: usize) -> bool {
    let end = p.line_end(idx);
    if !has_pipe(p, idx, end) || p.kind_at(end) != SyntaxKind::NEWLINE {
        return false;
    }
    let Some(next) = Line::scan(p, end + 1, c.quotes) else {
        return false;
    };
    // Rows continue only while they contain a pipe; the delimiter row too.
    if next.is_blank() || !has_pipe(p, next.content, next.end) {
        return false;
    }
    let row: String = (next.content..next.end).map(|i| p.text_at(i)).collect();
    table_delimiter_regex().is_match(&row)
}

fn table(p: &mut Parser<'_, '_>, c: Container) {
    let m = p.start();

    loop {
        let row = p.start();
        inline::inline_line(p);
        row.complete(p, SyntaxKind::TABLE_ROW);

        if !p.at(SyntaxKind::NEWLINE) {
            break;
        }
        match Line::scan(p, p.pos() + 1, c.quotes) {
            Some(next) if !next.is_blank() && has_pipe(p, next.content, next.end) => {
                line_break(p, c.quotes);
                eat_indent(p);
            }
            _ => break,
        }
    }

    m.complete(p, SyntaxKind::TABLE);
}

#[cfg(test)]
mod tests {
    use crate::flavor::Flavor;
    use crate::parser::{parse, parse_with};
    use crate::syntax_kind::{SyntaxKind, SyntaxNode};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn kinds(node: &SyntaxNode) -> Vec<SyntaxKind> {
        node.children().map(|n| n.kind()).collect()
    }

    fn first(node: &SyntaxNode, kind: SyntaxKind) -> SyntaxNode {
        node.descendants()
            .find(|n| n.kind() == kind)
            .unwrap_or_else(|| panic!("no {kind:?} in {node:#?}"))
    }

    #[rstest]
    #[case("# One", 1)]
    #[case("### Three", 3)]
    #[case("###### Six", 6)]
    #[case("##", 2)]
    fn parse_heading_levels(#[case] input: &str, #[case] level: usize) {
        let tree = parse(input);
        let heading = first(&tree, SyntaxKind::HEADING);
        let marker = heading.first_token().unwrap();
        assert_eq!(marker.kind(), SyntaxKind::ATX_HEADER);
        assert_eq!(marker.text().len(), level);
    }

    #[rstest]
    #[case("#hashtag")]
    #[case("####### seven")]
    fn not_a_heading(#[case] input: &str) {
        assert_eq!(kinds(&parse(input)), vec![SyntaxKind::PARAGRAPH]);
    }

    #[test]
    fn blank_line_separates_paragraphs() {
        let tree = parse("one\ntwo\n\nthree");
        assert_eq!(
            kinds(&tree),
            vec![SyntaxKind::PARAGRAPH, SyntaxKind::PARAGRAPH]
        );
        assert_eq!(tree.first_child().unwrap().text().to_string(), "one\ntwo");
    }

    #[test]
    fn heading_interrupts_paragraph() {
        let tree = parse("text\n## head");
        assert_eq!(kinds(&tree), vec![SyntaxKind::PARAGRAPH, SyntaxKind::HEADING]);
    }

    #[rstest]
    #[case("---")]
    #[case("***")]
    #[case("- - -")]
    #[case("___")]
    fn parse_thematic_break(#[case] input: &str) {
        assert_eq!(kinds(&parse(input)), vec![SyntaxKind::THEMATIC_BREAK]);
    }

    #[test]
    fn nested_block_quotes() {
        let tree = parse("> > > deep");
        let depth = tree
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::BLOCK_QUOTE)
            .count();
        assert_eq!(depth, 3);
        assert_eq!(first(&tree, SyntaxKind::PARAGRAPH).text().to_string(), "deep");
    }

    #[test]
    fn block_quote_continuation_needs_marker() {
        let tree = parse("> quoted\nplain");
        assert_eq!(
            kinds(&tree),
            vec![SyntaxKind::BLOCK_QUOTE, SyntaxKind::PARAGRAPH]
        );
    }

    #[test]
    fn block_quote_spans_marked_lines() {
        let tree = parse("> one\n>\n> two");
        assert_eq!(kinds(&tree), vec![SyntaxKind::BLOCK_QUOTE]);
        let quote = tree.first_child().unwrap();
        assert_eq!(
            kinds(&quote),
            vec![SyntaxKind::PARAGRAPH, SyntaxKind::PARAGRAPH]
        );
    }

    #[test]
    fn quote_nesting_is_capped() {
        let input = "> ".repeat(40) + "x";
        let tree = parse(&input);
        let depth = tree
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::BLOCK_QUOTE)
            .count();
        assert_eq!(depth, 32);
        assert_eq!(tree.text().to_string(), input);
    }

    #[test]
    fn unordered_list_items() {
        let tree = parse("- one\n- two\n* three");
        let list = tree.first_child().unwrap();
        assert_eq!(list.kind(), SyntaxKind::UNORDERED_LIST);
        assert_eq!(
            kinds(&list),
            vec![
                SyntaxKind::LIST_ITEM,
                SyntaxKind::LIST_ITEM,
                SyntaxKind::LIST_ITEM
            ]
        );
        let bullet = list.first_child().unwrap().first_token().unwrap();
        assert_eq!(bullet.kind(), SyntaxKind::LIST_BULLET);
        assert_eq!(bullet.text(), "- ");
    }

    #[rstest]
    #[case("1. one\n2. two")]
    #[case("1) one\n2) two")]
    fn ordered_list_items(#[case] input: &str) {
        let tree = parse(input);
        let list = tree.first_child().unwrap();
        assert_eq!(list.kind(), SyntaxKind::ORDERED_LIST);
        assert_eq!(list.children().count(), 2);
        let number = list.first_child().unwrap().first_token().unwrap();
        assert_eq!(number.kind(), SyntaxKind::LIST_NUMBER);
    }

    #[test]
    fn list_siblings_across_blank_line() {
        let tree = parse("- one\n\n- two");
        assert_eq!(kinds(&tree), vec![SyntaxKind::UNORDERED_LIST]);
        assert_eq!(tree.first_child().unwrap().children().count(), 2);
    }

    #[test]
    fn nested_list_inside_item() {
        let tree = parse("- outer\n  - inner\n- next");
        let list = tree.first_child().unwrap();
        assert_eq!(list.children().count(), 2);
        let item = list.first_child().unwrap();
        assert_eq!(
            kinds(&item),
            vec![SyntaxKind::PARAGRAPH, SyntaxKind::UNORDERED_LIST]
        );
    }

    #[test]
    fn indented_paragraph_after_blank_stays_in_item() {
        let tree = parse("- item\n\n  more\n\nafter");
        assert_eq!(
            kinds(&tree),
            vec![SyntaxKind::UNORDERED_LIST, SyntaxKind::PARAGRAPH]
        );
        let item = tree.first_child().unwrap().first_child().unwrap();
        assert_eq!(
            kinds(&item),
            vec![SyntaxKind::PARAGRAPH, SyntaxKind::PARAGRAPH]
        );
    }

    #[test]
    fn list_nesting_is_capped() {
        let input: String = (0..24)
            .map(|depth| format!("{}- level\n", "  ".repeat(depth)))
            .collect();
        let tree = parse(&input);
        let deepest = tree
            .descendants()
            .map(|n| {
                n.ancestors()
                    .filter(|a| a.kind() == SyntaxKind::UNORDERED_LIST)
                    .count()
            })
            .max()
            .unwrap();
        assert!(deepest <= 16);
        assert_eq!(tree.text().to_string(), input);
    }

    #[rstest]
    #[case("- [ ] todo", "[ ] ")]
    #[case("- [x] done", "[x] ")]
    #[case("- [X]", "[X]")]
    fn checkbox_after_marker(#[case] input: &str, #[case] text: &str) {
        let tree = parse(input);
        let item = first(&tree, SyntaxKind::LIST_ITEM);
        let checkbox = item
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == SyntaxKind::CHECK_BOX)
            .unwrap();
        assert_eq!(checkbox.text(), text);
    }

    #[test]
    fn checkbox_needs_flavor() {
        let tree = parse_with("- [x] done", Flavor::commonmark());
        let has_checkbox = tree
            .descendants_with_tokens()
            .any(|e| e.kind() == SyntaxKind::CHECK_BOX);
        assert!(!has_checkbox);
    }

    #[test]
    fn fenced_code_with_language() {
        let tree = parse("```rust\nfn main() {}\n```");
        let fence = first(&tree, SyntaxKind::FENCED_CODE);
        let tokens: Vec<_> = fence
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .map(|t| (t.kind(), t.text().to_string()))
            .collect();
        assert_eq!(
            tokens,
            vec![
                (SyntaxKind::FENCE_START, "```".to_string()),
                (SyntaxKind::FENCE_LANG, "rust".to_string()),
                (SyntaxKind::NEWLINE, "\n".to_string()),
                (SyntaxKind::FENCE_CONTENT, "fn main() {}".to_string()),
                (SyntaxKind::NEWLINE, "\n".to_string()),
                (SyntaxKind::FENCE_END, "```".to_string()),
            ]
        );
    }

    #[test]
    fn unterminated_fence_runs_to_end() {
        let input = "```\nline one\n\nline *two*";
        let tree = parse(input);
        assert_eq!(kinds(&tree), vec![SyntaxKind::FENCED_CODE]);
        let fence = tree.first_child().unwrap();
        assert!(
            !fence
                .children_with_tokens()
                .any(|e| e.kind() == SyntaxKind::FENCE_END)
        );
        assert_eq!(tree.text().to_string(), input);
    }

    #[test]
    fn short_closing_fence_does_not_close() {
        let tree = parse("````\n```\n````");
        let fence = tree.first_child().unwrap();
        let contents: Vec<_> = fence
            .children_with_tokens()
            .filter(|e| e.kind() == SyntaxKind::FENCE_CONTENT)
            .collect();
        assert_eq!(contents.len(), 1);
    }

    #[test]
    fn inline_triple_backticks_stay_inline() {
        let tree = parse("```code```");
        assert_eq!(kinds(&tree), vec![SyntaxKind::PARAGRAPH]);
    }

    #[test]
    fn fence_inside_quote() {
        let tree = parse("> ```\n> code\n> ```\nafter");
        assert_eq!(
            kinds(&tree),
            vec![SyntaxKind::BLOCK_QUOTE, SyntaxKind::PARAGRAPH]
        );
        let content = tree
            .descendants_with_tokens()
            .find(|e| e.kind() == SyntaxKind::FENCE_CONTENT)
            .unwrap();
        assert_eq!(content.into_token().unwrap().text(), "code");
    }

    #[test]
    fn html_block_is_literal() {
        let tree = parse("<div>\n*not emphasis*\n</div>\n\ntext");
        assert_eq!(
            kinds(&tree),
            vec![SyntaxKind::HTML_BLOCK, SyntaxKind::PARAGRAPH]
        );
        let html = tree.first_child().unwrap();
        assert!(html.children().next().is_none());
    }

    #[test]
    fn mention_line_is_not_html() {
        let tree = parse("<@01ARZ3NDEKTSV4RRFFQ69G5FAV> hi");
        assert_eq!(kinds(&tree), vec![SyntaxKind::PARAGRAPH]);
    }

    #[test]
    fn link_definition_line() {
        let tree = parse("[home]: https://example.com");
        assert_eq!(kinds(&tree), vec![SyntaxKind::LINK_DEFINITION]);
    }

    #[test]
    fn table_rows() {
        let tree = parse("| a | b |\n|---|:-:|\n| 1 | 2 |\n\nafter");
        assert_eq!(kinds(&tree), vec![SyntaxKind::TABLE, SyntaxKind::PARAGRAPH]);
        assert_eq!(tree.first_child().unwrap().children().count(), 3);
    }

    #[rstest]
    #[case("x|y\n-")]
    #[case("x|y\n:-:")]
    #[case("a | b\n---")]
    fn delimiter_row_without_pipe_is_not_a_table(#[case] input: &str) {
        let tree = parse(input);
        assert!(!kinds(&tree).contains(&SyntaxKind::TABLE));
        assert_eq!(tree.text().to_string(), input);
    }

    #[rstest]
    #[case("x|y\n-|-")]
    #[case("x|y\n|-")]
    fn delimiter_row_with_pipe_starts_a_table(#[case] input: &str) {
        let tree = parse(input);
        assert_eq!(kinds(&tree), vec![SyntaxKind::TABLE]);
        assert_eq!(tree.first_child().unwrap().children().count(), 2);
    }

    #[test]
    fn table_needs_flavor() {
        let tree = parse_with("| a | b |\n|---|---|", Flavor::commonmark());
        assert_eq!(kinds(&tree), vec![SyntaxKind::PARAGRAPH]);
    }
}
