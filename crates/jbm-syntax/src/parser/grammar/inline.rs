//! # Inline-Level Grammar
//!
//! Inline constructs live inside one line; nothing here crosses a NEWLINE.
//! Every rule works on a token range `[pos, end)` and first looks ahead for
//! its closing delimiter. Only when the whole construct is there does it
//! open a node; otherwise the opening tokens are consumed as plain text.
//!
//! | Token | Possible Element |
//! |-------|-----------------|
//! | `` ` `` | Code span |
//! | `*` `_` | Emphasis, strong |
//! | `~` | Strikethrough |
//! | `[` | Inline link |
//! | `!` | Image |
//! | `<` | Mention, channel, timestamp, autolink |
//! | `:` | Custom emote |
//!
//! ## Delimiter runs
//!
//! A run of `*` or `_` can open when it follows start of line or a
//! non-alphanumeric character and is followed by a non-space. It can close
//! when it follows a non-space and is followed by end of line or a
//! non-alphanumeric character. Strong (two delimiters) is tried before
//! emphasis (one); a run of three that meets a closing run of three
//! becomes emphasis around strong. Unused delimiters of a run stay text.
//!
//! ## Linear time
//!
//! Before a line is parsed, [`LineIndex`] matches its brackets,
//! parentheses and backtick runs in single passes. Closer searches for
//! `*`, `_` and `~~` remember every run they walk past, so a later opener
//! that reaches the same run reuses the answer instead of rescanning the
//! rest of the line.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

/// Nesting of inline constructs the grammar follows.
const MAX_INLINE_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy)]
struct InlineCtx<'l> {
    depth: usize,
    in_link: bool,
    line: &'l LineIndex,
}

impl<'l> InlineCtx<'l> {
    fn new(line: &'l LineIndex) -> Self {
        Self {
            depth: 0,
            in_link: false,
            line,
        }
    }

    fn nested(self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self
        }
    }
}

/// Memo key for a `*`/`_` closer search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CloserQuery {
    kind: SyntaxKind,
    at: usize,
    end: usize,
    need: usize,
    depth: usize,
}

/// Matching tables for one line, token indices absolute.
#[derive(Debug)]
struct LineIndex {
    start: usize,
    end: usize,
    /// At each backtick run start, the start of the next run of equal length
    next_backticks: Vec<Option<usize>>,
    /// At each `[`, its matching `]`
    bracket_close: Vec<Option<usize>>,
    /// At each token, the first `)` not balanced by a `(` from there on
    paren_close: Vec<Option<usize>>,
    /// At each token, the first whitespace at or after it
    next_space: Vec<usize>,
    closers: RefCell<HashMap<CloserQuery, Option<(usize, usize)>>>,
    tildes: RefCell<HashMap<(usize, usize), Option<usize>>>,
}

impl LineIndex {
    fn build(p: &Parser<'_, '_>, start: usize, end: usize) -> Self {
        let len = end - start;
        let kind = |i: usize| p.kind_at(start + i);

        let mut next_backticks = vec![None; len];
        let mut later: HashMap<usize, usize> = HashMap::new();
        let mut i = len;
        while i > 0 {
            if kind(i - 1) != SyntaxKind::BACKTICK {
                i -= 1;
                continue;
            }
            let run_end = i;
            while i > 0 && kind(i - 1) == SyntaxKind::BACKTICK {
                i -= 1;
            }
            next_backticks[i] = later.insert(run_end - i, start + i);
        }

        let mut index = Self {
            start,
            end,
            next_backticks,
            bracket_close: vec![None; len],
            paren_close: vec![None; len + 1],
            next_space: vec![end; len + 1],
            closers: RefCell::default(),
            tildes: RefCell::default(),
        };

        // Code spans bind tighter than brackets
        let mut open = Vec::new();
        let mut i = start;
        while i < end {
            match p.kind_at(i) {
                SyntaxKind::BACKTICK => {
                    i = index.skip_backticks(p, i, end);
                    continue;
                }
                SyntaxKind::LBRACKET => open.push(i),
                SyntaxKind::RBRACKET => {
                    if let Some(o) = open.pop() {
                        index.bracket_close[o - start] = Some(i);
                    }
                }
                _ => {}
            }
            i += 1;
        }

        let mut paren_match = vec![None; len];
        let mut open = Vec::new();
        for i in 0..len {
            match kind(i) {
                SyntaxKind::LPAREN => open.push(i),
                SyntaxKind::RPAREN => {
                    if let Some(o) = open.pop() {
                        paren_match[o] = Some(i);
                    }
                }
                _ => {}
            }
        }
        for i in (0..len).rev() {
            index.paren_close[i] = match kind(i) {
                SyntaxKind::RPAREN => Some(start + i),
                SyntaxKind::LPAREN => paren_match[i].and_then(|c| index.paren_close[c + 1]),
                _ => index.paren_close[i + 1],
            };
            index.next_space[i] = if kind(i) == SyntaxKind::WHITESPACE {
                start + i
            } else {
                index.next_space[i + 1]
            };
        }

        index
    }

    fn slot(&self, idx: usize) -> Option<usize> {
        (self.start..self.end).contains(&idx).then(|| idx - self.start)
    }

    /// Index just past the code span opening at `idx`, if it closes before
    /// `end`.
    fn code_span_end(&self, p: &Parser<'_, '_>, idx: usize, end: usize) -> Option<usize> {
        let close = self.next_backticks.get(self.slot(idx)?).copied().flatten()?;
        let close_end = close + run_len(p, idx, SyntaxKind::BACKTICK, self.end);
        (close_end <= end).then_some(close_end)
    }

    /// Skip past a code span at `i`, or past its unmatched backtick run.
    fn skip_backticks(&self, p: &Parser<'_, '_>, i: usize, end: usize) -> usize {
        self.code_span_end(p, i, end)
            .unwrap_or(i + run_len(p, i, SyntaxKind::BACKTICK, end))
    }

    fn bracket_close(&self, idx: usize, end: usize) -> Option<usize> {
        self.bracket_close
            .get(self.slot(idx)?)
            .copied()
            .flatten()
            .filter(|&close| close < end)
    }

    /// End of a bare link destination starting at `idx`.
    fn destination_end(&self, idx: usize, end: usize) -> usize {
        let Some(slot) = self.slot(idx) else {
            return idx;
        };
        let paren = self.paren_close[slot].unwrap_or(end);
        self.next_space[slot].min(paren).min(end)
    }
}

/// Parse inline content up to the end of the current line.
pub(super) fn inline_line(p: &mut Parser<'_, '_>) {
    let start = p.pos();
    let end = p.line_end(start);
    let line = LineIndex::build(p, start, end);
    inline_until(p, InlineCtx::new(&line), end);
}

fn inline_until(p: &mut Parser<'_, '_>, ctx: InlineCtx<'_>, end: usize) {
    while p.pos() < end && !p.at_end() {
        inline_element(p, ctx, end);
    }
}

fn inline_element(p: &mut Parser<'_, '_>, ctx: InlineCtx<'_>, end: usize) {
    let flavor = p.flavor();
    match p.current() {
        SyntaxKind::BACKTICK => code_span(p, ctx, end),
        SyntaxKind::STAR | SyntaxKind::UNDERSCORE => emphasis_or_strong(p, ctx, end),
        SyntaxKind::TILDE if flavor.strikethrough => strikethrough(p, ctx, end),
        SyntaxKind::LBRACKET if !ctx.in_link => match scan_link(p, ctx, p.pos(), end) {
            Some(shape) => link(p, ctx, &shape),
            None => p.bump(),
        },
        SyntaxKind::EXCLAIM if !ctx.in_link => match scan_link(p, ctx, p.pos() + 1, end) {
            Some(shape) => image(p, ctx, &shape),
            None => p.bump(),
        },
        SyntaxKind::LT => angle(p, ctx, end),
        SyntaxKind::COLON if flavor.chat_tokens => custom_emote(p),
        // A bare URL inside link text would nest one link in another
        SyntaxKind::GFM_AUTOLINK if !flavor.gfm_autolinks || ctx.in_link => {
            p.bump_remap(SyntaxKind::TEXT)
        }
        _ => p.bump(),
    }
}

/// Length of the run of `kind` starting at `idx`, stopping at `end`.
fn run_len(p: &Parser<'_, '_>, idx: usize, kind: SyntaxKind, end: usize) -> usize {
    (idx..end).take_while(|&i| p.kind_at(i) == kind).count()
}

/// Last character before token `idx`; start of line counts as none.
fn char_before(p: &Parser<'_, '_>, idx: usize) -> Option<char> {
    if idx == 0 || p.kind_at(idx - 1) == SyntaxKind::NEWLINE {
        return None;
    }
    p.text_at(idx - 1).chars().next_back()
}

/// First character of token `idx`; end of line counts as none.
fn char_after(p: &Parser<'_, '_>, idx: usize) -> Option<char> {
    match p.kind_at(idx) {
        SyntaxKind::NEWLINE | SyntaxKind::EOF => None,
        _ => p.text_at(idx).chars().next(),
    }
}

fn can_open(p: &Parser<'_, '_>, start: usize, end: usize) -> bool {
    let before_ok = char_before(p, start).is_none_or(|c| !c.is_alphanumeric());
    let after_ok = char_after(p, end).is_some_and(|c| !c.is_whitespace());
    before_ok && after_ok
}

fn can_close(p: &Parser<'_, '_>, start: usize, end: usize) -> bool {
    let before_ok = char_before(p, start).is_some_and(|c| !c.is_whitespace());
    let after_ok = char_after(p, end).is_none_or(|c| !c.is_alphanumeric());
    before_ok && after_ok
}

/// A code span closes on a backtick run of exactly the opening length;
/// otherwise the opening run is literal.
fn code_span(p: &mut Parser<'_, '_>, ctx: InlineCtx<'_>, end: usize) {
    let open = run_len(p, p.pos(), SyntaxKind::BACKTICK, end);
    match ctx.line.code_span_end(p, p.pos(), end) {
        Some(close_end) => {
            let m = p.start();
            p.bump_to(close_end);
            m.complete(p, SyntaxKind::CODE_SPAN);
        }
        None => {
            for _ in 0..open {
                p.bump();
            }
        }
    }
}

/// Find the run that closes an opener of `kind` needing `need` delimiters.
///
/// Returns the closer's index and how many delimiters it has available.
/// Runs that open their own pair on the way are matched first, so
/// `*a **b** c*` closes on the last `*`.
///
/// The outcome from any run depends only on that run and the query, so
/// every run walked past is memoised with the final answer.
fn find_closer(
    p: &Parser<'_, '_>,
    line: &LineIndex,
    kind: SyntaxKind,
    from: usize,
    end: usize,
    need: usize,
    depth: usize,
) -> Option<(usize, usize)> {
    let query = |at| CloserQuery {
        kind,
        at,
        end,
        need,
        depth,
    };
    let mut walked = Vec::new();
    let mut i = from;

    let found = loop {
        while i < end && !matches!(p.kind_at(i), k if k == kind || k == SyntaxKind::BACKTICK) {
            i += 1;
        }
        if i >= end {
            break None;
        }
        if let Some(&known) = line.closers.borrow().get(&query(i)) {
            break known;
        }
        walked.push(i);

        if p.kind_at(i) == SyntaxKind::BACKTICK {
            i = line.skip_backticks(p, i, end);
            continue;
        }

        let run = run_len(p, i, kind, end);
        if run >= need && can_close(p, i, i + run) {
            break Some((i, run));
        }
        if depth < MAX_INLINE_DEPTH && can_open(p, i, i + run) {
            let inner_need = run.min(2);
            match find_closer(p, line, kind, i + run, end, inner_need, depth + 1) {
                Some((close, _)) => {
                    i = close + inner_need;
                    continue;
                }
                // Nothing later closes for the inner opener, so nothing
                // closes for us either
                None if need >= inner_need => break None,
                None => {}
            }
        }
        i += run;
    };

    let mut closers = line.closers.borrow_mut();
    for at in walked {
        closers.insert(query(at), found);
    }
    found
}

/// Start of the `~~` closing a strikethrough whose content starts at
/// `from`, memoised like [`find_closer`].
fn tilde_closer(p: &Parser<'_, '_>, line: &LineIndex, from: usize, end: usize) -> Option<usize> {
    let mut walked = Vec::new();
    let mut i = from;

    let found = loop {
        while i < end && !matches!(p.kind_at(i), SyntaxKind::TILDE | SyntaxKind::BACKTICK) {
            i += 1;
        }
        if i >= end {
            break None;
        }
        if let Some(&known) = line.tildes.borrow().get(&(i, end)) {
            break known;
        }
        walked.push(i);

        if p.kind_at(i) == SyntaxKind::BACKTICK {
            i = line.skip_backticks(p, i, end);
            continue;
        }
        let run = run_len(p, i, SyntaxKind::TILDE, end);
        if run == 2 && char_before(p, i).is_some_and(|c| !c.is_whitespace()) {
            break Some(i);
        }
        i += run;
    };

    let mut tildes = line.tildes.borrow_mut();
    for at in walked {
        tildes.insert((at, end), found);
    }
    found
}

fn bump_literal(p: &mut Parser<'_, '_>, n: usize) {
    for _ in 0..n {
        p.bump();
    }
}

fn emphasis_or_strong(p: &mut Parser<'_, '_>, ctx: InlineCtx<'_>, end: usize) {
    let kind = p.current();
    let start = p.pos();
    let run = run_len(p, start, kind, end);

    if ctx.depth >= MAX_INLINE_DEPTH || !can_open(p, start, start + run) {
        bump_literal(p, run);
        return;
    }

    if run >= 2 {
        if let Some((close, close_run)) =
            find_closer(p, ctx.line, kind, start + run, end, 2, ctx.depth)
        {
            if run >= 3 && close_run >= 3 {
                bump_literal(p, run - 3);
                let outer = p.start();
                p.bump();
                strong(p, ctx.nested(), close);
                p.bump();
                outer.complete(p, SyntaxKind::EMPHASIS);
            } else {
                bump_literal(p, run - 2);
                strong(p, ctx, close);
            }
            return;
        }
    }

    match find_closer(p, ctx.line, kind, start + run, end, 1, ctx.depth) {
        Some((close, _)) => {
            bump_literal(p, run - 1);
            let m = p.start();
            p.bump();
            inline_until(p, ctx.nested(), close);
            p.bump();
            m.complete(p, SyntaxKind::EMPHASIS);
        }
        None => bump_literal(p, run),
    }
}

/// Two delimiters, content up to `close`, two delimiters.
fn strong(p: &mut Parser<'_, '_>, ctx: InlineCtx<'_>, close: usize) {
    let m = p.start();
    p.bump();
    p.bump();
    inline_until(p, ctx.nested(), close);
    p.bump();
    p.bump();
    m.complete(p, SyntaxKind::STRONG);
}

/// `~~text~~`; any other tilde run is literal.
fn strikethrough(p: &mut Parser<'_, '_>, ctx: InlineCtx<'_>, end: usize) {
    let start = p.pos();
    let run = run_len(p, start, SyntaxKind::TILDE, end);
    let opens = run == 2
        && ctx.depth < MAX_INLINE_DEPTH
        && char_after(p, start + 2).is_some_and(|c| !c.is_whitespace());

    let close = opens
        .then(|| tilde_closer(p, ctx.line, start + 2, end))
        .flatten();

    match close {
        Some(close) => {
            let m = p.start();
            p.bump();
            p.bump();
            inline_until(p, ctx.nested(), close);
            p.bump();
            p.bump();
            m.complete(p, SyntaxKind::STRIKETHROUGH);
        }
        None => bump_literal(p, run),
    }
}

/// Token positions of a complete `[text](dest "title")`.
#[derive(Debug, Clone, Copy)]
struct LinkShape {
    /// The `]`
    text_close: usize,
    /// Destination token range
    dest: Option<(usize, usize)>,
    /// Title token range, quotes included
    title: Option<(usize, usize)>,
    /// The `)`
    paren_close: usize,
}

/// Look for a complete inline link whose `[` is at `idx`.
fn scan_link(
    p: &Parser<'_, '_>,
    ctx: InlineCtx<'_>,
    idx: usize,
    end: usize,
) -> Option<LinkShape> {
    if p.kind_at(idx) != SyntaxKind::LBRACKET {
        return None;
    }
    let text_close = ctx.line.bracket_close(idx, end)?;

    if p.kind_at(text_close + 1) != SyntaxKind::LPAREN {
        return None;
    }
    let mut i = text_close + 2;
    let skip_ws = |i: usize| {
        if p.kind_at(i) == SyntaxKind::WHITESPACE {
            i + 1
        } else {
            i
        }
    };
    i = skip_ws(i);

    let dest_start = i;
    if p.kind_at(i) == SyntaxKind::LT {
        let close = (i + 1..end).find(|&j| {
            matches!(
                p.kind_at(j),
                SyntaxKind::GT | SyntaxKind::LT | SyntaxKind::WHITESPACE
            )
        })?;
        if p.kind_at(close) != SyntaxKind::GT {
            return None;
        }
        i = close + 1;
    } else {
        i = ctx.line.destination_end(i, end);
    }
    let dest = (i > dest_start).then_some((dest_start, i));

    let mut title = None;
    let after_dest = skip_ws(i);
    if after_dest > i || dest.is_none() {
        let quote = p.kind_at(after_dest);
        if matches!(quote, SyntaxKind::DOUBLE_QUOTE | SyntaxKind::SINGLE_QUOTE) {
            let close = (after_dest + 1..end).find(|&j| p.kind_at(j) == quote)?;
            title = Some((after_dest, close + 1));
            i = skip_ws(close + 1);
        } else {
            i = after_dest;
        }
    }

    if i >= end || p.kind_at(i) != SyntaxKind::RPAREN {
        return None;
    }

    Some(LinkShape {
        text_close,
        dest,
        title,
        paren_close: i,
    })
}

/// Emit an inline link described by `shape`, starting at the `[`.
fn link(p: &mut Parser<'_, '_>, ctx: InlineCtx<'_>, shape: &LinkShape) {
    let m = p.start();

    let text = p.start();
    p.bump();
    let inner = InlineCtx {
        in_link: true,
        ..ctx.nested()
    };
    inline_until(p, inner, shape.text_close);
    p.bump();
    text.complete(p, SyntaxKind::LINK_TEXT);

    p.bump();
    if let Some((start, end)) = shape.dest {
        p.bump_to(start);
        let dest = p.start();
        p.bump_to(end);
        dest.complete(p, SyntaxKind::LINK_DESTINATION);
    }
    if let Some((start, end)) = shape.title {
        p.bump_to(start);
        let title = p.start();
        p.bump_to(end);
        title.complete(p, SyntaxKind::LINK_TITLE);
    }
    p.bump_to(shape.paren_close);
    p.bump();

    m.complete(p, SyntaxKind::INLINE_LINK);
}

/// `!` followed by an inline link.
fn image(p: &mut Parser<'_, '_>, ctx: InlineCtx<'_>, shape: &LinkShape) {
    let m = p.start();
    p.bump();
    link(p, ctx, shape);
    m.complete(p, SyntaxKind::IMAGE);
}

fn id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9A-Z]{26}$").expect("Invalid id regex"))
}

fn user_mention_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^@[0-9A-Z]{26}$").expect("Invalid mention regex"))
}

fn digits_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+$").expect("Invalid digits regex"))
}

fn uri_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]{1,31}:[^\s<>]*$").expect("Invalid URI regex")
    })
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]{0,61}[A-Za-z0-9])?)*$",
        )
        .expect("Invalid email regex")
    })
}

/// Number of tokens in a chat construct opening with `<` at `idx`, and its
/// node kind.
fn chat_token(p: &Parser<'_, '_>, idx: usize) -> Option<(usize, SyntaxKind)> {
    let k = |n: usize| p.kind_at(idx + n);
    let t = |n: usize| p.text_at(idx + n);

    if k(1) == SyntaxKind::TEXT && user_mention_regex().is_match(t(1)) && k(2) == SyntaxKind::GT {
        return Some((3, SyntaxKind::USER_MENTION));
    }
    if k(1) == SyntaxKind::HASH
        && k(2) == SyntaxKind::TEXT
        && id_regex().is_match(t(2))
        && k(3) == SyntaxKind::GT
    {
        return Some((4, SyntaxKind::CHANNEL_MENTION));
    }
    if k(1) == SyntaxKind::TEXT
        && t(1) == "t"
        && k(2) == SyntaxKind::COLON
        && k(3) == SyntaxKind::TEXT
        && digits_regex().is_match(t(3))
    {
        if k(4) == SyntaxKind::GT {
            return Some((5, SyntaxKind::TIMESTAMP));
        }
        let style_ok = k(5) == SyntaxKind::TEXT
            && matches!(t(5), "t" | "T" | "d" | "D" | "f" | "F" | "R");
        if k(4) == SyntaxKind::COLON && style_ok && k(6) == SyntaxKind::GT {
            return Some((7, SyntaxKind::TIMESTAMP));
        }
    }
    None
}

/// Number of tokens in an autolink `<scheme:…>` or `<user@host>` at `idx`.
fn autolink_len(p: &Parser<'_, '_>, idx: usize, end: usize) -> Option<usize> {
    let close = (idx + 1..end).find(|&j| {
        matches!(
            p.kind_at(j),
            SyntaxKind::GT | SyntaxKind::LT | SyntaxKind::WHITESPACE
        )
    })?;
    if p.kind_at(close) != SyntaxKind::GT || close == idx + 1 {
        return None;
    }
    let inner: String = (idx + 1..close).map(|j| p.text_at(j)).collect();
    (uri_regex().is_match(&inner) || email_regex().is_match(&inner)).then_some(close + 1 - idx)
}

fn angle(p: &mut Parser<'_, '_>, ctx: InlineCtx<'_>, end: usize) {
    let idx = p.pos();

    if p.flavor().chat_tokens {
        if let Some((len, kind)) = chat_token(p, idx).filter(|(len, _)| idx + len <= end) {
            let m = p.start();
            p.bump_to(idx + len);
            m.complete(p, kind);
            return;
        }
    }

    if !ctx.in_link {
        if let Some(len) = autolink_len(p, idx, end) {
            let m = p.start();
            for _ in 0..len {
                // The URL inside is one link, not a link in a link
                if p.at(SyntaxKind::GFM_AUTOLINK) {
                    p.bump_remap(SyntaxKind::TEXT);
                } else {
                    p.bump();
                }
            }
            m.complete(p, SyntaxKind::AUTOLINK);
            return;
        }
    }

    p.bump();
}

/// `:ID:` where ID is 26 characters of `[0-9A-Z]`.
fn custom_emote(p: &mut Parser<'_, '_>) {
    let is_emote = p.nth(1) == SyntaxKind::TEXT
        && id_regex().is_match(p.text_at(p.pos() + 1))
        && p.nth(2) == SyntaxKind::COLON;

    if is_emote {
        let m = p.start();
        p.bump();
        p.bump();
        p.bump();
        m.complete(p, SyntaxKind::CUSTOM_EMOTE);
    } else {
        p.bump();
    }
}
