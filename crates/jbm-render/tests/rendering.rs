use jbm_render::{
    Action, AnnotationKind, BlockKind, MAX_QUOTE_NESTING, MessageCache, OBJECT_REPLACEMENT,
    Overflow, ParsedMessage, PlaceholderKind, RenderContext, Renderer, StyledDocument,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

const USER: &str = "01ARZ3NDEKTSV4RRFFQ69G5FAV";
const EMOTE: &str = "01BX5ZZKBKACTAV9WEVGEMMVRZ";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn render(source: &str) -> StyledDocument {
    init_logging();
    Renderer::default().render_str(source, &RenderContext::default())
}

#[test]
fn bold_text_followed_by_link() {
    let doc = render("**Hi** [docs](https://example.com/docs)");
    assert_eq!(doc.text, "Hi docs");

    let bold = doc.run_at(0).expect("run at start");
    assert!(bold.style.bold);
    assert_eq!(bold.range, 0..2);

    assert_eq!(doc.annotations.len(), 1);
    let link = &doc.annotations[0];
    assert_eq!(link.kind, AnnotationKind::Url);
    assert_eq!(&doc.text[link.range.clone()], "docs");
    assert_eq!(
        doc.tap_action(4),
        Some(Action::OpenUrl("https://example.com/docs".to_string()))
    );
    assert_eq!(doc.tap_action(1), None);
    assert!(doc.run_at(4).is_some_and(|r| r.annotations == vec![0]));
}

#[test]
fn quotes_stop_nesting_past_the_limit() {
    let doc = render("> > > > > > deep");
    assert!(!doc.text.contains("deep"));

    let depths: Vec<usize> = doc
        .blocks
        .iter()
        .filter_map(|b| match b.kind {
            BlockKind::Quote { depth } => Some(depth),
            _ => None,
        })
        .collect();
    assert_eq!(depths, (1..=MAX_QUOTE_NESTING + 1).collect::<Vec<_>>());
}

#[test]
fn quote_at_the_limit_still_renders() {
    let doc = render("> > > > > five");
    assert_eq!(doc.text, "five");
}

#[test]
fn unterminated_fence_is_plain_code() {
    let doc = render("```rust\nfn main() {");
    assert_eq!(doc.text, "fn main() {");
    assert!(doc.runs.iter().all(|r| r.style.monospace));
    assert!(doc.runs.iter().all(|r| r.style.color.is_none()));
}

#[test]
fn emote_hit_test_yields_only_the_emote() {
    let doc = render(&format!(":{EMOTE}:"));
    assert_eq!(doc.text, OBJECT_REPLACEMENT.to_string());

    let hits = doc.annotations_at(0);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].kind, AnnotationKind::CustomEmote);
    assert_eq!(doc.tap_action(0), Some(Action::EmoteInfo(EMOTE.to_string())));
    assert!(doc.consumes_tap(0));
    assert_eq!(
        doc.placeholder_at(0).map(|p| &p.kind),
        Some(&PlaceholderKind::CustomEmote {
            id: EMOTE.to_string()
        })
    );
}

#[test]
fn task_list_gets_checkbox_placeholders_in_order() {
    let doc = render("- [x] done\n- [ ] todo");
    let checks: Vec<_> = doc
        .placeholders
        .iter()
        .map(|p| (p.id, p.kind.clone()))
        .collect();
    assert_eq!(
        checks,
        vec![
            (0, PlaceholderKind::Checkbox { checked: true }),
            (1, PlaceholderKind::Checkbox { checked: false }),
        ]
    );
    assert!(doc.placeholders[0].anchor < doc.placeholders[1].anchor);
    assert_eq!(doc.tap_action(doc.placeholders[0].anchor), None);
}

#[test]
fn user_mention_opens_sheet_on_current_server() {
    init_logging();
    let ctx = RenderContext {
        current_server_id: Some("SERVER".to_string()),
        ..RenderContext::default()
    };
    let doc = Renderer::default().render_str(&format!("ping <@{USER}>"), &ctx);
    assert_eq!(
        doc.tap_action(6),
        Some(Action::OpenUserSheet {
            user_id: USER.to_string(),
            server_id: Some("SERVER".to_string())
        })
    );
}

#[test]
fn unclickable_links_keep_their_annotations() {
    init_logging();
    let ctx = RenderContext {
        links_clickable: false,
        ..RenderContext::default()
    };
    let doc = Renderer::default().render_str("[a](https://example.com)", &ctx);
    assert_eq!(doc.annotations.len(), 1);
    assert_eq!(doc.tap_action(0), None);
    assert_eq!(
        doc.long_press_actions(0),
        vec![Action::LinkInfo("https://example.com".to_string())]
    );
}

#[test]
fn rendering_is_deterministic() {
    let source = "# Title\n\nsome *text* with `code` and <t:1700000000:R>\n\n```py\nprint(1)\n```";
    assert_eq!(render(source), render(source));
}

#[test]
fn single_line_documents_ellipsize() {
    init_logging();
    let ctx = RenderContext {
        single_line: true,
        ..RenderContext::default()
    };
    let doc = Renderer::default().render_str("a\nb", &ctx);
    assert_eq!(doc.line_limit, Some(1));
    assert_eq!(doc.overflow, Overflow::Ellipsis);

    let full = render("a\nb");
    assert_eq!(full.line_limit, None);
    assert_eq!(full.overflow, Overflow::Clip);
}

#[test]
fn char_offsets_map_to_bytes() {
    let doc = render("é **b** ✓");
    assert_eq!(doc.text, "é b ✓");
    assert_eq!(doc.char_to_byte_offset(0), 0);
    assert_eq!(doc.char_to_byte_offset(2), 3);
    assert!(doc.run_at(doc.char_to_byte_offset(2)).is_some_and(|r| r.style.bold));
    assert_eq!(doc.char_to_byte_offset(99), doc.text.len());
}

#[test]
fn runs_cover_the_text_without_gaps() {
    let doc = render("plain **bold** [link](u) ~~gone~~\n\n> quoted `code`");
    let mut at = 0;
    for run in &doc.runs {
        assert_eq!(run.range.start, at);
        assert!(run.range.end > run.range.start);
        at = run.range.end;
    }
    assert_eq!(at, doc.text.len());
}

#[test]
fn document_survives_json() {
    let doc = render(&format!(
        "## Hi <@{USER}>\n\n- [x] ok :{EMOTE}:\n\n```rust\nlet x = 1;\n```"
    ));
    let json = serde_json::to_string(&doc).expect("serialize");
    let back: StyledDocument = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, doc);
}

#[test]
fn cached_parse_renders_with_new_context() {
    init_logging();
    let renderer = Renderer::default();
    let mut cache = MessageCache::default();

    let first = cache.get_or_parse("# big");
    let normal = renderer.render_document(&first, &RenderContext::default());

    let again = cache.get_or_parse("# big");
    assert!(std::sync::Arc::ptr_eq(&first, &again));
    assert_eq!(cache.len(), 1);

    let scaled = renderer.render_document(
        &again,
        &RenderContext {
            font_size_multiplier: 2.0,
            ..RenderContext::default()
        },
    );
    assert_eq!(normal.text, scaled.text);

    let size = |doc: &StyledDocument| doc.runs[0].style.font_size.unwrap_or_default();
    assert_eq!(size(&scaled), size(&normal) * 2.0);
}

#[test]
fn parsed_message_keeps_its_source() {
    let parsed = ParsedMessage::parse("hello *there*");
    assert_eq!(parsed.source(), "hello *there*");
    assert_eq!(parsed.syntax().text().to_string(), "hello *there*");
}

fn nested_list(depth: usize) -> String {
    (0..depth)
        .map(|d| format!("{}- item {d}\n", "  ".repeat(d)))
        .collect()
}

#[rstest]
#[case::star_flood("*".repeat(20_000))]
#[case::unclosed_strong("**a ".repeat(5_000))]
#[case::alternating_delimiters("*_~".repeat(6_000))]
#[case::tilde_flood("~~x ".repeat(5_000))]
#[case::backtick_runs("`` a ` ".repeat(3_000))]
#[case::open_brackets("[".repeat(20_000))]
#[case::close_brackets("](".repeat(10_000))]
#[case::nested_brackets(format!("{}x{}", "[".repeat(5_000), "]".repeat(5_000)))]
#[case::broken_links("[a](b(".repeat(4_000))]
#[case::image_openers("![".repeat(10_000))]
#[case::mention_openers("<@".repeat(10_000))]
#[case::timestamp_openers("<t:".repeat(6_000))]
#[case::colons(":".repeat(20_000))]
#[case::escapes(r"\*".repeat(10_000))]
#[case::deep_quote(format!("{}x", "> ".repeat(5_000)))]
#[case::deep_inline_quote(format!("{}x", ">".repeat(20_000)))]
#[case::deep_bullets(format!("{}x", "- ".repeat(5_000)))]
#[case::deep_indented_list(nested_list(200))]
#[case::many_quote_lines("> x\n".repeat(5_000))]
#[case::many_headings("# h\n".repeat(5_000))]
#[case::unterminated_fences("```\n".repeat(5_000))]
#[case::pipe_rows("|-|\n".repeat(5_000))]
fn adversarial_input_renders_in_bounded_output_and_time(#[case] source: String) {
    init_logging();
    let started = std::time::Instant::now();
    let parsed = ParsedMessage::parse(&source);
    let doc = Renderer::default().render_document(&parsed, &RenderContext::default());
    let elapsed = started.elapsed();

    assert!(
        elapsed < std::time::Duration::from_secs(3),
        "took {elapsed:?} for {} bytes",
        source.len()
    );
    // Bullets, wrappers and labels add a bounded number of bytes per node.
    let nodes = parsed.syntax().descendants().count();
    assert!(
        doc.text.len() <= source.len() + 64 * nodes,
        "{} bytes of text from {} bytes of source in {nodes} nodes",
        doc.text.len(),
        source.len()
    );

    let mut at = 0;
    for run in &doc.runs {
        assert_eq!(run.range.start, at);
        at = run.range.end;
    }
    assert_eq!(at, doc.text.len());
    assert!(doc.annotations.iter().all(|a| a.range.end <= doc.text.len()));
    assert!(doc.blocks.iter().all(|b| b.range.end <= doc.text.len()));
}
