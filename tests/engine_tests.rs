use std::collections::{BTreeSet, HashSet};

use a11y_compressor::{
    compress_from_raw,
    domain::domain_model::Domain,
    engine::{
        compressor::{CompressOptions, Compressor},
        engine_model::{Compression, FormatContext, RegionMap, View, MODAL_REGION},
        plugin::{plugin_for, CONTENT_REGION},
        serialize::{
            dedup_overlapping, dedup_rendered, hierarchical_lines, merge_fragments, render_region,
            sorted_lines, ContentLine,
        },
    },
    geometry::bbox::ScreenSize,
    trace::{logger::TraceLogger, trace::TraceStage},
    tree::element_model::{Element, ElementId},
};

mod common;

use common::{build, dump, frame, row, section};

fn no_keywords() -> BTreeSet<String> {
    BTreeSet::new()
}

fn line(tag: &str, label: &str, cx: i32, cy: i32) -> ContentLine {
    ContentLine {
        cy,
        cx,
        tag: tag.to_string(),
        label: label.to_string(),
        suffix: String::new(),
    }
}

/// Every element sits in exactly one region, and the modal split covers the
/// dynamic elements exactly.
fn assert_total(elements: &[Element], c: &Compression) {
    let mut seen = HashSet::new();
    for (_, ids) in c.regions.iter() {
        for id in ids {
            assert!(seen.insert(*id), "{:?} in two regions", id);
        }
    }
    let all: HashSet<ElementId> = elements.iter().map(|el| el.id).collect();
    assert_eq!(seen, all);

    let split: HashSet<ElementId> = c.split.dynamic.iter().chain(&c.split.static_ids).copied().collect();
    assert_eq!(split, all);
    assert_eq!(c.split.dynamic.len() + c.split.static_ids.len(), elements.len());
}

fn chrome_page() -> Vec<String> {
    vec![
        frame(),
        row("push-button", "Minimize", 1750, 0, 50, 30),
        row("push-button", "Close", 1870, 0, 50, 30),
        row("push-button", "New Tab", 300, 40, 30, 10),
        row("push-button", "Reload", 100, 70, 30, 30),
        "entry\tAddress and search bar\thttps://www.google.com/search?q=rust+lang&hl=en\t\t\t(200, 70)\t(900, 30)".to_string(),
        row("heading", "Rust Programming Language", 200, 200, 600, 40),
        row("link", "rust-lang.org", 200, 260, 200, 20),
        row("label", "We use cookies", 600, 880, 400, 20),
        row("push-button", "Accept all", 800, 950, 120, 40),
    ]
}

// =========================================================================
// Assembly
// =========================================================================

#[test]
fn empty_input_has_no_sections() {
    let c = compress_from_raw("", None);
    assert!(c.lines.is_empty());
    assert!(c.sections().is_empty());
    assert_eq!(c.domain, Domain::Generic);

    let headers_only = compress_from_raw("tag\tname\ttext\n\n", None);
    assert!(headers_only.lines.is_empty());
}

#[test]
fn chrome_page_sections_in_order_with_modal_last() {
    let elements = build(&chrome_page());
    let mut compressor = Compressor::default();
    let c = compressor.compress(&elements, &no_keywords());

    assert_eq!(c.domain, Domain::Chrome);
    assert_eq!(c.lines[0], "URL: Google Search: \"rust lang\"");
    assert_eq!(
        c.sections(),
        vec!["WINDOW_CONTROLS", "BROWSER_TABS", "BROWSER_UI", "CONTENT", MODAL_REGION]
    );

    assert_eq!(
        section(&c.lines, "WINDOW_CONTROLS"),
        vec![
            "[window-button] \"Minimize\" @ (1775, 15)",
            "[window-button] \"Close\" @ (1895, 15)",
        ]
    );
    assert_eq!(
        section(&c.lines, "BROWSER_TABS"),
        vec!["[browser-tab-button] \"New Tab\" @ (315, 45)"]
    );

    let modal = section(&c.lines, MODAL_REGION);
    assert!(modal.iter().any(|l| l.contains("\"Accept all\"")));
    assert!(modal.iter().any(|l| l.contains("\"We use cookies\"")));

    let content = section(&c.lines, CONTENT_REGION);
    assert!(content.iter().all(|l| !l.contains("cookies")), "Modal ids leave their region");
    assert_eq!(content[0], "[heading] \"Rust Programming Language\" @ (500, 220)");
    assert_eq!(content[1], "  [link] \"rust-lang.org\" @ (300, 270)");

    assert_total(&elements, &c);
}

#[test]
fn static_elements_never_reach_modal_detection() {
    let elements = build(&chrome_page());
    let c = Compressor::default().compress(&elements, &no_keywords());

    let statics: HashSet<ElementId> = c.split.static_ids.iter().copied().collect();
    assert!(c.modal.iter().all(|id| !statics.contains(id)));
    assert!(statics.contains(&elements[1].id), "Window controls are static");
}

#[test]
fn generic_domain_puts_everything_in_content() {
    let elements = build(&[
        row("label", "Name", 10, 10, 50, 20),
        row("entry", "", 80, 10, 200, 20),
        row("push-button", "OK", 10, 60, 80, 30),
    ]);
    let c = Compressor::default().compress(&elements, &no_keywords());

    assert_eq!(c.domain, Domain::Generic);
    assert_eq!(c.sections(), vec![CONTENT_REGION]);
    assert_eq!(c.regions.get(CONTENT_REGION).len(), 3);
    assert!(c.modal.is_empty());
    assert_total(&elements, &c);
}

#[test]
fn compress_as_uses_the_named_plugin() {
    let elements = build(&[row("label", "Hello", 10, 10, 50, 20)]);
    let c = Compressor::default().compress_as(Domain::LibreofficeCalc, &elements, &no_keywords());

    assert_eq!(c.domain, Domain::LibreofficeCalc);
    assert_eq!(c.lines, vec!["CONTENT:", "[label] \"Hello\" @ (35, 20)"]);
    assert_eq!(plugin_for(Domain::LibreofficeCalc).domain(), Domain::LibreofficeCalc);
}

#[test]
fn instruction_keywords_steer_truncation() {
    let long = format!("{} target phrase {}", "lorem ".repeat(40), "ipsum ".repeat(40));
    let raw = dump(&[format!("paragraph\t{}\t\t\t\t(0, 0)\t(800, 200)", long)]);

    let plain = compress_from_raw(&raw, None);
    let focused = compress_from_raw(&raw, Some("Find the target phrase"));

    assert!(!plain.text().contains("target phrase"));
    assert!(focused.text().contains("target phrase"));
}

// =========================================================================
// Serialization helpers
// =========================================================================

#[test]
fn rendered_dedup_is_idempotent() {
    let elements = build(&[
        row("push-button", "OK", 10, 10, 80, 30),
        row("push-button", "OK", 10, 10, 80, 30),
        row("label", "Title", 10, 100, 80, 30),
    ]);
    let regions = RegionMap::new(&[CONTENT_REGION]);
    let ctx = FormatContext::new(ScreenSize::new(1920, 1080));
    let ids: Vec<ElementId> = elements.iter().map(|el| el.id).collect();

    let once = dedup_rendered(sorted_lines(&elements, &ids, &regions, &ctx));
    let twice = dedup_rendered(once.clone());
    assert_eq!(once, twice);
    assert_eq!(once.len(), 2);

    let rendered = render_region(&elements, &ids, &regions, &ctx);
    assert_eq!(rendered, vec!["[push-button] \"OK\" @ (50, 25)", "[label] \"Title\" @ (50, 115)"]);
}

#[test]
fn state_suffix_is_rendered() {
    let elements = build(&["check-box\tRemember me\t\t\t\t(0, 0)\t(20, 20)\tchecked, focused".to_string()]);
    let regions = RegionMap::new(&[CONTENT_REGION]);
    let ctx = FormatContext::new(ScreenSize::new(1920, 1080));

    let rendered = render_region(&elements, &[ElementId(0)], &regions, &ctx);
    assert_eq!(rendered, vec!["[check-box] \"Remember me\" @ (10, 10) (checked, focused)"]);
}

#[test]
fn overlapping_duplicates_keep_the_most_interactive() {
    let elements = build(&[
        row("label", "Save", 100, 100, 60, 20),
        row("push-button", "Save", 100, 105, 60, 20),
        row("label", "Save", 100, 500, 60, 20),
    ]);
    let ids: Vec<ElementId> = elements.iter().map(|el| el.id).collect();
    let kept = dedup_overlapping(&elements, &ids, &RegionMap::new(&[]));

    assert_eq!(kept, vec![ElementId(1), ElementId(2)]);
}

#[test]
fn label_and_value_fragments_merge() {
    let merged = merge_fragments(
        vec![
            line("label", "Width:", 100, 200),
            line("spin-button", "1920", 180, 205),
            line("label", "Far away", 100, 600),
            line("entry", "value", 900, 610),
        ],
        30,
        100,
    );

    assert_eq!(merged.len(), 3);
    assert_eq!(merged[0].render(), "[spin-button] \"Width: 1920\" @ (100, 200)");
    assert_eq!(merged[1].label, "Far away");
}

#[test]
fn headings_indent_until_a_large_gap() {
    let out = hierarchical_lines(
        &[
            line("heading", "Section", 0, 100),
            line("label", "Inside", 0, 150),
            line("label", "Outside", 0, 500),
        ],
        None,
    );
    assert_eq!(
        out,
        vec![
            "[heading] \"Section\" @ (0, 100)",
            "  [label] \"Inside\" @ (0, 150)",
            "[label] \"Outside\" @ (0, 500)",
        ]
    );
}

// =========================================================================
// View smoothing
// =========================================================================

fn mail_with_dialog(home: bool) -> Vec<Element> {
    let mut rows = vec![
        frame(),
        row("tree-item", "user@example.com", 150, 200, 200, 30),
        row("tree-item", "Inbox", 170, 240, 180, 30),
        row("dialog", "Message Filters", 600, 300, 600, 400),
        row("push-button", "OK", 850, 650, 80, 30),
    ];
    if home {
        rows.push(row("push-button", "Set Up Another Account", 700, 150, 300, 30));
    }
    build(&rows)
}

#[test]
fn view_change_suppresses_modal_detection_for_cooldown_calls() {
    let mut compressor = Compressor::default();
    let kw = no_keywords();

    let first = compressor.compress_as(Domain::Thunderbird, &mail_with_dialog(false), &kw);
    assert_eq!(first.view, Some(View::Mail));
    assert!(!first.modal_suppressed, "The first view is not a change");
    assert!(!first.modal.is_empty());

    let second = compressor.compress_as(Domain::Thunderbird, &mail_with_dialog(true), &kw);
    assert_eq!(second.view, Some(View::Home));
    assert!(second.modal_suppressed);
    assert!(second.modal.is_empty());
    assert_eq!(compressor.cooldown(), 1);

    let third = compressor.compress_as(Domain::Thunderbird, &mail_with_dialog(true), &kw);
    assert!(third.modal_suppressed);
    assert_eq!(compressor.cooldown(), 0);

    let fourth = compressor.compress_as(Domain::Thunderbird, &mail_with_dialog(true), &kw);
    assert!(!fourth.modal_suppressed, "Detection recovers after the cooldown");
    assert!(!fourth.modal.is_empty());
    assert_eq!(compressor.last_view(), Some(View::Home));
}

#[test]
fn zero_cooldown_never_suppresses() {
    let options = CompressOptions {
        view_cooldown: 0,
        ..CompressOptions::default()
    };
    let mut compressor = Compressor::new(options);
    let kw = no_keywords();

    compressor.compress_as(Domain::Thunderbird, &mail_with_dialog(false), &kw);
    let changed = compressor.compress_as(Domain::Thunderbird, &mail_with_dialog(true), &kw);
    assert!(!changed.modal_suppressed);
}

#[test]
fn plugins_without_views_never_suppress() {
    let mut compressor = Compressor::default();
    let elements = build(&chrome_page());
    for _ in 0..3 {
        let c = compressor.compress(&elements, &no_keywords());
        assert!(!c.modal_suppressed);
        assert!(!c.modal.is_empty());
    }
    assert_eq!(compressor.last_view(), None);
}

#[test]
fn view_change_is_traced() {
    let mut compressor = Compressor::default().with_trace(TraceLogger::in_memory());
    let kw = no_keywords();

    compressor.compress_as(Domain::Thunderbird, &mail_with_dialog(false), &kw);
    compressor.compress_as(Domain::Thunderbird, &mail_with_dialog(true), &kw);

    let events = compressor.trace().events();
    let changes: Vec<_> = events.iter().filter(|e| e.stage == TraceStage::ViewChange).collect();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].reason.as_deref(), Some("mail -> home"));
    assert_eq!(changes[0].total, Some(2));
}

#[test]
fn modal_and_regions_stay_total_under_random_layouts() {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let tags = ["push-button", "label", "menu", "menu-item", "dialog", "panel", "link", "tree-item", "entry"];
    let names = ["OK", "Close", "Accept all", "cookie", "File", "Image", "user@x.org", "", "Password"];
    let mut rng = StdRng::seed_from_u64(7);

    for round in 0..40 {
        let rows: Vec<String> = (0..rng.gen_range(1..40))
            .map(|_| {
                row(
                    tags[rng.gen_range(0..tags.len())],
                    names[rng.gen_range(0..names.len())],
                    rng.gen_range(-50..1900),
                    rng.gen_range(-50..1060),
                    rng.gen_range(0..800),
                    rng.gen_range(0..600),
                )
            })
            .collect();
        let elements = build(&rows);
        let domain = [Domain::Chrome, Domain::Gimp, Domain::Os, Domain::Thunderbird, Domain::Generic][round % 5];

        let c = Compressor::default().compress_as(domain, &elements, &no_keywords());
        assert_total(&elements, &c);

        let modal: HashSet<ElementId> = c.modal.iter().copied().collect();
        let dynamic: HashSet<ElementId> = c.split.dynamic.iter().copied().collect();
        assert!(modal.is_subset(&dynamic));
        assert!(c.dropped.iter().all(|id| dynamic.contains(id) && !modal.contains(id)));
    }
}

#[test]
fn oversized_coordinates_never_panic() {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let raw = "push-button\tOK\t\t\t\t(2000000000, 10)\t(2000000000, 20)\t";
    let c = compress_from_raw(raw, None);
    assert_eq!(c.screen.width, 2_000_000);
    assert_eq!(c.screen.height, 30);

    let tags = ["push-button", "label", "menu", "dialog", "panel", "link", "tree-item", "paragraph"];
    let names = ["OK", "Close", "Accept all", "cookie", "Inbox", "Activities", ""];
    let mut rng = StdRng::seed_from_u64(11);

    for round in 0..40 {
        let rows: Vec<String> = (0..rng.gen_range(1..25))
            .map(|_| {
                let mut coord = || -> i64 {
                    match rng.gen_range(0..4) {
                        0 => rng.gen_range(i32::MIN as i64..=i32::MAX as i64),
                        1 => rng.gen_range(-99_999_999_999..=99_999_999_999),
                        _ => rng.gen_range(-50..2000),
                    }
                };
                let (x, y, w, h) = (coord(), coord(), coord(), coord());
                format!(
                    "{}\t{}\t\t\t\t({}, {})\t({}, {})\t",
                    tags[rng.gen_range(0..tags.len())],
                    names[rng.gen_range(0..names.len())],
                    x,
                    y,
                    w,
                    h
                )
            })
            .collect();
        let raw = dump(&rows);
        let domain = [Domain::Chrome, Domain::Gimp, Domain::Os, Domain::Thunderbird, Domain::Generic][round % 5];

        let mut compressor = Compressor::default();
        let elements = compressor.reconstruct(&raw);
        let c = compressor.compress_as(domain, &elements, &no_keywords());
        assert_total(&elements, &c);
        let _ = compress_from_raw(&raw, Some("accept the cookie banner"));
    }
}
