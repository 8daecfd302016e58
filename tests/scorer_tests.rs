use a11y_compressor::{
    domain::{
        domain_model::{Domain, DOMAIN_PRIORITY},
        scorer::{has_os_dock, is_dock_only_desktop, score_domain, score_domains, score_domains_traced},
    },
    trace::{logger::TraceLogger, trace::TraceStage},
};

mod common;

use common::{build, row};

fn gimp_menus(names: &[&str]) -> Vec<String> {
    names
        .iter()
        .enumerate()
        .map(|(i, n)| row("menu", n, 80 + 60 * i as i32, 50, 50, 20))
        .collect()
}

fn dock() -> Vec<String> {
    ["Files", "Terminal", "Help", "Show Applications"]
        .iter()
        .enumerate()
        .map(|(i, n)| row("push-button", n, 0, 80 + 70 * i as i32, 70, 60))
        .collect()
}

// =========================================================================
// Gating and thresholds
// =========================================================================

#[test]
fn gimp_requires_image_layer_colors() {
    let partial = build(&gimp_menus(&["File", "Edit", "Image", "Layer", "Filters"]));
    let scores = score_domains(&partial);
    assert_eq!(scores.score(Domain::Gimp), 0, "Missing Colors zeroes the score");

    let full = build(&gimp_menus(&["File", "Edit", "Image", "Layer", "Colors"]));
    let scores = score_domains(&full);
    // 2 + 2 + 8 + 8 + 8 + triad 5 + File/Edit 3
    assert_eq!(scores.score(Domain::Gimp), 36);
    assert_eq!(scores.best, Domain::Gimp);
}

#[test]
fn gimp_title_alone_does_not_detect() {
    let elements = build(&[row("label", "GNU Image Manipulation Program", 0, 0, 400, 30)]);
    assert_eq!(score_domain(Domain::Gimp, &elements, &TraceLogger::disabled()), 0);
}

#[test]
fn gimp_menus_outside_menubar_band_do_not_count() {
    let rows: Vec<String> = ["Image", "Layer", "Colors"]
        .iter()
        .map(|n| row("menu", n, 100, 400, 50, 20))
        .collect();
    assert_eq!(score_domains(&build(&rows)).score(Domain::Gimp), 0);
}

#[test]
fn chrome_address_bar_and_links() {
    let elements = build(&[
        row("entry", "Address and search bar", 200, 80, 900, 30),
        row("push-button", "New Tab", 300, 10, 30, 30),
        row("link", "Gmail", 1500, 200, 40, 20),
    ]);
    let scores = score_domains(&elements);
    // 20 + 6 + (3 + 1)
    assert_eq!(scores.score(Domain::Chrome), 30);
    assert_eq!(scores.best, Domain::Chrome);
}

#[test]
fn calc_cell_bonuses() {
    let mut rows = vec![row("menu", "Sheet", 300, 60, 50, 20)];
    for i in 0..60 {
        rows.push(row("table-cell", "", 100 + i, 300, 80, 20));
    }
    let scores = score_domains(&build(&rows));
    // 8 + 60 cells + >50 bonus 10 + sheet bonus 10
    assert_eq!(scores.score(Domain::LibreofficeCalc), 88);
    assert_eq!(scores.best, Domain::LibreofficeCalc);
}

// =========================================================================
// Selection
// =========================================================================

#[test]
fn empty_input_is_generic() {
    let scores = score_domains(&[]);
    assert_eq!(scores.best, Domain::Generic);
    assert!(DOMAIN_PRIORITY.iter().all(|d| scores.score(*d) == 0));
}

#[test]
fn ties_go_to_the_earlier_domain() {
    // vsc and thunderbird both score 20
    let elements = build(&[
        row("label", "Visual Studio Code", 0, 0, 300, 20),
        row("label", "Mozilla Thunderbird", 0, 30, 300, 20),
    ]);
    let scores = score_domains(&elements);
    assert_eq!(scores.score(Domain::Vsc), 20);
    assert_eq!(scores.score(Domain::Thunderbird), 20);
    assert_eq!(scores.best, Domain::Vsc);
}

#[test]
fn priority_order_is_fixed() {
    assert_eq!(
        DOMAIN_PRIORITY,
        &[
            Domain::Gimp,
            Domain::Chrome,
            Domain::Vsc,
            Domain::LibreofficeCalc,
            Domain::LibreofficeImpress,
            Domain::LibreofficeWriter,
            Domain::Thunderbird,
            Domain::Os,
        ]
    );
}

#[test]
fn domain_names_parse_with_aliases() {
    assert_eq!("calc".parse::<Domain>(), Ok(Domain::LibreofficeCalc));
    assert_eq!(" Thunderbird ".parse::<Domain>(), Ok(Domain::Thunderbird));
    assert_eq!("vscode".parse::<Domain>(), Ok(Domain::Vsc));
    assert!("photoshop".parse::<Domain>().is_err());
    assert_eq!(Domain::LibreofficeImpress.to_string(), "libreoffice_impress");
}

// =========================================================================
// Desktop fallback
// =========================================================================

#[test]
fn dock_only_desktop_falls_back_to_os() {
    let elements = build(&dock());
    assert!(has_os_dock(&elements));
    assert!(is_dock_only_desktop(&elements));

    let scores = score_domains(&elements);
    assert_eq!(scores.score(Domain::Os), 5);
    assert_eq!(scores.best, Domain::Os);
}

#[test]
fn dock_with_other_application_is_not_os_fallback() {
    let mut rows = dock();
    rows.push(row("label", "GIMP is updating", 600, 400, 200, 20));
    let elements = build(&rows);

    assert!(has_os_dock(&elements));
    assert!(!is_dock_only_desktop(&elements));
    assert_eq!(score_domains(&elements).best, Domain::Generic);
}

#[test]
fn three_dock_buttons_are_not_a_dock() {
    let rows: Vec<String> = dock().into_iter().take(3).collect();
    assert!(!has_os_dock(&build(&rows)));
}

#[test]
fn terminal_scores_os() {
    let elements = build(&[row("terminal", "Terminal", 0, 100, 800, 400)]);
    assert_eq!(score_domains(&elements).best, Domain::Os);
}

// =========================================================================
// Trace
// =========================================================================

#[test]
fn score_deltas_are_traced() {
    let trace = TraceLogger::in_memory();
    let elements = build(&gimp_menus(&["Image", "Layer"]));
    score_domains_traced(&elements, &trace);

    let events = trace.events();
    let gimp: Vec<_> = events
        .iter()
        .filter(|e| e.stage == TraceStage::Score && e.domain.as_deref() == Some("gimp"))
        .collect();
    assert_eq!(gimp.len(), 3, "Two menu hits and the gate reset");
    assert_eq!(gimp.last().and_then(|e| e.total), Some(0));

    assert!(events.iter().any(|e| e.stage == TraceStage::ScoreSummary));
}

#[test]
fn disabled_trace_records_nothing() {
    let trace = TraceLogger::disabled();
    score_domains_traced(&build(&dock()), &trace);
    assert!(trace.events().is_empty());
}
