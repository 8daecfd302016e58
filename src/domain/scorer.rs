use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    domain::domain_model::{Domain, DomainScores, DOMAIN_PRIORITY},
    trace::{
        logger::TraceLogger,
        trace::{TraceEvent, TraceStage},
    },
    tree::element_model::Element,
};

const CHROME_TOP_BUTTONS: &[&str] = &[
    "search tabs",
    "new tab",
    "bookmark this tab",
    "side panel",
    "you",
    "new chrome available",
    "google apps",
];

const CHROME_BOOKMARK_DIALOG: &[&str] = &["bookmark name", "folder", "done"];

const FILES_SIDEBAR_LABELS: &[&str] = &[
    "recent",
    "starred",
    "home",
    "desktop",
    "documents",
    "downloads",
    "music",
    "pictures",
    "videos",
    "trash",
    "other locations",
];

const THUNDERBIRD_SPACES: &[&str] = &["mail", "address book", "calendar", "tasks", "chat"];

/// Launcher names that may appear in the desktop dock.
pub const OS_DOCK_APP_NAMES: &[&str] = &[
    "google chrome",
    "thunderbird mail",
    "visual studio code",
    "vlc media player",
    "libreoffice writer",
    "libreoffice calc",
    "libreoffice impress",
    "gnu image manipulation program",
    "files",
    "ubuntu software",
    "help",
    "terminal",
    "trash",
    "show applications",
];

/// Any of these anywhere on screen rules out the dock-only desktop fallback.
const OTHER_DOMAIN_KEYWORDS: &[&str] = &[
    "google chrome",
    "mozilla firefox",
    "mozilla thunderbird",
    "libreoffice calc",
    "libreoffice writer",
    "libreoffice impress",
    "gnu image manipulation program",
    "gimp",
    "visual studio code",
    "vlc media player",
];

const OS_FALLBACK_SCORE: u32 = 5;

/// Running total for one domain that reports every increment to the trace.
struct Tally<'a> {
    domain: Domain,
    total: i64,
    trace: &'a TraceLogger,
}

impl<'a> Tally<'a> {
    fn new(domain: Domain, trace: &'a TraceLogger) -> Self {
        Self {
            domain,
            total: 0,
            trace,
        }
    }

    fn add(&mut self, delta: i64, reason: &str, el: Option<&Element>) {
        self.total += delta;
        if self.trace.is_enabled() {
            let mut event = TraceEvent::now(TraceStage::Score)
                .with_domain(self.domain)
                .with_score(delta, self.total)
                .with_reason(reason);
            if let Some(el) = el {
                event = event.with_element(el);
            }
            self.trace.log(event);
        }
    }

    fn zero(&mut self, reason: &str) {
        let delta = -self.total;
        self.add(delta, reason, None);
    }

    fn finish(self) -> u32 {
        self.total.max(0) as u32
    }
}

struct Fields {
    tag: String,
    name: String,
    text: String,
}

fn fields(el: &Element) -> Fields {
    Fields {
        tag: el.tag.to_lowercase(),
        name: el.name.trim().to_lowercase(),
        text: el.text.trim().to_lowercase(),
    }
}

/// Score every known domain and pick the best one.
pub fn score_domains(elements: &[Element]) -> DomainScores {
    score_domains_traced(elements, &TraceLogger::disabled())
}

pub fn score_domains_traced(elements: &[Element], trace: &TraceLogger) -> DomainScores {
    let mut scores = BTreeMap::new();
    for &domain in DOMAIN_PRIORITY {
        scores.insert(domain, score_domain(domain, elements, trace));
    }

    if scores.values().all(|&s| s == 0) && is_dock_only_desktop(elements) {
        let mut tally = Tally::new(Domain::Os, trace);
        tally.add(
            OS_FALLBACK_SCORE as i64,
            "fallback: dock-only desktop",
            None,
        );
        scores.insert(Domain::Os, tally.finish());
    }

    let mut best = Domain::Generic;
    let mut best_score = 0;
    for &domain in DOMAIN_PRIORITY {
        let s = scores.get(&domain).copied().unwrap_or(0);
        if s > best_score {
            best = domain;
            best_score = s;
        }
    }

    if trace.is_enabled() {
        for (domain, score) in &scores {
            trace.log(
                TraceEvent::now(TraceStage::ScoreSummary)
                    .with_domain(*domain)
                    .with_total(*score as i64),
            );
        }
    }
    debug!(domain = %best, score = best_score, "domain detected");

    DomainScores { best, scores }
}

/// Direct landmark score for one domain. The desktop dock fallback is applied
/// by [`score_domains`] only, since it depends on every other score.
pub fn score_domain(domain: Domain, elements: &[Element], trace: &TraceLogger) -> u32 {
    match domain {
        Domain::Chrome => score_chrome(elements, trace),
        Domain::Gimp => score_gimp(elements, trace),
        Domain::Vsc => score_vsc(elements, trace),
        Domain::LibreofficeCalc => score_libreoffice_calc(elements, trace),
        Domain::LibreofficeImpress => score_libreoffice_impress(elements, trace),
        Domain::LibreofficeWriter => score_libreoffice_writer(elements, trace),
        Domain::Thunderbird => score_thunderbird(elements, trace),
        Domain::Os => score_os(elements, trace),
        Domain::Generic => 0,
    }
}

fn score_chrome(elements: &[Element], trace: &TraceLogger) -> u32 {
    let mut tally = Tally::new(Domain::Chrome, trace);

    for el in elements {
        let f = fields(el);

        if f.name.contains("google chrome") {
            tally.add(15, "window title 'Google Chrome'", Some(el));
        }
        if f.tag == "entry" && f.name.contains("address and search bar") {
            tally.add(20, "address bar", Some(el));
        }
        if f.tag == "push-button" && CHROME_TOP_BUTTONS.contains(&f.name.as_str()) {
            tally.add(6, "toolbar button", Some(el));
        }
        if (f.tag == "entry" || f.tag == "push-button")
            && CHROME_BOOKMARK_DIALOG.contains(&f.name.as_str())
        {
            tally.add(4, "bookmark dialog control", Some(el));
        }
        if f.tag == "link" && (f.name == "gmail" || f.name == "search for images") {
            tally.add(3, "homepage link", Some(el));
        }
        if f.tag == "link" {
            tally.add(1, "link", Some(el));
        }
    }

    tally.finish()
}

fn score_gimp(elements: &[Element], trace: &TraceLogger) -> u32 {
    let mut tally = Tally::new(Domain::Gimp, trace);

    let (mut has_file, mut has_edit) = (false, false);
    let (mut has_image, mut has_layer, mut has_colors) = (false, false, false);

    for el in elements {
        let f = fields(el);
        let (x, y) = el.position.unwrap_or((0, 0));

        if f.name.contains("gnu image manipulation program")
            || f.text.contains("gnu image manipulation program")
        {
            tally.add(20, "window title 'GNU Image Manipulation Program'", Some(el));
        }

        if f.tag == "menu" && (40..=90).contains(&y) {
            match f.name.as_str() {
                "file" => {
                    has_file = true;
                    tally.add(2, "menu 'File' in top menubar", Some(el));
                }
                "edit" => {
                    has_edit = true;
                    tally.add(2, "menu 'Edit' in top menubar", Some(el));
                }
                "image" => {
                    has_image = true;
                    tally.add(8, "menu 'Image' in top menubar", Some(el));
                }
                "layer" => {
                    has_layer = true;
                    tally.add(8, "menu 'Layer' in top menubar", Some(el));
                }
                "colors" => {
                    has_colors = true;
                    tally.add(8, "menu 'Colors' in top menubar", Some(el));
                }
                "filters" => tally.add(5, "menu 'Filters' in top menubar", Some(el)),
                _ => {}
            }
        }

        if x > 1650 {
            tally.add(1, "right-side dock element", Some(el));
        }
    }

    if !(has_image && has_layer && has_colors) {
        tally.zero("no Image/Layer/Colors triad");
        return 0;
    }

    tally.add(5, "bonus: Image+Layer+Colors menus", None);
    if has_file && has_edit {
        tally.add(3, "bonus: File+Edit menus", None);
    }

    tally.finish()
}

fn score_vsc(elements: &[Element], trace: &TraceLogger) -> u32 {
    let mut tally = Tally::new(Domain::Vsc, trace);

    for el in elements {
        let f = fields(el);
        if f.name.contains("visual studio code") || f.text.contains("visual studio code") {
            tally.add(20, "title 'Visual Studio Code'", Some(el));
        }
    }

    tally.finish()
}

fn score_libreoffice_calc(elements: &[Element], trace: &TraceLogger) -> u32 {
    let mut tally = Tally::new(Domain::LibreofficeCalc, trace);
    let mut has_sheet_menu = false;
    let mut table_cells = 0usize;

    for el in elements {
        let f = fields(el);
        let y = el.position.map(|(_, y)| y);

        if f.tag == "menu" && y.is_some_and(|y| (40..=120).contains(&y)) {
            if f.name == "sheet" {
                has_sheet_menu = true;
                tally.add(8, "menubar contains 'Sheet'", Some(el));
            }
            if f.name == "data" {
                tally.add(6, "menubar contains 'Data'", Some(el));
            }
        }

        if f.tag == "table-cell" {
            table_cells += 1;
            if table_cells <= 300 {
                tally.add(1, "table-cell", Some(el));
            }
        }
    }

    if table_cells > 50 {
        tally.add(10, "more than 50 table cells", None);
    }
    if table_cells > 200 {
        tally.add(10, "more than 200 table cells", None);
    }
    if has_sheet_menu && table_cells > 20 {
        tally.add(10, "sheet menu with many cells", None);
    }

    tally.finish()
}

fn score_libreoffice_impress(elements: &[Element], trace: &TraceLogger) -> u32 {
    let mut tally = Tally::new(Domain::LibreofficeImpress, trace);
    let (mut has_slide, mut has_slideshow) = (false, false);

    for el in elements {
        let f = fields(el);

        if f.name.contains("libreoffice impress") || f.name.contains("libreoffice presentation") {
            tally.add(20, "window title", Some(el));
        }
        if f.tag == "menu" {
            if f.name == "slide" {
                has_slide = true;
                tally.add(5, "menu 'Slide'", Some(el));
            } else if f.name == "slide show" {
                has_slideshow = true;
                tally.add(5, "menu 'Slide Show'", Some(el));
            }
        }
        if f.tag == "document-presentation" {
            tally.add(15, "presentation document", Some(el));
        }
    }

    if has_slide && has_slideshow {
        tally.add(5, "bonus: Slide+Slide Show menus", None);
    }

    tally.finish()
}

fn score_libreoffice_writer(elements: &[Element], trace: &TraceLogger) -> u32 {
    let mut tally = Tally::new(Domain::LibreofficeWriter, trace);
    let (mut has_styles, mut has_table) = (false, false);

    for el in elements {
        let f = fields(el);

        if f.name.contains("libreoffice writer") {
            tally.add(20, "window title", Some(el));
        }
        if f.tag == "menu" {
            if f.name == "styles" {
                has_styles = true;
                tally.add(5, "menu 'Styles'", Some(el));
            } else if f.name == "table" {
                has_table = true;
                tally.add(3, "menu 'Table'", Some(el));
            }
        }
        if f.tag == "document-text" {
            tally.add(15, "text document body", Some(el));
        }
    }

    if has_styles && has_table {
        tally.add(5, "bonus: Styles+Table menus", None);
    }

    tally.finish()
}

fn score_thunderbird(elements: &[Element], trace: &TraceLogger) -> u32 {
    let mut tally = Tally::new(Domain::Thunderbird, trace);

    for el in elements {
        let f = fields(el);

        if f.name.contains("mozilla thunderbird") || f.text.contains("mozilla thunderbird") {
            tally.add(20, "window title 'Mozilla Thunderbird'", Some(el));
        }
        if f.tag == "tree-item" && (f.name.contains('@') || f.name == "local folders") {
            tally.add(5, "account root in folder tree", Some(el));
        }
        if (f.tag == "push-button" || f.tag == "toggle-button")
            && THUNDERBIRD_SPACES.contains(&f.name.as_str())
        {
            tally.add(2, "spaces toolbar button", Some(el));
        }
    }

    tally.finish()
}

fn score_os(elements: &[Element], trace: &TraceLogger) -> u32 {
    let mut tally = Tally::new(Domain::Os, trace);
    let mut files_sidebar_hits = 0;

    for el in elements {
        let f = fields(el);

        if f.tag == "terminal" {
            tally.add(30, "terminal widget", Some(el));
        }
        if f.tag == "menu" && f.name == "terminal" {
            tally.add(15, "menu 'Terminal'", Some(el));
        }
        if f.name.contains("user@user-virtual-machine")
            || f.text.contains("user@user-virtual-machine")
        {
            tally.add(10, "shell prompt", Some(el));
        }
        if f.tag == "menu" && f.name == "files" {
            tally.add(15, "menu 'Files'", Some(el));
        }
        if f.tag == "label" && FILES_SIDEBAR_LABELS.contains(&f.name.as_str()) {
            files_sidebar_hits += 1;
        }
        if f.tag == "menu" && f.name == "ubuntu software" {
            tally.add(25, "menu 'Ubuntu Software'", Some(el));
        }
        if f.text.contains("ubuntu software") {
            tally.add(10, "text 'Ubuntu Software'", Some(el));
        }
    }

    if files_sidebar_hits >= 3 {
        tally.add(10, "files sidebar labels", None);
    }

    tally.finish()
}

/// Left-edge dock of launcher-shaped buttons and nothing hinting at another
/// application.
pub fn is_dock_only_desktop(elements: &[Element]) -> bool {
    if !has_os_dock(elements) {
        return false;
    }

    let blob = elements
        .iter()
        .map(|el| format!("{} {}", el.name, el.text))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    !OTHER_DOMAIN_KEYWORDS.iter().any(|kw| blob.contains(kw))
}

/// At least four dock-shaped buttons on the left edge bearing OS app names.
pub fn has_os_dock(elements: &[Element]) -> bool {
    let dock_like = elements
        .iter()
        .filter(|el| {
            let tag = el.tag.to_lowercase();
            if tag != "push-button" && tag != "toggle-button" {
                return false;
            }
            let (Some((x, _)), Some((w, h))) = (el.position, el.size) else {
                return false;
            };
            x <= 5
                && (40..=90).contains(&h)
                && (50..=90).contains(&w)
                && OS_DOCK_APP_NAMES.contains(&el.name.trim().to_lowercase().as_str())
        })
        .count();

    dock_like >= 4
}
