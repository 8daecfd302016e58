use std::collections::{HashMap, HashSet};

use crate::{
    domain::domain_model::Domain,
    engine::{
        detectors::FloatingContainerDetector,
        engine_model::{FormatContext, RegionMap, StaticSplit, View},
        modal::ModalDetector,
        plugin::DomainPlugin,
        serialize::{content_line, dedup_rendered, resolve, sorted_lines, tag_priority, ContentLine},
    },
    geometry::bbox::ScreenSize,
    tree::element_model::{Element, ElementId},
};

pub const APP_LAUNCHER: &str = "APP_LAUNCHER";
pub const TOP_BAR: &str = "TOP_BAR";
pub const SPACES_BAR: &str = "SPACES_BAR";
pub const TOOLBAR: &str = "TOOLBAR";
pub const FOLDER_TREE: &str = "FOLDER_TREE";
pub const MESSAGE_LIST: &str = "MESSAGE_LIST";
pub const PREVIEW: &str = "PREVIEW";
pub const HOME_DASHBOARD: &str = "HOME_DASHBOARD";
pub const SETTINGS_SIDEBAR: &str = "SETTINGS_SIDEBAR";
pub const SETTINGS: &str = "SETTINGS";
pub const SETTINGS_BELOW: &str = "SETTINGS_BELOW";
pub const STATUSBAR: &str = "STATUSBAR";
pub const DIALOG: &str = "DIALOG";

const ALL_REGIONS: &[&str] = &[
    APP_LAUNCHER,
    TOP_BAR,
    SPACES_BAR,
    TOOLBAR,
    FOLDER_TREE,
    MESSAGE_LIST,
    PREVIEW,
    HOME_DASHBOARD,
    SETTINGS_SIDEBAR,
    SETTINGS,
    SETTINGS_BELOW,
    STATUSBAR,
    DIALOG,
];

const STATIC_REGIONS: &[&str] = &[APP_LAUNCHER, TOP_BAR, SPACES_BAR, STATUSBAR];

const DIALOG_KEYWORDS: &[&str] = &["save as", "print", "password", "alert", "confirm"];

const CONTROL_TAGS: &[&str] = &["push-button", "toggle-button", "link", "menu-item", "menu"];

const DASHBOARD_KEYWORDS: &[&str] = &[
    "read messages",
    "write a new message",
    "search messages",
    "manage message filters",
    "set up another account",
    "import from another program",
    "create a new calendar",
    "create a new address book",
    "connect to your existing email account",
    "connect to your chat account",
    "set up filelink",
    "connect to feeds",
    "connect to a newsgroup",
    "import data from other programs",
    "end-to-end encryption",
    "explore features",
    "make a donation",
    "support",
    "get involved",
    "developer documentation",
];

const DASHBOARD_EXACT: &[&str] = &["address book", "account settings", "settings"];

const HOME_SECTION_HEADERS: &[&str] = &[
    "Set Up Another Account",
    "Import from Another Program",
    "About Mozilla Thunderbird",
    "Resources",
];

const ACCOUNT_SETUP_SECTION: &str = "Set Up Another Account";

const ACCOUNT_SETUP_BUTTON_SHORT: &[(&str, &str)] = &[
    ("Connect to your existing email account", "Email"),
    ("Create a new address book", "Address Book"),
    ("Create a new calendar", "Calendar"),
    ("Connect to your chat account", "Chat"),
    ("Set up Filelink", "Filelink"),
    ("Connect to feeds", "Feeds"),
    ("Connect to a newsgroup", "Newsgroups"),
    ("Import data from other programs", "Import"),
];

/// Status bar labels recognised anywhere in the lower half.
const STATUS_LABELS: &[&str] = &["Done", "You are currently online.", "Home"];

const WINDOW_BUTTONS: &[&str] = &["Minimize", "Restore Down", "Close", "AppMenu"];

const SETTINGS_NAV: &[&str] = &["General", "Composition", "Privacy & Security", "Chat"];

// ============================================================================
// Layout
// ============================================================================

/// Column and band boundaries of the mail window, in pixels.
#[derive(Debug, Clone, Copy)]
struct Layout {
    width: f64,
    /// Visible height; the settings pane reports rows far below it.
    viewport: i32,
    launcher_max_x: f64,
    top_bar_max_y: f64,
    spaces_max_x: f64,
    sidebar_split_x: f64,
    list_split_x: f64,
    toolbar_max_y: f64,
    sidebar_header_max_y: f64,
    settings_split_x: f64,
}

impl Layout {
    fn new(elements: &[Element], screen: ScreenSize) -> Self {
        let w = screen.width as f64;
        let viewport = viewport_height(elements, screen);
        let h = viewport as f64;
        Self {
            width: w,
            viewport,
            launcher_max_x: w * 0.05,
            top_bar_max_y: h * 0.046,
            spaces_max_x: w * 0.06,
            sidebar_split_x: w * 0.21,
            list_split_x: w * 0.55,
            toolbar_max_y: h * 0.093,
            sidebar_header_max_y: h * 0.14,
            settings_split_x: w * 0.167,
        }
    }

    fn is_status_item(&self, el: &Element, cy: i32) -> bool {
        if STATUS_LABELS.contains(&el.label()) {
            return cy as f64 > self.viewport as f64 * 0.46;
        }
        cy as f64 > self.viewport as f64 * 0.98 && cy < self.viewport
    }
}

/// The left rail (launcher and spaces bar) is pinned to the visible window,
/// so its lowest edge is the viewport height.
fn viewport_height(elements: &[Element], screen: ScreenSize) -> i32 {
    let rail_max_x = screen.w_frac(0.06);
    elements
        .iter()
        .map(|el| el.bbox())
        .filter(|b| b.w > 0 && b.h > 0 && b.x < rail_max_x)
        .map(|b| b.bottom())
        .max()
        .filter(|&bottom| bottom > 0 && bottom <= screen.height)
        .unwrap_or(screen.height)
}

fn is_dialog_element(el: &Element) -> bool {
    let role = el.role_lower();
    if matches!(role.as_str(), "dialog" | "alert") {
        return true;
    }
    let tag = el.tag_lower();
    let label = el.label_lower();
    !CONTROL_TAGS.contains(&tag.as_str()) && DIALOG_KEYWORDS.iter().any(|k| label.contains(k))
}

fn is_dashboard_element(label_lower: &str) -> bool {
    DASHBOARD_KEYWORDS.iter().any(|k| label_lower.contains(k))
        || DASHBOARD_EXACT.contains(&label_lower)
}

// ============================================================================
// Plugin
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct ThunderbirdPlugin;

impl ThunderbirdPlugin {
    fn settings_region(layout: &Layout, x: i32, cy: i32) -> &'static str {
        if x as f64 <= layout.settings_split_x {
            SETTINGS_SIDEBAR
        } else if cy <= layout.viewport {
            SETTINGS
        } else {
            SETTINGS_BELOW
        }
    }
}

impl DomainPlugin for ThunderbirdPlugin {
    fn domain(&self) -> Domain {
        Domain::Thunderbird
    }

    fn split_static_dynamic(
        &self,
        _elements: &[Element],
        ids: &[ElementId],
        _screen: ScreenSize,
        regions: &RegionMap,
    ) -> StaticSplit {
        let static_set: HashSet<ElementId> = STATIC_REGIONS
            .iter()
            .flat_map(|r| regions.get(r).iter().copied())
            .collect();
        StaticSplit::partition(ids, &static_set)
    }

    fn classify_regions(
        &self,
        elements: &[Element],
        ids: &[ElementId],
        screen: ScreenSize,
        view: Option<View>,
        _dry_run: bool,
    ) -> RegionMap {
        let mut regions = RegionMap::new(ALL_REGIONS);
        let layout = Layout::new(elements, screen);
        let settings_view = matches!(view, Some(View::Settings | View::AccountSettings));

        for el in resolve(elements, ids) {
            let b = el.bbox();
            let (cx, cy) = b.center();
            let (cx_f, cy_f) = (cx as f64, cy as f64);
            let tag = el.tag_lower();
            let label = el.label_lower();

            let region = if is_dialog_element(el) {
                DIALOG
            } else if (b.x as f64) < layout.launcher_max_x
                && b.h > 32
                && (b.w as f64) < layout.width * 0.12
                && matches!(tag.as_str(), "push-button" | "toggle-button" | "launcher-app")
            {
                APP_LAUNCHER
            } else if cy_f < layout.top_bar_max_y {
                TOP_BAR
            } else if cx_f < layout.spaces_max_x && b.w < 60 {
                // before the status bar so "Settings" and "Hide Spaces" stay here
                SPACES_BAR
            } else if cx_f < layout.sidebar_split_x {
                if settings_view {
                    Self::settings_region(&layout, b.x, cy)
                } else {
                    FOLDER_TREE
                }
            } else if layout.is_status_item(el, cy) {
                STATUSBAR
            } else if cy_f < layout.toolbar_max_y {
                TOOLBAR
            } else if settings_view {
                Self::settings_region(&layout, b.x, cy)
            } else if is_dashboard_element(&label) {
                HOME_DASHBOARD
            } else {
                // dashboard prose follows the first dashboard entry
                let has_dashboard = !regions.get(HOME_DASHBOARD).is_empty();
                let prose = if cx_f < layout.list_split_x {
                    matches!(tag.as_str(), "heading" | "paragraph" | "label") && b.h > 20
                } else {
                    matches!(tag.as_str(), "heading" | "paragraph" | "label" | "link")
                };
                if has_dashboard && prose {
                    HOME_DASHBOARD
                } else if cx_f < layout.list_split_x {
                    MESSAGE_LIST
                } else {
                    PREVIEW
                }
            };

            regions.push(region, el.id);
        }

        regions
    }

    fn modal_detectors(&self) -> Vec<Box<dyn ModalDetector>> {
        vec![
            Box::new(FloatingContainerDetector::dialog()),
            Box::new(FloatingContainerDetector::popup_menu()),
        ]
    }

    fn region_order(&self, view: Option<View>) -> Vec<&'static str> {
        let mut order = vec![TOP_BAR, APP_LAUNCHER, TOOLBAR, SPACES_BAR];
        match view {
            Some(View::Home) => order.extend([FOLDER_TREE, HOME_DASHBOARD]),
            Some(View::Settings | View::AccountSettings) => {
                order.extend([SETTINGS_SIDEBAR, SETTINGS, SETTINGS_BELOW])
            }
            Some(View::Mail) | None => {
                order.extend([FOLDER_TREE, MESSAGE_LIST, PREVIEW, HOME_DASHBOARD])
            }
        }
        order.extend([STATUSBAR, DIALOG]);
        order
    }

    fn fallback_region(&self) -> &'static str {
        PREVIEW
    }

    fn detect_view(&self, elements: &[Element]) -> Option<View> {
        let labels: HashSet<String> = elements
            .iter()
            .map(|el| el.label_lower())
            .filter(|l| !l.is_empty())
            .collect();

        if labels.contains("set up another account") || labels.contains("import from another program")
        {
            return Some(View::Home);
        }

        let account_title = labels
            .iter()
            .any(|l| l == "account settings" || l.contains("account settings -"));
        if account_title && elements.iter().any(|el| el.label() == "Account Name:") {
            return Some(View::AccountSettings);
        }

        let settings = elements.iter().any(|el| {
            let tag = el.tag_lower();
            (tag == "section" && el.label() == "Settings")
                || (matches!(tag.as_str(), "list-item" | "label")
                    && SETTINGS_NAV.contains(&el.label()))
        });
        if settings {
            return Some(View::Settings);
        }

        if elements.is_empty() {
            None
        } else {
            Some(View::Mail)
        }
    }

    fn format_region(
        &self,
        name: &str,
        elements: &[Element],
        ids: &[ElementId],
        regions: &RegionMap,
        ctx: &FormatContext,
    ) -> Vec<String> {
        let layout = Layout::new(elements, ctx.screen);
        match name {
            APP_LAUNCHER | SPACES_BAR | MESSAGE_LIST => {
                render(dedup_rendered(sorted_by_y(elements, ids, regions, ctx)))
            }
            TOP_BAR | STATUSBAR => render(dedup_rendered(sorted_by_x(elements, ids, regions, ctx))),
            TOOLBAR => {
                let kept: Vec<ElementId> = resolve(elements, ids)
                    .into_iter()
                    .filter(|el| !WINDOW_BUTTONS.contains(&el.label()))
                    .map(|el| el.id)
                    .collect();
                render(dedup_rendered(sorted_by_x(elements, &kept, regions, ctx)))
            }
            PREVIEW => render(sorted_by_y(elements, ids, regions, ctx)),
            FOLDER_TREE => folder_tree_lines(elements, ids, regions, ctx, &layout),
            HOME_DASHBOARD => home_dashboard_lines(elements, ids, regions, ctx),
            SETTINGS_SIDEBAR => settings_sidebar_lines(elements, ids, regions, ctx),
            SETTINGS => {
                let kept: Vec<ElementId> = resolve(elements, ids)
                    .into_iter()
                    .filter(|el| el.tag_lower() != "document-web")
                    .map(|el| el.id)
                    .collect();
                render(dedup_rendered(sorted_lines(elements, &kept, regions, ctx)))
            }
            SETTINGS_BELOW => settings_below_lines(elements, ids, regions, ctx),
            _ => render(sorted_lines(elements, ids, regions, ctx)),
        }
    }
}

// ============================================================================
// Formatters
// ============================================================================

fn render(lines: Vec<ContentLine>) -> Vec<String> {
    lines.iter().map(ContentLine::render).collect()
}

/// Stable sort by row only, keeping input order within a row.
fn sorted_by_y(
    elements: &[Element],
    ids: &[ElementId],
    regions: &RegionMap,
    ctx: &FormatContext,
) -> Vec<ContentLine> {
    let mut lines: Vec<ContentLine> = resolve(elements, ids)
        .into_iter()
        .filter_map(|el| content_line(el, regions, ctx))
        .collect();
    lines.sort_by_key(|l| l.cy);
    lines
}

fn sorted_by_x(
    elements: &[Element],
    ids: &[ElementId],
    regions: &RegionMap,
    ctx: &FormatContext,
) -> Vec<ContentLine> {
    let mut lines: Vec<ContentLine> = resolve(elements, ids)
        .into_iter()
        .filter_map(|el| content_line(el, regions, ctx))
        .collect();
    lines.sort_by_key(|l| l.cx);
    lines
}

fn is_folder_root(label: &str) -> bool {
    label.contains('@') || label.eq_ignore_ascii_case("local folders")
}

/// Header buttons, then tree-items with each folder indented under its
/// account root.
fn folder_tree_lines(
    elements: &[Element],
    ids: &[ElementId],
    regions: &RegionMap,
    ctx: &FormatContext,
    layout: &Layout,
) -> Vec<String> {
    let mut header = Vec::new();
    let mut items: Vec<&Element> = Vec::new();
    for el in resolve(elements, ids) {
        if el.tag_lower() == "tree-item" {
            items.push(el);
        } else if (el.center().1 as f64) < layout.sidebar_header_max_y {
            header.push(el.id);
        }
    }

    let mut out = render(dedup_rendered(sorted_by_x(elements, &header, regions, ctx)));
    let mut seen: HashSet<String> = out.iter().cloned().collect();

    items.sort_by_key(|el| {
        let b = el.bbox();
        (b.y, b.x)
    });

    let mut under_root = false;
    for el in items {
        let Some(line) = content_line(el, regions, ctx) else {
            continue;
        };
        if el.label().is_empty() {
            continue;
        }
        let rendered = line.render();
        if is_folder_root(el.label()) {
            under_root = true;
            if seen.insert(rendered.clone()) {
                out.push(rendered);
            }
        } else if seen.insert(rendered.clone()) {
            out.push(if under_root { format!("  {}", rendered) } else { rendered });
        }
    }
    out
}

/// Dashboard grouped under its section headers; account setup buttons are
/// shortened to the service name.
fn home_dashboard_lines(
    elements: &[Element],
    ids: &[ElementId],
    regions: &RegionMap,
    ctx: &FormatContext,
) -> Vec<String> {
    let short: HashMap<&str, &str> = ACCOUNT_SETUP_BUTTON_SHORT.iter().copied().collect();

    let mut members: Vec<&Element> = resolve(elements, ids);
    members.sort_by_key(|el| el.bbox().y);

    // (header, members) in order of first appearance
    let mut sections: Vec<(Option<&Element>, Vec<&Element>)> = vec![(None, Vec::new())];
    for el in members {
        if HOME_SECTION_HEADERS.contains(&el.label()) {
            match sections.iter_mut().find(|(h, _)| h.is_some_and(|h| h.label() == el.label())) {
                Some((_, section)) => section.push(el),
                None => sections.push((Some(el), Vec::new())),
            }
        } else if let Some((_, section)) = sections.last_mut() {
            section.push(el);
        }
    }

    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for (header, mut section) in sections {
        section.sort_by_key(|el| {
            let b = el.bbox();
            (b.y, b.x)
        });
        let indent = if let Some(h) = header {
            if let Some(line) = content_line(h, regions, ctx) {
                let rendered = line.render();
                if seen.insert(rendered.clone()) {
                    out.push(rendered);
                }
            }
            "  "
        } else {
            ""
        };

        let account_setup = header.is_some_and(|h| h.label() == ACCOUNT_SETUP_SECTION);
        for el in section {
            let Some(mut line) = content_line(el, regions, ctx) else {
                continue;
            };
            if account_setup && line.tag == "push-button" {
                if let Some(name) = short.get(el.label()) {
                    line.label = (*name).to_string();
                }
            }
            let rendered = line.render();
            if seen.insert(rendered.clone()) {
                out.push(format!("{}{}", indent, rendered));
            }
        }
    }
    out
}

/// Navigation entries only, one per label, preferring links over list rows.
fn settings_sidebar_lines(
    elements: &[Element],
    ids: &[ElementId],
    regions: &RegionMap,
    ctx: &FormatContext,
) -> Vec<String> {
    let mut best: Vec<&Element> = Vec::new();
    for el in resolve(elements, ids) {
        if el.label().is_empty() {
            continue;
        }
        let tag = el.tag_lower();
        if !matches!(tag.as_str(), "link" | "list-item" | "tree-item") {
            continue;
        }
        match best.iter_mut().find(|b| b.label() == el.label()) {
            Some(slot) => {
                let better = tag_priority(&tag) < tag_priority(&slot.tag_lower())
                    || (tag_priority(&tag) == tag_priority(&slot.tag_lower())
                        && el.bbox().y < slot.bbox().y);
                if better {
                    *slot = el;
                }
            }
            None => best.push(el),
        }
    }
    best.sort_by_key(|el| el.bbox().y);

    let kept: Vec<ElementId> = best.iter().map(|el| el.id).collect();
    render(dedup_rendered(
        resolve(elements, &kept)
            .into_iter()
            .filter_map(|el| content_line(el, regions, ctx))
            .collect(),
    ))
}

/// Rows scrolled out of view keep only their headings and labels.
fn settings_below_lines(
    elements: &[Element],
    ids: &[ElementId],
    regions: &RegionMap,
    ctx: &FormatContext,
) -> Vec<String> {
    let kept: Vec<ElementId> = resolve(elements, ids)
        .into_iter()
        .filter(|el| matches!(el.tag_lower().as_str(), "heading" | "label" | "list-item"))
        .map(|el| el.id)
        .collect();
    render(dedup_rendered(sorted_lines(elements, &kept, regions, ctx)))
}
