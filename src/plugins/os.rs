use std::collections::HashSet;

use crate::{
    domain::domain_model::Domain,
    engine::{
        detectors::DimmedLayerDetector,
        engine_model::{FormatContext, RegionMap, StaticSplit, View},
        modal::ModalDetector,
        plugin::{DomainPlugin, CONTENT_REGION},
        serialize::{render_label, resolve},
    },
    geometry::bbox::{merge_close_boxes, union_all, BBox, ScreenSize},
    tree::element_model::{Element, ElementId},
};

pub const APP_LAUNCHER: &str = "APP_LAUNCHER";
pub const TOP_BAR: &str = "TOP_BAR";
pub const DESKTOP_ICONS: &str = "DESKTOP_ICONS";
pub const OS_POPUP: &str = "OS_POPUP";
pub const DIALOG: &str = "DIALOG";

const STATIC_REGIONS: &[&str] = &[APP_LAUNCHER, TOP_BAR, DESKTOP_ICONS];

const MODAL_KEYWORDS: &[&str] = &["authentication", "password", "required", "authenticate", "cancel"];

const SIDEBAR_SPECIFIC: &[&str] = &["Recent", "Starred", "Other Locations"];
const SIDEBAR_GENERIC: &[&str] = &[
    "Home",
    "Desktop",
    "Documents",
    "Downloads",
    "Music",
    "Pictures",
    "Videos",
    "Trash",
    "Network",
    "Bluetooth",
    "Background",
    "Appearance",
    "Notifications",
    "Search",
    "Multitasking",
    "Applications",
    "Privacy",
    "Online Accounts",
    "Sharing",
    "Sound",
    "Power",
    "Displays",
    "Mouse & Touchpad",
    "Keyboard",
    "Printers",
    "Removable Media",
    "Color",
    "Region & Language",
    "Accessibility",
    "Users",
    "Date & Time",
    "About",
];

const BREADCRUMB_SEPARATORS: &[&str] = &["/", ">", "›", "»"];
const SOFTWARE_TABS: &[&str] = &["Explore", "Installed", "Updates"];

const WINDOW_WIDGET_TAGS: &[&str] = &[
    "check-box",
    "combo-box",
    "spin-button",
    "entry",
    "terminal",
    "slider",
    "switch",
    "scroll-bar",
    "menu-bar",
    "table",
    "tree-table",
    "radio-button",
    "text",
];
const WINDOW_BUTTON_NAMES: &[&str] = &["Close", "Minimize", "Maximize", "Help", "Cancel", "Apply", "OK"];

/// Anchor boxes closer than this belong to the same window.
const WINDOW_MERGE_TOLERANCE: i32 = 250;

#[derive(Debug, Clone, Copy, Default)]
pub struct OsPlugin;

// ============================================================================
// Layout discovery
// ============================================================================

/// Column of Files / Settings sidebar entries, padded.
pub fn detect_sidebar(members: &[&Element]) -> Option<BBox> {
    let mut candidates: Vec<&Element> = members
        .iter()
        .copied()
        .filter(|el| {
            let label = el.label();
            SIDEBAR_SPECIFIC.contains(&label) || SIDEBAR_GENERIC.contains(&label)
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by_key(|el| el.bbox().x);

    let mut best: Vec<&Element> = Vec::new();
    let mut current: Vec<&Element> = Vec::new();
    for el in candidates {
        let aligned = current
            .first()
            .is_some_and(|first| (el.bbox().x - first.bbox().x).abs() < 30);
        if current.is_empty() || aligned {
            current.push(el);
        } else {
            if current.len() > best.len() {
                best = std::mem::take(&mut current);
            }
            current = vec![el];
        }
    }
    if current.len() > best.len() {
        best = current;
    }

    let has_specific = best.iter().any(|el| SIDEBAR_SPECIFIC.contains(&el.label()));
    if !((has_specific && best.len() >= 2) || best.len() >= 4) {
        return None;
    }

    let u = union_all(best.iter().map(|el| el.bbox()))?;
    Some(BBox::new(u.x - 60, u.y - 20, u.w + 80, u.h + 40))
}

/// Row around the first path separator (`Home / project`).
pub fn detect_breadcrumb(members: &[&Element]) -> Option<BBox> {
    let sep = members
        .iter()
        .find(|el| BREADCRUMB_SEPARATORS.contains(&el.name.trim()))?;
    let ref_cy = sep.center().1;

    let row = members
        .iter()
        .filter(|el| (el.center().1 - ref_cy).abs() < 20)
        .map(|el| el.bbox());
    let u = union_all(row)?;
    Some(BBox::new(u.x - 20, u.y - 10, u.w + 40, u.h + 20))
}

/// Areas holding window-only widgets, key/value label pairs or form labels.
pub fn detect_window_areas(members: &[&Element]) -> Vec<BBox> {
    let mut anchors: Vec<BBox> = Vec::new();

    let mut labels: Vec<&Element> = members
        .iter()
        .copied()
        .filter(|el| el.tag_lower() == "label")
        .collect();
    labels.sort_by_key(|el| el.bbox().y);

    let mut paired: HashSet<ElementId> = HashSet::new();
    for (i, l1) in labels.iter().enumerate() {
        if paired.contains(&l1.id) {
            continue;
        }
        let b1 = l1.bbox();
        for l2 in &labels[i + 1..] {
            if paired.contains(&l2.id) {
                continue;
            }
            let b2 = l2.bbox();
            if (b2.center().1 - b1.center().1).abs() > 10 {
                if b2.y > b1.bottom() {
                    break;
                }
                continue;
            }
            let dist_x = b2.x - b1.right();
            if 0 < dist_x && dist_x < 300 {
                anchors.push(b1);
                anchors.push(b2);
                paired.insert(l1.id);
                paired.insert(l2.id);
                break;
            }
        }
    }

    for el in members {
        if paired.contains(&el.id) {
            continue;
        }
        let tag = el.tag_lower();
        let label = el.label();
        let is_anchor = WINDOW_WIDGET_TAGS.contains(&tag.as_str())
            || (matches!(tag.as_str(), "push-button" | "toggle-button")
                && WINDOW_BUTTON_NAMES.contains(&label))
            || matches!(tag.as_str(), "window" | "frame" | "dialog")
            || (tag == "label" && label.ends_with(':'));
        if is_anchor {
            anchors.push(el.bbox());
        }
    }

    merge_close_boxes(anchors, WINDOW_MERGE_TOLERANCE)
}

/// Everything below the Ubuntu Software tab row is content.
fn software_center_area(members: &[&Element], screen: ScreenSize) -> Option<BBox> {
    let tabs: Vec<BBox> = members
        .iter()
        .filter(|el| el.tag_lower() == "radio-button" && SOFTWARE_TABS.contains(&el.name.trim()))
        .map(|el| el.bbox())
        .collect();
    if tabs.len() < 2 {
        return None;
    }
    let min_x = tabs.iter().map(|b| b.x).min()? - 500;
    let max_x = tabs.iter().map(|b| b.x).max()? + 400;
    let min_y = tabs.iter().map(|b| b.y).min()? - 50;
    Some(BBox::new(min_x, min_y, max_x - min_x, screen.height - min_y))
}

fn is_content_shaped(label: &str, tag: &str) -> bool {
    let lower = label.to_lowercase();
    lower.contains("minimize")
        || lower.contains("maximize")
        || lower.contains("close")
        || lower.starts_with("user@")
        || lower.starts_with("root@")
        || lower.starts_with('~')
        || lower.ends_with('$')
        || lower.ends_with('#')
        || (lower.contains('@') && lower.contains(':'))
        || lower.contains("/home/")
        || lower.contains("terminal")
        || tag == "menu"
        || label == "/"
        || lower.contains("software updates")
}

impl DomainPlugin for OsPlugin {
    fn domain(&self) -> Domain {
        Domain::Os
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
        _view: Option<View>,
        _dry_run: bool,
    ) -> RegionMap {
        let mut regions = RegionMap::new(&[
            APP_LAUNCHER,
            TOP_BAR,
            DESKTOP_ICONS,
            OS_POPUP,
            DIALOG,
            CONTENT_REGION,
        ]);
        let members = resolve(elements, ids);

        let sidebar = detect_sidebar(&members);
        let breadcrumb = detect_breadcrumb(&members);
        let windows = detect_window_areas(&members);
        let software = software_center_area(&members, screen);

        let w = screen.width as f64;
        let h = screen.height as f64;

        for el in &members {
            let b = el.bbox();
            let (cx, cy) = b.center();
            let tag = el.tag_lower();
            let role = el.role_lower();
            let label = el.label();
            let lower = label.to_lowercase();

            if (b.x as f64) < w * 0.05
                && b.h > 32
                && (b.w as f64) < w * 0.12
                && matches!(tag.as_str(), "push-button" | "toggle-button" | "launcher-app")
                && !label.is_empty()
            {
                regions.push(APP_LAUNCHER, el.id);
                continue;
            }

            if (cy as f64) < h * 0.03
                && matches!(
                    tag.as_str(),
                    "label" | "push-button" | "toggle-button" | "menu" | "image" | "icon" | "text"
                )
            {
                regions.push(TOP_BAR, el.id);
                continue;
            }

            if matches!(role.as_str(), "dialog" | "alert")
                || MODAL_KEYWORDS.iter().any(|kw| lower.contains(kw))
            {
                regions.push(DIALOG, el.id);
                continue;
            }

            let forced = sidebar.is_some_and(|s| s.contains_point(cx, cy))
                || breadcrumb.is_some_and(|s| s.contains_point(cx, cy))
                || windows.iter().any(|wb| wb.expand(10, 10).contains_point(cx, cy))
                || software
                    .is_some_and(|s| s.x <= cx && cx <= s.right() && cy >= s.y);
            if forced {
                regions.push(CONTENT_REGION, el.id);
                continue;
            }

            if (b.w as f64) < w * 0.35
                && (b.h as f64) < h * 0.25
                && (matches!(tag.as_str(), "entry" | "text" | "textbox")
                    || lower.contains("rename")
                    || lower.contains("folder name"))
            {
                regions.push(OS_POPUP, el.id);
                continue;
            }

            if matches!(tag.as_str(), "label" | "icon" | "image" | "push-button")
                && !label.is_empty()
            {
                if is_content_shaped(label, &tag) {
                    regions.push(CONTENT_REGION, el.id);
                } else {
                    regions.push(DESKTOP_ICONS, el.id);
                }
                continue;
            }

            regions.push(CONTENT_REGION, el.id);
        }

        regions
    }

    fn modal_detectors(&self) -> Vec<Box<dyn ModalDetector>> {
        vec![Box::new(DimmedLayerDetector::authentication_prompt())]
    }

    fn region_order(&self, _view: Option<View>) -> Vec<&'static str> {
        vec![
            APP_LAUNCHER,
            TOP_BAR,
            DESKTOP_ICONS,
            OS_POPUP,
            CONTENT_REGION,
            DIALOG,
        ]
    }

    fn format_region(
        &self,
        name: &str,
        elements: &[Element],
        ids: &[ElementId],
        _regions: &RegionMap,
        ctx: &FormatContext,
    ) -> Vec<String> {
        let members = resolve(elements, ids);
        match name {
            APP_LAUNCHER => launcher_lines(&members, ctx),
            TOP_BAR => top_bar_lines(&members, ctx),
            DESKTOP_ICONS => desktop_icon_lines(&members, ctx),
            OS_POPUP => popup_lines(&members, ctx),
            CONTENT_REGION => group_windows(&members, ctx),
            // DIALOG, MODAL
            _ => node_list_lines(&members, ctx),
        }
    }
}

// ============================================================================
// Region formatters
// ============================================================================

fn line(prefix: &str, label: &str, el: &Element) -> String {
    let (cx, cy) = el.center();
    format!("{} \"{}\" @ ({}, {})", prefix, label, cx, cy)
}

fn by_y<'a>(members: &[&'a Element]) -> Vec<&'a Element> {
    let mut sorted = members.to_vec();
    sorted.sort_by_key(|el| {
        let (cx, cy) = el.center();
        (cy, cx)
    });
    sorted
}

/// Dock entries top to bottom, one per app name.
fn launcher_lines(members: &[&Element], ctx: &FormatContext) -> Vec<String> {
    let mut seen = HashSet::new();
    by_y(members)
        .into_iter()
        .filter(|el| !el.label().is_empty() && seen.insert(el.label().to_string()))
        .map(|el| line("[launcher-app]", &render_label(el.label(), ctx), el))
        .collect()
}

fn top_bar_kind(label: &str) -> &'static str {
    let lower = label.to_lowercase();
    if lower.contains("activities") {
        "[top-activities]"
    } else if ["am", "pm", ":"].iter().any(|k| lower.contains(k))
        && label.chars().any(|c| c.is_ascii_digit())
    {
        "[top-clock]"
    } else if ["wifi", "wireless", "network"].iter().any(|k| lower.contains(k)) {
        "[top-network]"
    } else if lower.contains("battery") {
        "[top-battery]"
    } else if ["sound", "volume", "speaker"].iter().any(|k| lower.contains(k)) {
        "[top-sound]"
    } else {
        "[top-item]"
    }
}

/// Top bar left to right, tagged by what each item looks like.
fn top_bar_lines(members: &[&Element], ctx: &FormatContext) -> Vec<String> {
    let mut sorted = members.to_vec();
    sorted.sort_by_key(|el| el.center().0);

    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .filter(|el| !el.label().is_empty())
        .filter_map(|el| {
            let kind = top_bar_kind(el.label());
            seen.insert(format!("{}:{}", kind, el.label()))
                .then(|| line(kind, &render_label(el.label(), ctx), el))
        })
        .collect()
}

fn desktop_icon_lines(members: &[&Element], ctx: &FormatContext) -> Vec<String> {
    let mut seen = HashSet::new();
    by_y(members)
        .into_iter()
        .filter(|el| !el.label().is_empty() && seen.insert(el.label().to_string()))
        .map(|el| line("[desktop-icon]", &render_label(el.label(), ctx), el))
        .collect()
}

fn popup_lines(members: &[&Element], ctx: &FormatContext) -> Vec<String> {
    members
        .iter()
        .filter(|el| !el.label().is_empty())
        .map(|el| {
            let prefix = match el.tag_lower().as_str() {
                "entry" | "textbox" | "text" => "[os-popup-entry]",
                "push-button" | "toggle-button" => "[os-popup-btn]",
                _ => "[os-popup-item]",
            };
            line(prefix, &render_label(el.label(), ctx), el)
        })
        .collect()
}

fn widget_prefix(tag: &str) -> &'static str {
    match tag {
        "push-button" | "toggle-button" => "[btn]",
        "check-box" | "radio-button" => "[check]",
        "entry" | "text" | "password-text" => "[input]",
        "combo-box" | "menu-button" => "[combo]",
        "spin-button" | "slider" | "scroll-bar" => "[control]",
        _ => "[text]",
    }
}

/// Window members top to bottom with widget-kind prefixes. Terminals are
/// always listed, summarised by their text.
pub fn node_list_lines(members: &[&Element], ctx: &FormatContext) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for el in by_y(members) {
        let tag = el.tag_lower();
        let label = el.label();
        if label.is_empty() && tag != "terminal" {
            continue;
        }
        let (cx, cy) = el.center();
        if !seen.insert(format!("{}|{}|{}", label, cx, cy)) {
            continue;
        }

        if tag == "terminal" {
            let summary = [el.text.trim(), el.name.trim()]
                .into_iter()
                .find(|s| !s.is_empty())
                .unwrap_or("(terminal)");
            out.push(line("[terminal]", &render_label(summary, ctx), el));
        } else {
            out.push(line(widget_prefix(&tag), &render_label(label, ctx), el));
        }
    }

    out
}

// ============================================================================
// Window grouping
// ============================================================================

#[derive(Debug, Clone)]
struct DesktopWindow {
    title: String,
    min_x: i32,
    max_x: i32,
    header_y: i32,
    header_bottom: i32,
    members: Vec<ElementId>,
}

/// Group content into windows anchored on title-bar Close buttons, the
/// software center tab row and bare terminals. Leftovers go under a
/// background heading.
fn group_windows(members: &[&Element], ctx: &FormatContext) -> Vec<String> {
    let sidebar = detect_sidebar(members);
    let mut used: HashSet<ElementId> = HashSet::new();
    let mut windows: Vec<DesktopWindow> = Vec::new();

    let close_buttons: Vec<&Element> = members
        .iter()
        .copied()
        .filter(|el| {
            matches!(el.tag_lower().as_str(), "push-button" | "toggle-button")
                && el.name.trim() == "Close"
        })
        .collect();

    for close in close_buttons {
        if used.contains(&close.id) {
            continue;
        }
        let c = close.bbox();
        let c_cy = c.center().1;

        let title = members
            .iter()
            .filter(|el| el.id != close.id && !used.contains(&el.id))
            .filter(|el| el.tag_lower() == "label" && !el.label().is_empty())
            .filter(|el| {
                let b = el.bbox();
                (b.center().1 - c_cy).abs() <= 20 && b.x < c.x
            })
            .min_by_key(|el| c.x - el.bbox().right())
            .copied();

        let mut header: Vec<&Element> = vec![close];
        header.extend(title);
        for el in members {
            if used.contains(&el.id) || header.iter().any(|h| h.id == el.id) {
                continue;
            }
            let b = el.bbox();
            if (b.center().1 - c_cy).abs() <= 15
                && b.x < c.right()
                && b.x > c.x - 600
                && matches!(
                    el.tag_lower().as_str(),
                    "push-button" | "toggle-button" | "label" | "icon"
                )
            {
                header.push(el);
            }
        }

        let mut min_x = header.iter().map(|el| el.bbox().x).min().unwrap_or(c.x);
        if let Some(sb) = sidebar {
            if (c.y - sb.y).abs() < 100 && min_x > sb.x {
                min_x = sb.x;
            }
        }

        let mut ids: Vec<ElementId> = header.iter().map(|el| el.id).collect();
        for el in members {
            if el.tag_lower() != "terminal" || used.contains(&el.id) || ids.contains(&el.id) {
                continue;
            }
            let t = el.bbox();
            if t.y >= c.y && t.y < c.y + 200 && t.x < c.right() && t.right() > min_x {
                ids.push(el.id);
            }
        }
        used.extend(ids.iter().copied());

        windows.push(DesktopWindow {
            title: title
                .map(|t| t.name.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Unknown Window".to_string()),
            min_x: min_x - 30,
            max_x: c.right(),
            header_y: c.y,
            header_bottom: c.bottom(),
            members: ids,
        });
    }

    let mut tabs: Vec<&Element> = members
        .iter()
        .copied()
        .filter(|el| {
            !used.contains(&el.id)
                && el.tag_lower() == "radio-button"
                && SOFTWARE_TABS.contains(&el.name.trim())
        })
        .collect();
    if tabs.len() >= 2 {
        tabs.sort_by_key(|el| el.bbox().x);
        let first = tabs[0].bbox();
        let last = tabs[tabs.len() - 1].bbox();
        let ids: Vec<ElementId> = tabs.iter().map(|el| el.id).collect();
        used.extend(ids.iter().copied());
        windows.push(DesktopWindow {
            title: "Ubuntu Software".to_string(),
            min_x: first.x - 50,
            max_x: last.right() + 100,
            header_y: first.y,
            header_bottom: first.bottom(),
            members: ids,
        });
    }

    for el in members {
        if el.tag_lower() != "terminal" || used.contains(&el.id) {
            continue;
        }
        let t = el.bbox();
        used.insert(el.id);
        windows.push(DesktopWindow {
            title: "Terminal".to_string(),
            min_x: t.x,
            max_x: t.right(),
            header_y: t.y - 40,
            header_bottom: t.y,
            members: vec![el.id],
        });
    }

    let mut orphans: Vec<&Element> = Vec::new();
    for el in members {
        if used.contains(&el.id) {
            continue;
        }
        let (cx, cy) = el.center();

        let best = windows
            .iter_mut()
            .filter(|w| cx <= w.max_x + 50 && cx >= w.min_x - 50 && cy - w.header_bottom >= -10)
            .map(|w| {
                let penalty = if cx < w.min_x {
                    w.min_x - cx
                } else if cx > w.max_x {
                    cx - w.max_x
                } else {
                    0
                };
                let score = (cy - w.header_bottom) as i64 + penalty as i64 * 5;
                (score, w)
            })
            .min_by_key(|(score, _)| *score);

        match best {
            Some((_, w)) => w.members.push(el.id),
            None => orphans.push(el),
        }
    }

    windows.sort_by_key(|w| (w.header_y, w.min_x));

    let mut out = Vec::new();
    for w in &windows {
        let grouped: Vec<&Element> = members
            .iter()
            .copied()
            .filter(|el| w.members.contains(&el.id))
            .collect();
        let body = node_list_lines(&grouped, ctx);
        if body.is_empty() {
            continue;
        }
        out.push(format!("=== Window: {} ===", w.title));
        out.extend(body);
    }

    if !orphans.is_empty() {
        let body = node_list_lines(&orphans, ctx);
        if !body.is_empty() {
            if !windows.is_empty() {
                out.push("=== Background / Other ===".to_string());
            }
            out.extend(body);
        }
    }

    out
}
