use std::collections::HashSet;

use crate::{
    domain::domain_model::Domain,
    engine::{
        detectors::{AnchorBoxDetector, FloatingContainerDetector, VerticalBandDetector},
        engine_model::{FormatContext, RegionMap, StaticSplit, View},
        modal::ModalDetector,
        plugin::{DomainPlugin, CONTENT_REGION},
        serialize::{render_content, render_region, resolve},
    },
    geometry::bbox::{median, ScreenSize},
    tree::element_model::{Element, ElementId},
};

pub const WINDOW_CONTROLS: &str = "WINDOW_CONTROLS";
pub const BROWSER_TABS: &str = "BROWSER_TABS";
pub const BROWSER_UI: &str = "BROWSER_UI";

const TOOLBAR_ANCHOR_BUTTONS: &[&str] = &["reload", "you", "chrome", "bookmark this tab"];
const TOOLBAR_ANCHOR_ENTRIES: &[&str] = &["address and search bar"];
const TAB_ANCHORS: &[&str] = &["search tabs", "new tab", "close"];
const WINDOW_CONTROL_NAMES: &[&str] = &["minimise", "minimize", "restore", "maximize", "close"];

const BUTTON_TAGS: &[&str] = &["push-button", "button", "toggle-button"];
const ENTRY_TAGS: &[&str] = &["entry", "text box", "text"];

/// Used only when no toolbar anchor is on screen.
const TOOLBAR_KEYWORDS: &[&str] = &[
    "back",
    "forward",
    "reload",
    "refresh",
    "home",
    "address",
    "search",
    "location",
    "extensions",
    "menu",
    "settings",
    "customize",
];

const TITLEBAR_H: i32 = 60;
const TOOLBAR_HALF_HEIGHT: i32 = 25;
const URL_MAX_LEN: usize = 80;

#[derive(Debug, Clone, Copy, Default)]
pub struct ChromePlugin;

impl ChromePlugin {
    /// Vertical center of the browser toolbar: median of anchor centers, else
    /// of keyword-bearing controls in the top 30%, else 15% of the height.
    pub fn estimate_toolbar_y(&self, members: &[&Element], screen: ScreenSize) -> i32 {
        let anchor_ys: Vec<i32> = members
            .iter()
            .filter(|el| is_toolbar_anchor(el))
            .map(|el| el.center().1)
            .collect();
        if let Some(y) = median(&anchor_ys) {
            return y;
        }

        let limit = screen.h_frac(0.3);
        let keyword_ys: Vec<i32> = members
            .iter()
            .filter(|el| {
                matches!(el.tag_lower().as_str(), "push-button" | "entry" | "toggle-button")
            })
            .map(|el| (el, el.center().1))
            .filter(|(_, cy)| *cy <= limit)
            .filter(|(el, _)| {
                let label = el.label_lower();
                TOOLBAR_KEYWORDS.iter().any(|kw| label.contains(kw))
            })
            .map(|(_, cy)| cy)
            .collect();

        median(&keyword_ys).unwrap_or_else(|| screen.h_frac(0.15))
    }

    /// Left edge of the window-control cluster.
    fn window_controls_min_x(&self, members: &[&Element], screen: ScreenSize) -> i32 {
        let rightmost = members
            .iter()
            .filter(|el| {
                el.tag_lower() == "push-button"
                    && WINDOW_CONTROL_NAMES.contains(&el.name.trim().to_lowercase().as_str())
            })
            .map(|el| el.bbox())
            .filter(|b| b.y < TITLEBAR_H)
            .max_by_key(|b| b.x);

        match rightmost {
            Some(b) if b.x > screen.w_frac(0.8) => b.right() - 200,
            Some(_) => screen.width + 1,
            None => screen.w_frac(0.8),
        }
    }
}

fn is_toolbar_anchor(el: &Element) -> bool {
    let tag = el.tag_lower();
    let name = el.name.trim().to_lowercase();
    (BUTTON_TAGS.contains(&tag.as_str()) && TOOLBAR_ANCHOR_BUTTONS.contains(&name.as_str()))
        || (ENTRY_TAGS.contains(&tag.as_str()) && TOOLBAR_ANCHOR_ENTRIES.contains(&name.as_str()))
}

impl DomainPlugin for ChromePlugin {
    fn domain(&self) -> Domain {
        Domain::Chrome
    }

    fn split_static_dynamic(
        &self,
        elements: &[Element],
        ids: &[ElementId],
        screen: ScreenSize,
        regions: &RegionMap,
    ) -> StaticSplit {
        let mut static_set: HashSet<ElementId> = HashSet::new();
        for region in [WINDOW_CONTROLS, BROWSER_TABS, BROWSER_UI] {
            static_set.extend(regions.get(region).iter().copied());
        }

        let launcher_x_max = screen.w_frac(0.035);
        let status_y_min = screen.h_frac(0.90);

        for el in resolve(elements, ids) {
            let b = el.bbox();
            let name = el.name.trim();

            let dock_icon = b.x < launcher_x_max
                && (b.w as f64) < screen.width as f64 * 0.06
                && (b.h as f64) < screen.height as f64 * 0.12
                && name.chars().count() <= 12;

            let kind = if el.role.is_empty() {
                el.tag_lower()
            } else {
                el.role_lower()
            };
            let status_bar = b.y > status_y_min && (kind == "status-bar" || kind == "status");

            if dock_icon || status_bar {
                static_set.insert(el.id);
            }
        }

        StaticSplit::partition(ids, &static_set)
    }

    fn classify_regions(
        &self,
        elements: &[Element],
        ids: &[ElementId],
        screen: ScreenSize,
        _view: Option<View>,
        dry_run: bool,
    ) -> RegionMap {
        let mut regions =
            RegionMap::new(&[WINDOW_CONTROLS, BROWSER_TABS, BROWSER_UI, CONTENT_REGION]);
        let members = resolve(elements, ids);

        let toolbar_y = self.estimate_toolbar_y(&members, screen);
        let toolbar_tol = screen.h_frac(0.03);
        let tabstrip = (TITLEBAR_H * 7 / 10)..=(toolbar_y - TOOLBAR_HALF_HEIGHT);
        let win_min_x = self.window_controls_min_x(&members, screen);
        let has_anchors = members.iter().any(|el| is_toolbar_anchor(el));

        for el in members {
            let tag = el.tag_lower();
            let role = el.role_lower();
            let lower_name = el.name.trim().to_lowercase();
            let b = el.bbox();
            let (_, cy) = b.center();

            // window controls
            if (b.y as f64) < screen.height as f64 * 0.12
                && tag == "push-button"
                && WINDOW_CONTROL_NAMES.contains(&lower_name.as_str())
                && b.x >= win_min_x
            {
                if !dry_run {
                    regions.retag(el.id, "window-button");
                }
                regions.push(WINDOW_CONTROLS, el.id);
                continue;
            }

            // toolbar anchors
            if BUTTON_TAGS.contains(&tag.as_str())
                && TOOLBAR_ANCHOR_BUTTONS.contains(&lower_name.as_str())
            {
                if !dry_run {
                    regions.retag(el.id, "browser-button");
                }
                regions.push(BROWSER_UI, el.id);
                continue;
            }
            if ENTRY_TAGS.contains(&tag.as_str())
                && TOOLBAR_ANCHOR_ENTRIES.contains(&lower_name.as_str())
            {
                if !dry_run {
                    regions.retag(el.id, "browser-entry");
                }
                regions.push(BROWSER_UI, el.id);
                continue;
            }

            // toolbar row by position, only without anchors
            if !has_anchors {
                let diff_y = (cy - toolbar_y).abs();
                let mut in_toolbar = diff_y <= toolbar_tol;
                if lower_name.contains("ctrl+") {
                    in_toolbar = false;
                } else if (b.x as f64) > screen.width as f64 * 0.8
                    && (diff_y > 20 || (cy as f64) > screen.height as f64 * 0.12)
                {
                    in_toolbar = false;
                }
                if tag.contains("menu") || role.contains("menu") {
                    in_toolbar = false;
                }

                if in_toolbar
                    && matches!(
                        tag.as_str(),
                        "push-button" | "entry" | "combo-box" | "menu-item" | "toggle-button"
                    )
                {
                    if !dry_run {
                        let shown = match tag.as_str() {
                            "entry" => "browser-entry",
                            "combo-box" => "browser-combo",
                            _ => "browser-button",
                        };
                        regions.retag(el.id, shown);
                    }
                    regions.push(BROWSER_UI, el.id);
                    continue;
                }
            }

            // tab strip
            if TAB_ANCHORS.contains(&lower_name.as_str())
                && tabstrip.contains(&cy)
                && b.x < win_min_x
            {
                if !dry_run {
                    let shown = if role.contains("tab") || tag == "page-tab" {
                        "browser-tab"
                    } else {
                        "browser-tab-button"
                    };
                    regions.retag(el.id, shown);
                }
                regions.push(BROWSER_TABS, el.id);
                continue;
            }

            // page content
            if !dry_run {
                if tag == "static" && role == "heading" {
                    regions.retag(el.id, "heading");
                } else if tag == "list-item" && el.label_lower().contains("result") {
                    regions.retag(el.id, "static");
                }
            }
            regions.push(CONTENT_REGION, el.id);
        }

        regions
    }

    fn modal_detectors(&self) -> Vec<Box<dyn ModalDetector>> {
        vec![
            Box::new(AnchorBoxDetector::cookie_banner()),
            Box::new(FloatingContainerDetector::floating_menu()),
            Box::new(VerticalBandDetector::fullscreen_overlay()),
        ]
    }

    fn region_order(&self, _view: Option<View>) -> Vec<&'static str> {
        vec![WINDOW_CONTROLS, BROWSER_TABS, BROWSER_UI, CONTENT_REGION]
    }

    fn meta_header(&self, elements: &[Element], regions: &RegionMap) -> Vec<String> {
        let url = resolve(elements, regions.get(BROWSER_UI))
            .into_iter()
            .find(|el| {
                el.name.to_lowercase().contains("address")
                    && matches!(regions.tag_of(el), "entry" | "browser-entry")
            })
            .map(|el| el.text.trim())
            .filter(|text| !text.is_empty());

        match url {
            Some(raw) => vec![format!("URL: {}", format_url(raw))],
            None => vec![],
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
        if name != CONTENT_REGION {
            return render_region(elements, ids, regions, ctx);
        }

        let kept: Vec<ElementId> = resolve(elements, ids)
            .into_iter()
            .filter(|el| !skip_for_content(el, regions.tag_of(el)))
            .map(|el| el.id)
            .collect();
        render_content(elements, &kept, regions, ctx)
    }
}

/// Punctuation-only glyphs, advertising markers and long bare URLs that are
/// not links carry nothing an agent can use.
fn skip_for_content(el: &Element, shown_tag: &str) -> bool {
    let label = el.label();
    if label.is_empty() || label == "ADVERTISEMENT" {
        return true;
    }
    let mut chars = label.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if !c.is_alphanumeric() {
            return true;
        }
    }

    let lower = label.to_lowercase();
    lower.contains("http")
        && !label.contains(' ')
        && label.chars().count() > 30
        && !matches!(shown_tag, "link" | "push-button")
}

/// Short display form of an address bar value. Google searches become
/// `Google Search: "query"`; anything else is host plus path.
pub fn format_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let Some((_, rest)) = with_scheme.split_once("://") else {
        return raw.to_string();
    };
    let rest = rest.split('#').next().unwrap_or("");
    let (before_query, query) = match rest.split_once('?') {
        Some((a, q)) => (a, q),
        None => (rest, ""),
    };
    let (host, path) = match before_query.find('/') {
        Some(i) => before_query.split_at(i),
        None => (before_query, ""),
    };

    if host.contains("google") && path.starts_with("/search") {
        let q = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == "q")
            .map(|(_, v)| percent_decode(&v.replace('+', " ")));
        if let Some(q) = q.filter(|q| !q.is_empty()) {
            return format!("Google Search: \"{}\"", q);
        }
    }

    let short = format!("{}{}", host, path);
    if short.chars().count() < URL_MAX_LEN {
        short
    } else {
        let head: String = short.chars().take(URL_MAX_LEN - 3).collect();
        format!("{}...", head)
    }
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(v) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(v);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
