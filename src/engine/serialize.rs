use std::collections::{BTreeMap, HashSet};

use crate::{
    engine::engine_model::{FormatContext, RegionMap},
    instruction::keywords::{smart_truncate, truncate_label},
    tree::element_model::{Element, ElementId},
};

/// Rows closer than this share a line for overlap deduplication.
pub const OVERLAP_Y_TOL: i32 = 20;

/// Vertical gap that ends a heading's indented block.
pub const DEFAULT_SECTION_GAP: i32 = 150;

/// States worth surfacing to an agent, in display order.
const SURFACED_STATES: &[&str] = &["checked", "selected", "expanded", "pressed", "focused"];

/// Tags rendered even when they carry no label.
const KEEP_UNLABELLED: &[&str] = &[
    "entry",
    "password-text",
    "combo-box",
    "spin-button",
    "terminal",
    "check-box",
    "browser-entry",
];

/// Lower is more interaction-relevant.
pub fn tag_priority(tag: &str) -> u32 {
    match tag {
        "entry" | "combo-box" | "check-box" | "radio-button" | "toggle-button"
        | "spin-button" | "slider" => 0,
        "push-button" => 1,
        "menu-item" => 2,
        "link" => 3,
        "heading" => 4,
        "image" => 5,
        "label" => 6,
        "static" => 7,
        "section" | "paragraph" => 8,
        _ => 100,
    }
}

// ============================================================================
// Line model
// ============================================================================

/// One element ready to print, keyed by its center for ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    pub cy: i32,
    pub cx: i32,
    pub tag: String,
    pub label: String,
    pub suffix: String,
}

impl ContentLine {
    pub fn render(&self) -> String {
        format!(
            "[{}] \"{}\" @ ({}, {}){}",
            self.tag, self.label, self.cx, self.cy, self.suffix
        )
    }
}

pub fn state_suffix(el: &Element) -> String {
    let shown: Vec<&str> = SURFACED_STATES
        .iter()
        .copied()
        .filter(|s| el.has_state(s))
        .collect();
    if shown.is_empty() {
        String::new()
    } else {
        format!(" ({})", shown.join(", "))
    }
}

/// Label under the active truncation policy.
pub fn render_label(label: &str, ctx: &FormatContext) -> String {
    if ctx.keywords.is_empty() {
        truncate_label(label, ctx.label_max_len)
    } else {
        smart_truncate(label, &ctx.keywords, ctx.label_max_len, ctx.label_max_len / 2)
    }
}

pub fn content_line(el: &Element, regions: &RegionMap, ctx: &FormatContext) -> Option<ContentLine> {
    let tag = regions.tag_of(el).to_lowercase();
    let label = render_label(el.label(), ctx);
    if label.is_empty() && !KEEP_UNLABELLED.contains(&tag.as_str()) {
        return None;
    }
    let (cx, cy) = el.center();
    Some(ContentLine {
        cy,
        cx,
        tag,
        label,
        suffix: state_suffix(el),
    })
}

/// Resolve ids against `elements`, skipping any that fall outside it.
pub fn resolve<'a>(elements: &'a [Element], ids: &[ElementId]) -> Vec<&'a Element> {
    ids.iter().filter_map(|id| elements.get(id.0)).collect()
}

/// Lines for `ids`, sorted top-to-bottom then left-to-right.
pub fn sorted_lines(
    elements: &[Element],
    ids: &[ElementId],
    regions: &RegionMap,
    ctx: &FormatContext,
) -> Vec<ContentLine> {
    let mut lines: Vec<ContentLine> = resolve(elements, ids)
        .into_iter()
        .filter_map(|el| content_line(el, regions, ctx))
        .collect();
    lines.sort_by(|a, b| (a.cy, a.cx).cmp(&(b.cy, b.cx)));
    lines
}

/// Drop lines whose rendering already appeared.
pub fn dedup_rendered(lines: Vec<ContentLine>) -> Vec<ContentLine> {
    let mut seen = HashSet::new();
    lines
        .into_iter()
        .filter(|l| seen.insert(l.render()))
        .collect()
}

/// Default region formatter.
pub fn render_region(
    elements: &[Element],
    ids: &[ElementId],
    regions: &RegionMap,
    ctx: &FormatContext,
) -> Vec<String> {
    dedup_rendered(sorted_lines(elements, ids, regions, ctx))
        .iter()
        .map(ContentLine::render)
        .collect()
}

/// Content formatter: overlap dedup, fragment merging and heading indentation.
pub fn render_content(
    elements: &[Element],
    ids: &[ElementId],
    regions: &RegionMap,
    ctx: &FormatContext,
) -> Vec<String> {
    let kept = dedup_overlapping(elements, ids, regions);
    let lines = dedup_rendered(sorted_lines(elements, &kept, regions, ctx));
    let merged = merge_fragments(lines, ctx.screen.h_frac(0.03), ctx.screen.w_frac(0.15));
    hierarchical_lines(&merged, None)
}

// ============================================================================
// Overlap deduplication
// ============================================================================

/// Among elements sharing a label on the same row, keep only the most
/// interactive one. Order of the surviving ids follows `ids`.
pub fn dedup_overlapping(
    elements: &[Element],
    ids: &[ElementId],
    regions: &RegionMap,
) -> Vec<ElementId> {
    let mut groups: BTreeMap<String, Vec<(ElementId, i32, i32)>> = BTreeMap::new();
    for el in resolve(elements, ids) {
        let label = el.label_lower();
        if label.is_empty() {
            continue;
        }
        let (cx, cy) = el.center();
        groups.entry(label).or_default().push((el.id, cx, cy));
    }

    let mut drop = HashSet::new();
    for items in groups.values_mut() {
        if items.len() < 2 {
            continue;
        }
        items.sort_by_key(|&(_, cx, cy)| (cy, cx));

        let mut clusters: Vec<Vec<(ElementId, i32, i32)>> = Vec::new();
        for &item in items.iter() {
            match clusters.last_mut() {
                Some(cluster)
                    if cluster
                        .last()
                        .is_some_and(|&(_, _, prev_cy)| (item.2 - prev_cy).abs() <= OVERLAP_Y_TOL) =>
                {
                    cluster.push(item)
                }
                _ => clusters.push(vec![item]),
            }
        }

        for cluster in clusters.iter().filter(|c| c.len() > 1) {
            let best = cluster
                .iter()
                .filter_map(|&(id, _, _)| {
                    let el = elements.get(id.0)?;
                    Some((tag_priority(&regions.tag_of(el).to_lowercase()), id))
                })
                .min_by_key(|&(priority, _)| priority)
                .map(|(_, id)| id);
            for &(id, _, _) in cluster {
                if Some(id) != best {
                    drop.insert(id);
                }
            }
        }
    }

    ids.iter().copied().filter(|id| !drop.contains(id)).collect()
}

// ============================================================================
// Fragment merging
// ============================================================================

const BARE_LABEL_TAGS: &[&str] = &["label", "static", "text"];
const VALUE_TAGS: &[&str] = &[
    "entry",
    "combo-box",
    "spin-button",
    "text",
    "toggle-button",
    "static",
    "label",
];
const SHORT_VALUE_MAX: usize = 40;

/// A bare label directly followed (below or to the right, within tolerance)
/// by a short value or an input becomes one `label: value` line at the
/// label's position with the value's tag.
pub fn merge_fragments(lines: Vec<ContentLine>, y_tol: i32, x_tol: i32) -> Vec<ContentLine> {
    let mut out = Vec::with_capacity(lines.len());
    let mut iter = lines.into_iter().peekable();

    while let Some(cur) = iter.next() {
        let mergeable = iter.peek().is_some_and(|next| {
            let dy = next.cy - cur.cy;
            BARE_LABEL_TAGS.contains(&cur.tag.as_str())
                && VALUE_TAGS.contains(&next.tag.as_str())
                && !cur.label.is_empty()
                && !next.label.is_empty()
                && next.label.chars().count() <= SHORT_VALUE_MAX
                && (0..=y_tol).contains(&dy)
                && (next.cx - cur.cx).abs() <= x_tol
                && (next.cx, next.cy) != (cur.cx, cur.cy)
        });

        if !mergeable {
            out.push(cur);
            continue;
        }

        if let Some(next) = iter.next() {
            let head = cur.label.trim_end_matches([':', ',', ' ']).trim();
            out.push(ContentLine {
                cy: cur.cy,
                cx: cur.cx,
                tag: next.tag,
                label: format!("{}: {}", head, next.label),
                suffix: next.suffix,
            });
        }
    }

    out
}

// ============================================================================
// Hierarchy
// ============================================================================

/// Indent lines under the most recent heading until a vertical gap larger
/// than `section_gap` (default [`DEFAULT_SECTION_GAP`]).
pub fn hierarchical_lines(lines: &[ContentLine], section_gap: Option<i32>) -> Vec<String> {
    let gap = section_gap.unwrap_or(DEFAULT_SECTION_GAP);
    let mut out = Vec::with_capacity(lines.len());
    let mut in_section = false;
    let mut prev_cy: Option<i32> = None;

    for line in lines {
        if prev_cy.is_some_and(|p| line.cy - p > gap) {
            in_section = false;
        }
        prev_cy = Some(line.cy);

        if line.tag == "heading" {
            in_section = true;
            out.push(line.render());
        } else if in_section {
            out.push(format!("  {}", line.render()));
        } else {
            out.push(line.render());
        }
    }

    out
}
