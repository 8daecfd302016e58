use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::tree::element_model::{is_known_tag, Element, ElementId};

static RE_COORD_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(\s*(-?\d+)\s*,\s*(-?\d+)\s*\)$").expect("valid coordinate cell pattern")
});
static RE_COORD_ANYWHERE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*-?\d+\s*,\s*-?\d+\s*\)").expect("valid coordinate pattern")
});

const HEADER_PREFIXES: &[&str] = &["LINEAR AT:", "PROPERTY:", "tag\tname\t"];

const MIN_COLUMNS: usize = 5;
const COL_POSITION: usize = 5;
const COL_SIZE: usize = 6;
const COL_STATES: usize = 7;

/// Rebuild element rows from a raw tab-delimited dump.
pub fn reconstruct(raw_text: &str) -> Vec<Element> {
    Reconstructor::default().run(raw_text)
}

/// Largest magnitude a parsed coordinate can have.
pub const COORD_LIMIT: i32 = 1_000_000;

/// Parse a `(int, int)` cell. Out-of-range values are clamped to
/// `COORD_LIMIT`; numbers too long for `i64` are rejected.
pub fn parse_coord(cell: &str) -> Option<(i32, i32)> {
    let caps = RE_COORD_CELL.captures(cell.trim())?;
    let a = clamp_coord(caps.get(1)?.as_str().parse().ok()?);
    let b = clamp_coord(caps.get(2)?.as_str().parse().ok()?);
    Some((a, b))
}

fn clamp_coord(value: i64) -> i32 {
    value.clamp(-(COORD_LIMIT as i64), COORD_LIMIT as i64) as i32
}

pub fn contains_coord(text: &str) -> bool {
    RE_COORD_ANYWHERE.is_match(text)
}

#[derive(Debug, Clone)]
pub struct Reconstructor {
    /// Treat `terminal` like `paragraph`: description is overflow body text.
    pub track_terminals: bool,
}

impl Default for Reconstructor {
    fn default() -> Self {
        Self {
            track_terminals: true,
        }
    }
}

impl Reconstructor {
    pub fn new(track_terminals: bool) -> Self {
        Self { track_terminals }
    }

    pub fn run(&self, raw_text: &str) -> Vec<Element> {
        let mut out: Vec<Element> = Vec::new();
        let mut pending: Option<String> = None;

        for raw_line in raw_text.lines() {
            // Trailing empty cells still count as columns, so trailing tabs stay.
            let line = raw_line.trim_start().trim_end_matches([' ', '\r']);
            if line.trim().is_empty() || is_header(line) {
                continue;
            }
            let first = first_column(line);
            if first.eq_ignore_ascii_case("tag") {
                continue;
            }

            if let Some(buffered) = pending.take() {
                let merged = format!("{}\t{}", buffered, line.trim());
                if is_well_formed(&merged) && contains_coord(&merged) {
                    trace!(merged = %merged, "merged pending paragraph row");
                    push(&mut out, element_from_columns(&merged, true));
                    continue;
                }
                push(&mut out, flushed_element(&buffered));
            }

            self.accept_line(line, &mut out, &mut pending);
        }

        if let Some(buffered) = pending.take() {
            push(&mut out, flushed_element(&buffered));
        }

        for el in out.iter_mut() {
            self.fold_description(el);
        }

        out
    }

    fn accept_line(&self, line: &str, out: &mut Vec<Element>, pending: &mut Option<String>) {
        let tag = first_column(line);

        if is_well_formed(line) {
            push(out, element_from_columns(line, true));
            return;
        }

        if is_known_tag(tag) {
            if tag.eq_ignore_ascii_case("paragraph") {
                *pending = Some(line.trim_end().to_string());
            } else {
                push(out, element_from_columns(line, true));
            }
            return;
        }

        match out.last_mut() {
            Some(owner) => append_continuation(owner, line),
            None => trace!(line = %line, "dropped continuation with no owner"),
        }
    }

    fn fold_description(&self, el: &mut Element) {
        let tag = el.tag.to_lowercase();
        let folds = tag == "paragraph" || (self.track_terminals && tag == "terminal");
        if !folds || el.description.is_empty() {
            return;
        }
        let desc = std::mem::take(&mut el.description);
        if el.text.is_empty() {
            el.text = desc;
        } else {
            el.text.push('\n');
            el.text.push_str(&desc);
        }
    }
}

fn is_header(line: &str) -> bool {
    HEADER_PREFIXES.iter().any(|p| line.starts_with(p))
}

fn first_column(line: &str) -> &str {
    line.split('\t').next().unwrap_or("").trim()
}

fn is_well_formed(line: &str) -> bool {
    let cols: Vec<&str> = line.split('\t').collect();
    cols.len() >= MIN_COLUMNS && is_known_tag(cols[0])
}

fn push(out: &mut Vec<Element>, mut el: Element) {
    if el.tag.is_empty() {
        return;
    }
    el.id = ElementId(out.len());
    out.push(el);
}

fn column(cols: &[&str], idx: usize) -> String {
    cols.get(idx).map(|c| c.trim().to_string()).unwrap_or_default()
}

fn element_from_columns(line: &str, with_metadata: bool) -> Element {
    let cols: Vec<&str> = line.split('\t').collect();
    let (position, size) = locate_geometry(&cols);

    let states = cols
        .get(COL_STATES)
        .map(|s| {
            s.split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Element {
        id: ElementId(0),
        tag: column(&cols, 0),
        name: column(&cols, 1),
        text: column(&cols, 2),
        description: if with_metadata { column(&cols, 3) } else { String::new() },
        role: if with_metadata { column(&cols, 4) } else { String::new() },
        states: if with_metadata { states } else { vec![] },
        position,
        size,
        raw: line.to_string(),
    }
}

/// A pending row that never completed: positional tag/name/text only.
fn flushed_element(pending: &str) -> Element {
    trace!(pending = %pending, "flushing pending row");
    element_from_columns(pending, false)
}

/// Position and size from their fixed columns, or else the first two
/// coordinate-shaped cells after the tag.
fn locate_geometry(cols: &[&str]) -> (Option<(i32, i32)>, Option<(i32, i32)>) {
    let fixed_pos = cols.get(COL_POSITION).and_then(|c| parse_coord(c));
    let fixed_size = cols.get(COL_SIZE).and_then(|c| parse_coord(c));
    if fixed_pos.is_some() {
        return (fixed_pos, fixed_size);
    }

    let mut found = cols.iter().skip(1).filter_map(|c| parse_coord(c));
    let position = found.next();
    let size = found.next();
    (position, size)
}

fn append_continuation(owner: &mut Element, line: &str) {
    let mut words = Vec::new();

    for cell in line.split('\t').map(str::trim).filter(|c| !c.is_empty()) {
        if let Some(coord) = parse_coord(cell) {
            owner.raw.push('\t');
            owner.raw.push_str(cell);
            if owner.position.is_none() {
                owner.position = Some(coord);
            } else if owner.size.is_none() {
                owner.size = Some(coord);
            }
        } else {
            words.push(cell);
        }
    }

    if words.is_empty() {
        return;
    }
    let joined = words.join(" ");

    let tag = owner.tag.to_lowercase();
    if tag == "paragraph" || tag == "terminal" {
        if !owner.text.is_empty() {
            owner.text.push('\n');
        }
        owner.text.push_str(&joined);
    } else {
        if !owner.name.is_empty() {
            owner.name.push(' ');
        }
        owner.name.push_str(&joined);
    }
}
