#![allow(dead_code)]

use a11y_compressor::tree::{element_model::Element, reconstruct::reconstruct};

pub const HEADER: &str = "tag\tname\ttext\tdescription\trole\tposition\tsize\tstates";

/// A well-formed dump row with empty text, description, role and states.
pub fn row(tag: &str, name: &str, x: i32, y: i32, w: i32, h: i32) -> String {
    format!("{}\t{}\t\t\t\t({}, {})\t({}, {})", tag, name, x, y, w, h)
}

/// A well-formed row with every column set.
pub fn full_row(
    tag: &str,
    name: &str,
    text: &str,
    role: &str,
    states: &str,
    geometry: (i32, i32, i32, i32),
) -> String {
    let (x, y, w, h) = geometry;
    format!(
        "{}\t{}\t{}\t\t{}\t({}, {})\t({}, {})\t{}",
        tag, name, text, role, x, y, w, h, states
    )
}

pub fn dump(rows: &[String]) -> String {
    let mut out = String::from(HEADER);
    for r in rows {
        out.push('\n');
        out.push_str(r);
    }
    out
}

pub fn build(rows: &[String]) -> Vec<Element> {
    reconstruct(&dump(rows))
}

/// A 1920x1080 frame: one full-screen panel fixes the screen estimate.
pub fn frame() -> String {
    row("panel", "", 0, 0, 1920, 1080)
}

/// Lines of a section body, up to the next `NAME:` header.
pub fn section<'a>(lines: &'a [String], name: &str) -> Vec<&'a str> {
    let header = format!("{}:", name);
    let mut out = Vec::new();
    let mut inside = false;
    for line in lines {
        if inside && is_header(line) {
            break;
        }
        if inside {
            out.push(line.as_str());
        }
        if *line == header {
            inside = true;
        }
    }
    out
}

fn is_header(line: &str) -> bool {
    line.strip_suffix(':').is_some_and(|n| {
        !n.is_empty()
            && n
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
    })
}
