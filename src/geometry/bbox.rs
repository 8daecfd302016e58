use serde::Serialize;

use crate::tree::element_model::Element;

/// Fallback when the dump carries no usable geometry at all.
pub const DEFAULT_SCREEN: ScreenSize = ScreenSize {
    width: 1920,
    height: 1080,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

impl ScreenSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> i64 {
        (self.width.max(1) as i64) * (self.height.max(1) as i64)
    }

    /// `fraction` of the width, truncated to whole pixels.
    pub fn w_frac(&self, fraction: f64) -> i32 {
        (self.width as f64 * fraction) as i32
    }

    pub fn h_frac(&self, fraction: f64) -> i32 {
        (self.height as f64 * fraction) as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BBox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl BBox {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x.saturating_add(self.w / 2), self.y.saturating_add(self.h / 2))
    }

    pub fn area(&self) -> i64 {
        (self.w.max(0) as i64) * (self.h.max(0) as i64)
    }

    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        self.x <= px && px <= self.right() && self.y <= py && py <= self.bottom()
    }

    /// Grow on every side by `dx` / `dy`.
    pub fn expand(&self, dx: i32, dy: i32) -> BBox {
        BBox {
            x: self.x.saturating_sub(dx),
            y: self.y.saturating_sub(dy),
            w: self.w.saturating_add(dx.saturating_mul(2)),
            h: self.h.saturating_add(dy.saturating_mul(2)),
        }
    }

    pub fn merge(&self, other: &BBox) -> BBox {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = self.right().max(other.right());
        let max_y = self.bottom().max(other.bottom());
        BBox::new(min_x, min_y, max_x.saturating_sub(min_x), max_y.saturating_sub(min_y))
    }

    /// Overlapping, or within `tolerance` pixels of each other on both axes.
    pub fn is_close_to(&self, other: &BBox, tolerance: i32) -> bool {
        let x_overlap = self.x <= other.right().saturating_add(tolerance)
            && other.x <= self.right().saturating_add(tolerance);
        let y_overlap = self.y <= other.bottom().saturating_add(tolerance)
            && other.y <= self.bottom().saturating_add(tolerance);
        x_overlap && y_overlap
    }
}

/// Union of a set of boxes; `None` for an empty set.
pub fn union_all<I>(boxes: I) -> Option<BBox>
where
    I: IntoIterator<Item = BBox>,
{
    boxes.into_iter().reduce(|acc, b| acc.merge(&b))
}

/// Greedily merge boxes that lie within `tolerance` of each other until no
/// more merges apply.
pub fn merge_close_boxes(mut boxes: Vec<BBox>, tolerance: i32) -> Vec<BBox> {
    let mut merged = Vec::new();

    while !boxes.is_empty() {
        let mut current = boxes.remove(0);
        let mut changed = true;
        while changed {
            changed = false;
            let mut remaining = Vec::with_capacity(boxes.len());
            for other in boxes {
                if current.is_close_to(&other, tolerance) {
                    current = current.merge(&other);
                    changed = true;
                } else {
                    remaining.push(other);
                }
            }
            boxes = remaining;
        }
        merged.push(current);
    }

    merged
}

/// Max of `x + w` / `y + h` over all elements, defaulting each axis to
/// 1920x1080 when nothing positive is found.
pub fn estimate_screen_size(elements: &[Element]) -> ScreenSize {
    let mut max_x = 0;
    let mut max_y = 0;

    for el in elements {
        let b = el.bbox();
        max_x = max_x.max(b.right());
        max_y = max_y.max(b.bottom());
    }

    ScreenSize {
        width: if max_x > 0 { max_x } else { DEFAULT_SCREEN.width },
        height: if max_y > 0 { max_y } else { DEFAULT_SCREEN.height },
    }
}

/// Median of integer samples; an even count averages the middle pair.
pub fn median(values: &[i32]) -> Option<i32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some(((sorted[mid - 1] as i64 + sorted[mid] as i64) / 2) as i32)
    }
}

