use std::collections::HashSet;

use crate::{
    engine::{engine_model::ModalSplit, modal::ModalDetector, serialize::resolve},
    geometry::bbox::ScreenSize,
    tree::element_model::{Element, ElementId},
};

fn split_by<F>(elements: &[Element], background: &[ElementId], mut is_modal: F) -> ModalSplit
where
    F: FnMut(&Element) -> bool,
{
    let mut split = ModalSplit::default();
    for &id in background {
        match elements.get(id.0) {
            Some(el) if is_modal(el) => split.modal.push(id),
            _ => split.background.push(id),
        }
    }
    split
}

// ============================================================================
// Anchor + bounding box (consent banners)
// ============================================================================

/// Finds anchor controls in the footer band, unions the centers of every
/// related element there, and claims related elements and dismiss buttons
/// inside that box.
#[derive(Debug, Clone)]
pub struct AnchorBoxDetector {
    /// Exact (case-sensitive) anchor labels
    pub anchor_labels: Vec<&'static str>,
    /// Lower-case substrings that mark an element as related
    pub keywords: Vec<&'static str>,
    pub anchor_tags: Vec<&'static str>,
    /// Footer band starts at this fraction of screen height
    pub footer_start: f64,
    pub margin_x_frac: f64,
    pub margin_y: i32,
    /// Push-buttons with this label inside the box are claimed too
    pub dismiss_label: &'static str,
}

impl AnchorBoxDetector {
    pub fn cookie_banner() -> Self {
        Self {
            anchor_labels: vec![
                "Accept Cookies",
                "Reject Non-Essential Cookies",
                "Cookies Settings",
                "Cookie Settings",
                "Accept all",
                "Reject all",
            ],
            keywords: vec!["cookie", "cookies", "privacy", "クッキー", "プライバシー"],
            anchor_tags: vec!["push-button", "link"],
            footer_start: 0.65,
            margin_x_frac: 0.08,
            margin_y: 40,
            dismiss_label: "close",
        }
    }
}

impl ModalDetector for AnchorBoxDetector {
    fn name(&self) -> &'static str {
        "anchor_box"
    }

    fn detect(
        &self,
        elements: &[Element],
        background: &[ElementId],
        screen: ScreenSize,
    ) -> ModalSplit {
        let footer_y = screen.h_frac(self.footer_start);

        let mut has_anchor = false;
        let mut related: HashSet<ElementId> = HashSet::new();
        let mut centers = Vec::new();

        for el in resolve(elements, background) {
            let (cx, cy) = el.center();
            if cy < footer_y {
                continue;
            }

            let tag = el.tag_lower();
            let label = el.label();
            let lower = label.to_lowercase();
            let anchor_tag = self.anchor_tags.contains(&tag.as_str());

            let exact_anchor = anchor_tag && self.anchor_labels.contains(&label);
            let keyword_hit = self.keywords.iter().any(|kw| lower.contains(kw));

            if exact_anchor || (keyword_hit && anchor_tag) {
                has_anchor = true;
            }
            if exact_anchor || keyword_hit {
                related.insert(el.id);
                centers.push((cx, cy));
            }
        }

        if !has_anchor || related.is_empty() {
            return ModalSplit::unchanged(background);
        }

        let min_cx = centers.iter().map(|c| c.0).min().unwrap_or(0);
        let max_cx = centers.iter().map(|c| c.0).max().unwrap_or(0);
        let min_cy = centers.iter().map(|c| c.1).min().unwrap_or(0);
        let max_cy = centers.iter().map(|c| c.1).max().unwrap_or(0);

        let margin_x = screen.w_frac(self.margin_x_frac);
        let (left, right) = (min_cx - margin_x, max_cx + margin_x);
        let (top, bottom) = (min_cy - self.margin_y, max_cy + self.margin_y);

        split_by(elements, background, |el| {
            let (cx, cy) = el.center();
            let in_box = left <= cx && cx <= right && top <= cy && cy <= bottom;
            let dismiss =
                el.tag_lower() == "push-button" && el.label_lower() == self.dismiss_label;
            in_box && (related.contains(&el.id) || dismiss)
        })
    }
}

// ============================================================================
// Two-anchor vertical band (full-screen overlays)
// ============================================================================

/// A dismiss control near the top and a confirm control near the bottom
/// bracket a full-screen overlay; everything between them is modal.
#[derive(Debug, Clone)]
pub struct VerticalBandDetector {
    pub top_anchors: Vec<&'static str>,
    pub bottom_anchors: Vec<&'static str>,
    pub anchor_tag: &'static str,
    pub top_band: (f64, f64),
    /// Top anchors must also sit below this fraction
    pub top_floor: f64,
    pub bottom_start: f64,
    pub pad: i32,
    pub min_span: f64,
    /// Controls in this leftmost fraction never anchor
    pub left_exclusion: f64,
}

impl VerticalBandDetector {
    pub fn fullscreen_overlay() -> Self {
        Self {
            top_anchors: vec!["close dialog", "close"],
            bottom_anchors: vec!["confirm my choices", "accept all", "save preferences"],
            anchor_tag: "push-button",
            top_band: (0.08, 0.55),
            top_floor: 0.10,
            bottom_start: 0.50,
            pad: 40,
            min_span: 0.40,
            left_exclusion: 0.05,
        }
    }
}

impl ModalDetector for VerticalBandDetector {
    fn name(&self) -> &'static str {
        "vertical_band"
    }

    fn detect(
        &self,
        elements: &[Element],
        background: &[ElementId],
        screen: ScreenSize,
    ) -> ModalSplit {
        let top_min = screen.h_frac(self.top_band.0);
        let top_max = screen.h_frac(self.top_band.1);
        let top_floor = screen.h_frac(self.top_floor);
        let bottom_min = screen.h_frac(self.bottom_start);
        let left_limit = screen.w_frac(self.left_exclusion);

        let mut tops = Vec::new();
        let mut bottoms = Vec::new();

        for el in resolve(elements, background) {
            if el.tag_lower() != self.anchor_tag {
                continue;
            }
            let label = el.label_lower();
            if label.is_empty() {
                continue;
            }
            let (cx, cy) = el.center();
            if cx < left_limit {
                continue;
            }

            if (top_min..=top_max).contains(&cy)
                && cy > top_floor
                && self.top_anchors.iter().any(|a| label.contains(a))
            {
                tops.push(cy);
            }
            if cy >= bottom_min && self.bottom_anchors.iter().any(|a| label.contains(a)) {
                bottoms.push(cy);
            }
        }

        let (Some(top), Some(bottom)) = (tops.iter().min(), bottoms.iter().max()) else {
            return ModalSplit::unchanged(background);
        };

        let top_y = top - self.pad;
        let bottom_y = bottom + self.pad;
        if ((bottom_y - top_y) as f64) < screen.height as f64 * self.min_span {
            return ModalSplit::unchanged(background);
        }

        split_by(elements, background, |el| {
            let (_, cy) = el.center();
            top_y <= cy && cy <= bottom_y
        })
    }
}

// ============================================================================
// Largest floating container (menus)
// ============================================================================

/// Picks the largest container of a target role right of a width fraction,
/// stretches it over aligned items and claims everything whose center lies
/// inside.
#[derive(Debug, Clone)]
pub struct FloatingContainerDetector {
    /// Matched against tag or role
    pub target_roles: Vec<&'static str>,
    pub min_x_frac: f64,
    pub left_pad: i32,
    /// Items right of the container that extend it vertically
    pub item_tag: Option<&'static str>,
}

impl FloatingContainerDetector {
    pub fn floating_menu() -> Self {
        Self {
            target_roles: vec!["menu"],
            min_x_frac: 0.4,
            left_pad: 50,
            item_tag: Some("menu-item"),
        }
    }

    /// Popup menus anywhere on screen.
    pub fn popup_menu() -> Self {
        Self {
            target_roles: vec!["popup-menu"],
            min_x_frac: 0.0,
            left_pad: 10,
            item_tag: Some("menu-item"),
        }
    }

    pub fn dialog() -> Self {
        Self {
            target_roles: vec!["dialog", "alert"],
            min_x_frac: 0.0,
            left_pad: 0,
            item_tag: None,
        }
    }
}

impl ModalDetector for FloatingContainerDetector {
    fn name(&self) -> &'static str {
        "floating_container"
    }

    fn detect(
        &self,
        elements: &[Element],
        background: &[ElementId],
        screen: ScreenSize,
    ) -> ModalSplit {
        let min_x = screen.w_frac(self.min_x_frac);
        let members = resolve(elements, background);

        let best = members
            .iter()
            .filter(|el| {
                let tag = el.tag_lower();
                let role = el.role_lower();
                self.target_roles
                    .iter()
                    .any(|r| tag == *r || role == *r)
            })
            .map(|el| el.bbox())
            .filter(|b| self.min_x_frac <= 0.0 || b.x > min_x)
            .max_by_key(|b| b.area());

        let Some(container) = best else {
            return ModalSplit::unchanged(background);
        };
        if container.area() == 0 {
            return ModalSplit::unchanged(background);
        }

        let x0 = container.x - self.left_pad;
        let x1 = if self.item_tag.is_some() {
            screen.width
        } else {
            container.right()
        };
        let mut y0 = container.y;
        let mut y1 = container.bottom();

        if let Some(item_tag) = self.item_tag {
            for el in &members {
                if el.tag_lower() == item_tag {
                    let b = el.bbox();
                    if b.x > x0 {
                        y0 = y0.min(b.y);
                        y1 = y1.max(b.bottom());
                    }
                }
            }
        }

        split_by(elements, background, |el| {
            let (cx, cy) = el.center();
            x0 <= cx && cx <= x1 && y0 <= cy && cy <= y1
        })
    }
}

// ============================================================================
// Dimmed layer + keyword proximity (desktop prompts)
// ============================================================================

/// A near-text-free panel covering much of the screen signals a dimmed
/// backdrop. With a modal keyword present, everything near the first keyword
/// element is modal and the backdrop is dropped.
#[derive(Debug, Clone)]
pub struct DimmedLayerDetector {
    pub keywords: Vec<&'static str>,
    pub layer_tags: Vec<&'static str>,
    pub min_coverage: f64,
    pub max_text_len: usize,
    pub radius_x: i32,
    pub radius_y: i32,
}

impl DimmedLayerDetector {
    pub fn authentication_prompt() -> Self {
        Self {
            keywords: vec![
                "authentication",
                "password",
                "required",
                "authenticate",
                "cancel",
            ],
            layer_tags: vec!["panel", "frame", "image", "static", "text"],
            min_coverage: 0.3,
            max_text_len: 3,
            radius_x: 500,
            radius_y: 400,
        }
    }

    fn is_layer(&self, el: &Element, screen: ScreenSize) -> bool {
        let coverage = el.bbox().area() as f64 / screen.area() as f64;
        coverage > self.min_coverage
            && el.label().chars().count() < self.max_text_len
            && self.layer_tags.contains(&el.tag_lower().as_str())
    }
}

impl ModalDetector for DimmedLayerDetector {
    fn name(&self) -> &'static str {
        "dimmed_layer"
    }

    fn detect(
        &self,
        elements: &[Element],
        background: &[ElementId],
        screen: ScreenSize,
    ) -> ModalSplit {
        let members = resolve(elements, background);

        let Some(layer) = members.iter().find(|el| self.is_layer(el, screen)) else {
            return ModalSplit::unchanged(background);
        };

        let trigger = members.iter().find(|el| {
            el.id != layer.id && {
                let label = el.label_lower();
                self.keywords.iter().any(|kw| label.contains(kw))
            }
        });
        let Some(trigger) = trigger else {
            return ModalSplit::unchanged(background);
        };

        let (tx, ty) = trigger.center();
        let layer_id = layer.id;

        let mut split = split_by(elements, background, |el| {
            if el.id == layer_id {
                return false;
            }
            let (cx, cy) = el.center();
            (cx - tx).abs() < self.radius_x && (cy - ty).abs() < self.radius_y
        });
        split.background.retain(|id| *id != layer_id);
        split.dropped.push(layer_id);
        split
    }
}
