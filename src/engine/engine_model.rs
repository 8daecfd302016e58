use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::{
    domain::domain_model::Domain,
    geometry::bbox::ScreenSize,
    tree::element_model::{Element, ElementId},
};

/// Name of the section that collects overlay elements. Always emitted last.
pub const MODAL_REGION: &str = "MODAL";

// ============================================================================
// Static / dynamic split
// ============================================================================

/// Persistent chrome versus elements that may change per interaction.
/// Only `dynamic` ids are offered to modal detectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StaticSplit {
    pub dynamic: Vec<ElementId>,
    pub static_ids: Vec<ElementId>,
}

impl StaticSplit {
    pub fn all_dynamic(ids: &[ElementId]) -> Self {
        Self {
            dynamic: ids.to_vec(),
            static_ids: vec![],
        }
    }

    /// Ids in `static_set` become static, the rest dynamic, preserving order.
    pub fn partition(ids: &[ElementId], static_set: &HashSet<ElementId>) -> Self {
        let (static_ids, dynamic) = ids.iter().partition(|id| static_set.contains(id));
        Self {
            dynamic,
            static_ids,
        }
    }
}

// ============================================================================
// Region map
// ============================================================================

/// Ordered named buckets of element ids plus display-only retags.
///
/// Each id lands in at most one region: a second assignment is ignored.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegionMap {
    regions: Vec<(String, Vec<ElementId>)>,
    #[serde(skip)]
    assigned: HashSet<ElementId>,
    retags: HashMap<ElementId, String>,
}

impl RegionMap {
    pub fn new(names: &[&str]) -> Self {
        Self {
            regions: names.iter().map(|n| (n.to_string(), Vec::new())).collect(),
            assigned: HashSet::new(),
            retags: HashMap::new(),
        }
    }

    /// Assign `id` to `region`, declaring the region if needed.
    /// Returns false when the id was already placed elsewhere.
    pub fn push(&mut self, region: &str, id: ElementId) -> bool {
        if !self.assigned.insert(id) {
            return false;
        }
        match self.regions.iter_mut().find(|(name, _)| name == region) {
            Some((_, ids)) => ids.push(id),
            None => self.regions.push((region.to_string(), vec![id])),
        }
        true
    }

    pub fn retag(&mut self, id: ElementId, tag: &str) {
        self.retags.insert(id, tag.to_string());
    }

    pub fn get(&self, region: &str) -> &[ElementId] {
        self.regions
            .iter()
            .find(|(name, _)| name == region)
            .map(|(_, ids)| ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.assigned.contains(&id)
    }

    pub fn region_of(&self, id: ElementId) -> Option<&str> {
        self.regions
            .iter()
            .find(|(_, ids)| ids.contains(&id))
            .map(|(name, _)| name.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ElementId])> {
        self.regions
            .iter()
            .map(|(name, ids)| (name.as_str(), ids.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    /// Displayed tag: the retag if one was recorded, else the element's own.
    pub fn tag_of<'a>(&'a self, el: &'a Element) -> &'a str {
        self.retags
            .get(&el.id)
            .map(String::as_str)
            .unwrap_or(el.tag.as_str())
    }

    pub fn retags(&self) -> &HashMap<ElementId, String> {
        &self.retags
    }

    /// Put every id in `ids` that no region claimed into `fallback`.
    /// Returns how many were placed.
    pub fn fill_missing(&mut self, ids: &[ElementId], fallback: &str) -> usize {
        let mut placed = 0;
        for &id in ids {
            if self.push(fallback, id) {
                placed += 1;
            }
        }
        placed
    }
}

// ============================================================================
// Modal split
// ============================================================================

/// Outcome of one modal detector over the current background remainder.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModalSplit {
    pub modal: Vec<ElementId>,
    pub background: Vec<ElementId>,
    /// Removed from further consideration without being modal (dimming layers)
    pub dropped: Vec<ElementId>,
}

impl ModalSplit {
    /// No anchors: nothing modal, background returned as given.
    pub fn unchanged(background: &[ElementId]) -> Self {
        Self {
            modal: vec![],
            background: background.to_vec(),
            dropped: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modal.is_empty() && self.dropped.is_empty()
    }
}

// ============================================================================
// Views and formatting context
// ============================================================================

/// Discrete screen of one application, used for view smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Home,
    Settings,
    AccountSettings,
    Mail,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::Settings => "settings",
            View::AccountSettings => "account_settings",
            View::Mail => "mail",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a region formatter needs besides the elements themselves.
#[derive(Debug, Clone)]
pub struct FormatContext {
    pub screen: ScreenSize,
    pub view: Option<View>,
    /// Instruction keywords; non-empty switches labels to keyword-centred
    /// truncation.
    pub keywords: BTreeSet<String>,
    pub label_max_len: usize,
}

impl FormatContext {
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            screen,
            view: None,
            keywords: BTreeSet::new(),
            label_max_len: 140,
        }
    }
}

// ============================================================================
// Compression result
// ============================================================================

/// Full record of one compression call.
#[derive(Debug, Clone, Serialize)]
pub struct Compression {
    pub domain: Domain,
    pub screen: ScreenSize,
    pub view: Option<View>,
    pub modal_suppressed: bool,
    pub split: StaticSplit,
    pub regions: RegionMap,
    pub modal: Vec<ElementId>,
    pub dropped: Vec<ElementId>,
    pub lines: Vec<String>,
}

impl Compression {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Section header names in output order.
    pub fn sections(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|l| l.strip_suffix(':'))
            .filter(|name| is_section_name(name))
            .collect()
    }
}

pub fn is_section_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
