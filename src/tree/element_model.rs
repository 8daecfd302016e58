use serde::Serialize;

use crate::geometry::bbox::BBox;

/// Stable handle assigned at reconstruction time (index in source order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ElementId(pub usize);

/// One reconstructed accessibility-tree node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub id: ElementId,
    pub tag: String,
    pub name: String,
    pub text: String,
    pub description: String,
    pub role: String,
    pub states: Vec<String>,

    /// Top-left corner in screen pixels
    pub position: Option<(i32, i32)>,
    /// Width and height in screen pixels
    pub size: Option<(i32, i32)>,

    /// Reconstructed source line, kept for diagnostics
    pub raw: String,
}

impl Element {
    /// Bounding box, or a zero box at the origin when geometry is absent.
    pub fn bbox(&self) -> BBox {
        let (x, y) = self.position.unwrap_or((0, 0));
        let (w, h) = self.size.unwrap_or((0, 0));
        BBox { x, y, w, h }
    }

    pub fn center(&self) -> (i32, i32) {
        self.bbox().center()
    }

    pub fn tag_lower(&self) -> String {
        self.tag.to_lowercase()
    }

    pub fn role_lower(&self) -> String {
        self.role.to_lowercase()
    }

    /// `name`, falling back to `text`, trimmed.
    pub fn label(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            self.text.trim()
        } else {
            name
        }
    }

    pub fn label_lower(&self) -> String {
        self.label().to_lowercase()
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.states.iter().any(|s| s.eq_ignore_ascii_case(state))
    }
}

/// Tags emitted by the capture layer. Anything else is treated as a
/// continuation of the previous row.
pub const KNOWN_TAGS: &[&str] = &[
    "alert",
    "application",
    "article",
    "block-quote",
    "calendar",
    "canvas",
    "caption",
    "check-box",
    "check-menu-item",
    "combo-box",
    "dialog",
    "document-frame",
    "document-presentation",
    "document-spreadsheet",
    "document-text",
    "document-web",
    "drawing-area",
    "embedded",
    "entry",
    "filler",
    "footer",
    "form",
    "frame",
    "grouping",
    "header",
    "heading",
    "icon",
    "image",
    "internal-frame",
    "label",
    "landmark",
    "launcher-app",
    "layered-pane",
    "link",
    "list",
    "list-box",
    "list-item",
    "menu",
    "menu-bar",
    "menu-button",
    "menu-item",
    "notification",
    "option-pane",
    "page",
    "page-tab",
    "page-tab-list",
    "panel",
    "paragraph",
    "password-text",
    "popup-menu",
    "progress-bar",
    "push-button",
    "radio-button",
    "radio-menu-item",
    "root-pane",
    "row-header",
    "column-header",
    "scroll-bar",
    "scroll-pane",
    "section",
    "separator",
    "slider",
    "spin-button",
    "split-pane",
    "split-button",
    "static",
    "status-bar",
    "statusbar",
    "table",
    "table-cell",
    "table-row",
    "terminal",
    "text",
    "textbox",
    "toggle-button",
    "tool-bar",
    "tool-tip",
    "tree",
    "tree-item",
    "tree-table",
    "viewport",
    "window",
];

pub fn is_known_tag(tag: &str) -> bool {
    let lower = tag.trim().to_lowercase();
    !lower.is_empty() && KNOWN_TAGS.contains(&lower.as_str())
}
