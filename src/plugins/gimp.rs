use std::collections::HashSet;

use crate::{
    domain::domain_model::Domain,
    engine::{
        detectors::FloatingContainerDetector,
        engine_model::{FormatContext, RegionMap, StaticSplit, View},
        modal::ModalDetector,
        plugin::DomainPlugin,
        serialize::{
            dedup_rendered, hierarchical_lines, merge_fragments, render_region, resolve,
            sorted_lines,
        },
    },
    geometry::bbox::ScreenSize,
    tree::element_model::{Element, ElementId},
};

pub const MENUBAR: &str = "MENUBAR";
pub const APP_LAUNCHER: &str = "APP_LAUNCHER";
pub const TOOLBOX: &str = "TOOLBOX";
pub const DOCKS: &str = "DOCKS";
pub const CANVAS: &str = "CANVAS";
pub const STATUSBAR: &str = "STATUSBAR";

const STATIC_REGIONS: &[&str] = &[MENUBAR, APP_LAUNCHER, TOOLBOX, DOCKS, STATUSBAR];

const MENU_KEYWORDS: &[&str] = &[
    "file", "edit", "select", "view", "image", "layer", "colors", "tools", "filters", "windows",
    "help",
];

/// Dialog buttons stay in the canvas even inside a side panel.
const DIALOG_BUTTONS: &[&str] = &["ok", "cancel", "reset", "close", "help", "discard changes"];

/// Label above or beside its input in the tool options and dock panels.
const PANEL_Y_DIST: i32 = 40;
const PANEL_X_DIST: i32 = 80;

#[derive(Debug, Clone, Copy, Default)]
pub struct GimpPlugin;

impl DomainPlugin for GimpPlugin {
    fn domain(&self) -> Domain {
        Domain::Gimp
    }

    /// Only the canvas is dynamic; file names in the docks or status bar must
    /// never be mistaken for overlays.
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
        let mut regions =
            RegionMap::new(&[MENUBAR, APP_LAUNCHER, TOOLBOX, DOCKS, CANVAS, STATUSBAR]);

        let w = screen.width as f64;
        let h = screen.height as f64;

        for el in resolve(elements, ids) {
            let b = el.bbox();
            let (cx, cy) = b.center();
            let tag = el.tag_lower();
            let role = el.role_lower();
            let label = el.label_lower();

            let region = if ((b.x as f64) < w * 0.05
                && (b.w as f64) < w * 0.06
                && b.h > 30
                && matches!(tag.as_str(), "push-button" | "toggle-button"))
                || tag == "launcher-app"
            {
                APP_LAUNCHER
            } else if (cy as f64) < h * 0.10
                && (tag == "menu" || MENU_KEYWORDS.contains(&label.as_str()))
            {
                MENUBAR
            } else if matches!(role.as_str(), "dialog" | "alert" | "window")
                || matches!(tag.as_str(), "window" | "dialog")
                || (tag == "push-button" && DIALOG_BUTTONS.contains(&label.as_str()))
            {
                CANVAS
            } else if (cy as f64) > h * 0.95 {
                STATUSBAR
            } else if (cx as f64) < w * 0.22 {
                TOOLBOX
            } else if (cx as f64) > w * 0.78 {
                DOCKS
            } else {
                CANVAS
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

    fn region_order(&self, _view: Option<View>) -> Vec<&'static str> {
        vec![APP_LAUNCHER, MENUBAR, TOOLBOX, CANVAS, DOCKS, STATUSBAR]
    }

    fn fallback_region(&self) -> &'static str {
        CANVAS
    }

    fn format_region(
        &self,
        name: &str,
        elements: &[Element],
        ids: &[ElementId],
        regions: &RegionMap,
        ctx: &FormatContext,
    ) -> Vec<String> {
        match name {
            TOOLBOX | DOCKS => {
                let lines = dedup_rendered(sorted_lines(elements, ids, regions, ctx));
                hierarchical_lines(&merge_fragments(lines, PANEL_Y_DIST, PANEL_X_DIST), None)
            }
            CANVAS => {
                let lines = dedup_rendered(sorted_lines(elements, ids, regions, ctx));
                hierarchical_lines(&lines, None)
            }
            _ => render_region(elements, ids, regions, ctx),
        }
    }
}
