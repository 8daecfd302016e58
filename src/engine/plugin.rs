use std::collections::HashSet;

use crate::{
    domain::{domain_model::Domain, scorer::score_domain},
    engine::{
        engine_model::{FormatContext, RegionMap, StaticSplit, View, MODAL_REGION},
        modal::ModalDetector,
        serialize::{render_content, render_region},
    },
    geometry::bbox::ScreenSize,
    plugins::{
        chrome::ChromePlugin, generic::GenericPlugin, gimp::GimpPlugin, os::OsPlugin,
        thunderbird::ThunderbirdPlugin,
    },
    trace::logger::TraceLogger,
    tree::element_model::{Element, ElementId},
};

pub const CONTENT_REGION: &str = "CONTENT";

/// Region and format policy for one application skin.
///
/// Every classification receives ids into `elements` and answers with ids;
/// elements themselves are never modified.
pub trait DomainPlugin {
    fn domain(&self) -> Domain;

    fn score(&self, elements: &[Element]) -> u32 {
        score_domain(self.domain(), elements, &TraceLogger::disabled())
    }

    /// Static chrome versus dynamic content, read off the region map that
    /// `classify_regions` already produced for the same ids.
    fn split_static_dynamic(
        &self,
        _elements: &[Element],
        ids: &[ElementId],
        _screen: ScreenSize,
        _regions: &RegionMap,
    ) -> StaticSplit {
        StaticSplit::all_dynamic(ids)
    }

    /// Assign `ids` to regions for the already detected `view`. With
    /// `dry_run` no retags are recorded.
    fn classify_regions(
        &self,
        elements: &[Element],
        ids: &[ElementId],
        screen: ScreenSize,
        view: Option<View>,
        dry_run: bool,
    ) -> RegionMap;

    fn modal_detectors(&self) -> Vec<Box<dyn ModalDetector>> {
        vec![]
    }

    /// Section order; regions not listed follow in declaration order.
    fn region_order(&self, _view: Option<View>) -> Vec<&'static str> {
        vec![CONTENT_REGION]
    }

    /// Region that receives anything the classification left out.
    fn fallback_region(&self) -> &'static str {
        CONTENT_REGION
    }

    fn detect_view(&self, _elements: &[Element]) -> Option<View> {
        None
    }

    fn meta_header(&self, _elements: &[Element], _regions: &RegionMap) -> Vec<String> {
        vec![]
    }

    fn format_region(
        &self,
        name: &str,
        elements: &[Element],
        ids: &[ElementId],
        regions: &RegionMap,
        ctx: &FormatContext,
    ) -> Vec<String> {
        if name == CONTENT_REGION {
            render_content(elements, ids, regions, ctx)
        } else {
            render_region(elements, ids, regions, ctx)
        }
    }

    fn assemble(
        &self,
        elements: &[Element],
        regions: &RegionMap,
        modal: &[ElementId],
        hidden: &[ElementId],
        ctx: &FormatContext,
    ) -> Vec<String> {
        assemble_sections(self, elements, regions, modal, hidden, ctx)
    }
}

/// Meta header, then each non-empty region in order under a `NAME:` header,
/// then `MODAL:`.
pub fn assemble_sections<P: DomainPlugin + ?Sized>(
    plugin: &P,
    elements: &[Element],
    regions: &RegionMap,
    modal: &[ElementId],
    hidden: &[ElementId],
    ctx: &FormatContext,
) -> Vec<String> {
    let mut lines = plugin.meta_header(elements, regions);
    let excluded: HashSet<ElementId> = modal.iter().chain(hidden.iter()).copied().collect();

    let mut order: Vec<&str> = plugin.region_order(ctx.view);
    for name in regions.names() {
        if !order.contains(&name) {
            order.push(name);
        }
    }

    for name in order {
        if name == MODAL_REGION {
            continue;
        }
        let ids: Vec<ElementId> = regions
            .get(name)
            .iter()
            .copied()
            .filter(|id| !excluded.contains(id))
            .collect();
        if ids.is_empty() {
            continue;
        }
        let body = plugin.format_region(name, elements, &ids, regions, ctx);
        if body.is_empty() {
            continue;
        }
        lines.push(format!("{}:", name));
        lines.extend(body);
    }

    if !modal.is_empty() {
        let body = plugin.format_region(MODAL_REGION, elements, modal, regions, ctx);
        if !body.is_empty() {
            lines.push(format!("{}:", MODAL_REGION));
            lines.extend(body);
        }
    }

    lines
}

/// Plug-in for a detected domain. Domains without a dedicated plug-in use the
/// content-only generic one under their own name.
pub fn plugin_for(domain: Domain) -> Box<dyn DomainPlugin> {
    match domain {
        Domain::Chrome => Box::new(ChromePlugin),
        Domain::Gimp => Box::new(GimpPlugin),
        Domain::Os => Box::new(OsPlugin),
        Domain::Thunderbird => Box::new(ThunderbirdPlugin),
        other => Box::new(GenericPlugin::new(other)),
    }
}
